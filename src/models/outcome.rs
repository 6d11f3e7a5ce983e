//! 归一化后的结果模型
//!
//! 不管服务返回哪种形状，流程层和持久化管线只认识 BatchOutcome

use serde::{Deserialize, Serialize};

/// 一个提交单元的归一化结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// 在请求中的位置（从1开始）
    pub index: usize,
    /// 条目名称或描述
    pub label: String,
    pub success: bool,
    /// 生成图片的 base64 编码字节，仅成功时有
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 失败原因，仅失败时有
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

/// 服务上报数量与本地统计不一致的诊断信息（非致命）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMismatch {
    pub reported: usize,
    pub actual: usize,
}

/// 一次提交的聚合结果
///
/// 构造后不再修改；success_count 永远由条目列表重新统计得出，
/// 不信任服务端上报的数字
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub items: Vec<OutcomeRecord>,
    pub total_count: usize,
    pub success_count: usize,
    /// 并发批量形状下，服务上报数与本地统计不一致时的诊断
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_mismatch: Option<CountMismatch>,
}

impl BatchOutcome {
    /// 从条目列表构造，计数在这里统一算出
    pub fn from_records(items: Vec<OutcomeRecord>) -> Self {
        let total_count = items.len();
        let success_count = items.iter().filter(|r| r.success).count();
        Self {
            items,
            total_count,
            success_count,
            count_mismatch: None,
        }
    }

    /// 附加数量不一致诊断（仅在构造阶段由 reconciler 调用）
    pub fn with_count_mismatch(mut self, mismatch: CountMismatch) -> Self {
        self.count_mismatch = Some(mismatch);
        self
    }

    pub fn has_success(&self) -> bool {
        self.success_count > 0
    }

    /// 成功条目的迭代器（持久化管线只处理这些）
    pub fn successes(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.items.iter().filter(|r| r.success)
    }
}

/// 单个成功条目的持久化回执
///
/// 持久化是尽力而为的旁路：这里的失败不会反过来
/// 修改 OutcomeRecord 的成功状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceResult {
    /// 对应 OutcomeRecord 的 index
    pub index: usize,
    pub uploaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, success: bool) -> OutcomeRecord {
        OutcomeRecord {
            index,
            label: format!("条目 {}", index),
            success,
            artifact: success.then(|| "aGVsbG8=".to_string()),
            description: None,
            error_detail: (!success).then(|| "生成失败".to_string()),
        }
    }

    #[test]
    fn test_counts_are_recomputed_from_items() {
        let outcome = BatchOutcome::from_records(vec![record(1, true), record(2, false), record(3, true)]);
        assert_eq!(outcome.total_count, 3);
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.successes().count(), 2);
    }

    #[test]
    fn test_empty_outcome_has_no_success() {
        let outcome = BatchOutcome::from_records(Vec::new());
        assert_eq!(outcome.total_count, 0);
        assert!(!outcome.has_success());
    }
}
