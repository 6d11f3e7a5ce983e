//! 结果归一化服务 - 业务能力层
//!
//! 图像处理服务先后演化出三种响应形状：
//! 1. 单结果（最早的单件抠图）
//! 2. 顺序迭代（逐件上身的试穿）
//! 3. 并发批量（并行抠多件）
//!
//! 形状判别只发生在这里；流程层和持久化管线永远只看到
//! 统一的 BatchOutcome

use crate::error::ReconcileError;
use crate::models::outcome::{BatchOutcome, CountMismatch, OutcomeRecord};
use crate::models::wire::{
    ConcurrentExtractionResponse, IterativeTryOnResponse, SingleResultResponse,
};
use crate::utils::logging::truncate_text;
use serde_json::Value;
use tracing::{debug, warn};

/// 结果归一化服务
pub struct Reconciler;

impl Reconciler {
    /// 创建新的归一化服务
    pub fn new() -> Self {
        Self
    }

    /// 把原始响应归一化为 BatchOutcome
    ///
    /// 结构探测（集中在此，调用方不得自行嗅探形状）：
    /// - 带 `iteration_results` → 顺序迭代形状
    /// - 带 `extracted_images` → 并发批量形状
    /// - 顶层有布尔 `success` → 单结果形状
    /// - 都不是 → 整批按失败处理，不合成部分结果
    pub fn reconcile(&self, raw: &Value) -> Result<BatchOutcome, ReconcileError> {
        if raw.get("iteration_results").is_some() {
            return self.reconcile_sequential(raw);
        }
        if raw.get("extracted_images").is_some() {
            return self.reconcile_concurrent(raw);
        }
        if raw.get("success").map(Value::is_boolean).unwrap_or(false) {
            return self.reconcile_single(raw);
        }

        Err(self.unrecognized(raw, "缺少可判别的形状字段"))
    }

    /// 单结果形状 → 恰好一条记录
    fn reconcile_single(&self, raw: &Value) -> Result<BatchOutcome, ReconcileError> {
        let response: SingleResultResponse = serde_json::from_value(raw.clone())
            .map_err(|e| self.unrecognized(raw, &e.to_string()))?;

        let label = response
            .description
            .clone()
            .unwrap_or_else(|| "提取的服装单品".to_string());

        let record = OutcomeRecord {
            index: 1,
            label,
            success: response.success,
            artifact: if response.success {
                response.generated_image_base64
            } else {
                None
            },
            description: response.description,
            error_detail: if response.success {
                None
            } else {
                Some(response.error.unwrap_or_else(|| "处理失败".to_string()))
            },
        };

        Ok(BatchOutcome::from_records(vec![record]))
    }

    /// 顺序迭代形状：逐条保留，index 按出现位置分配
    fn reconcile_sequential(&self, raw: &Value) -> Result<BatchOutcome, ReconcileError> {
        let response: IterativeTryOnResponse = serde_json::from_value(raw.clone())
            .map_err(|e| self.unrecognized(raw, &e.to_string()))?;

        let records = response
            .iteration_results
            .into_iter()
            .enumerate()
            .map(|(pos, it)| OutcomeRecord {
                index: pos + 1,
                label: it
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("迭代 {}（上身 {} 件）", it.iteration, it.items_added)),
                success: it.success,
                artifact: if it.success {
                    it.generated_image_base64
                } else {
                    None
                },
                description: it.description,
                error_detail: if it.success {
                    None
                } else {
                    Some(it.error.unwrap_or_else(|| "该次迭代失败".to_string()))
                },
            })
            .collect();

        Ok(BatchOutcome::from_records(records))
    }

    /// 并发批量形状：本地重新统计成功数，不信任服务上报
    fn reconcile_concurrent(&self, raw: &Value) -> Result<BatchOutcome, ReconcileError> {
        let response: ConcurrentExtractionResponse = serde_json::from_value(raw.clone())
            .map_err(|e| self.unrecognized(raw, &e.to_string()))?;

        let reported = response.successful_extractions;

        let records: Vec<OutcomeRecord> = response
            .extracted_images
            .into_iter()
            .enumerate()
            .map(|(pos, entry)| OutcomeRecord {
                index: pos + 1,
                label: entry.item,
                success: entry.success,
                artifact: if entry.success {
                    entry.generated_image_base64
                } else {
                    None
                },
                description: entry.description,
                error_detail: if entry.success {
                    None
                } else {
                    Some(entry.error.unwrap_or_else(|| "抠图失败".to_string()))
                },
            })
            .collect();

        let mut outcome = BatchOutcome::from_records(records);

        let actual = outcome.success_count;
        if reported != actual {
            // 非致命诊断：挂在结果上并告警，流程照常继续
            let mismatch = ReconcileError::CountMismatch { reported, actual };
            warn!("⚠️ {}", mismatch);
            outcome = outcome.with_count_mismatch(CountMismatch { reported, actual });
        } else {
            debug!("并发批量计数核对通过: {}/{}", actual, outcome.total_count);
        }

        Ok(outcome)
    }

    fn unrecognized(&self, raw: &Value, detail: &str) -> ReconcileError {
        ReconcileError::UnrecognizedResponse {
            detail: format!("{} | 响应预览: {}", detail, truncate_text(&raw.to_string(), 120)),
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_success_shape() {
        let raw = json!({
            "success": true,
            "generated_image_base64": "aGVsbG8=",
            "description": "Blue shirt"
        });

        let outcome = Reconciler::new().reconcile(&raw).unwrap();
        assert_eq!(outcome.total_count, 1);
        assert_eq!(outcome.success_count, 1);

        let record = &outcome.items[0];
        assert_eq!(record.index, 1);
        assert_eq!(record.label, "Blue shirt");
        assert!(record.success);
        assert_eq!(record.artifact.as_deref(), Some("aGVsbG8="));
        assert!(record.error_detail.is_none());
    }

    #[test]
    fn test_single_failure_shape() {
        let raw = json!({
            "success": false,
            "error": "Error extracting clothing item: model overloaded"
        });

        let outcome = Reconciler::new().reconcile(&raw).unwrap();
        assert_eq!(outcome.total_count, 1);
        assert_eq!(outcome.success_count, 0);
        assert!(outcome.items[0].artifact.is_none());
        assert!(outcome.items[0]
            .error_detail
            .as_deref()
            .unwrap()
            .contains("overloaded"));
    }

    #[test]
    fn test_sequential_shape_preserves_order() {
        let raw = json!({
            "success": true,
            "final_image_base64": "Zg==",
            "images_processed": 3,
            "total_iterations": 2,
            "successful_iterations": 1,
            "total_clothing_items": 2,
            "iteration_results": [
                {"iteration": 1, "success": true, "items_added": 1, "generated_image_base64": "YQ=="},
                {"iteration": 2, "success": false, "items_added": 1, "error": "pose mismatch"}
            ]
        });

        let outcome = Reconciler::new().reconcile(&raw).unwrap();
        assert_eq!(outcome.total_count, 2);
        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.items[0].index, 1);
        assert_eq!(outcome.items[1].index, 2);
        assert!(outcome.items[0].success);
        assert!(!outcome.items[1].success);
        assert_eq!(outcome.items[1].error_detail.as_deref(), Some("pose mismatch"));
    }

    #[test]
    fn test_concurrent_shape_recomputes_success_count() {
        // 服务上报 2 个成功，实际只有 1 个
        let raw = json!({
            "success": true,
            "processing_time": 4.2,
            "processing_method": "concurrent",
            "total_items": 3,
            "successful_extractions": 2,
            "extracted_images": [
                {"item": "red shirt", "success": true, "generated_image_base64": "YQ=="},
                {"item": "black pants", "success": false, "error": "not visible"},
                {"item": "white sneakers", "success": false, "error": "occluded"}
            ]
        });

        let outcome = Reconciler::new().reconcile(&raw).unwrap();
        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.total_count, 3);

        // 结果仍然可用，只是带上了诊断
        let mismatch = outcome.count_mismatch.expect("应当记录计数不一致");
        assert_eq!(mismatch.reported, 2);
        assert_eq!(mismatch.actual, 1);
    }

    #[test]
    fn test_concurrent_shape_without_mismatch_has_no_diagnostic() {
        let raw = json!({
            "success": true,
            "total_items": 1,
            "successful_extractions": 1,
            "extracted_images": [
                {"item": "red shirt", "success": true, "generated_image_base64": "YQ=="}
            ]
        });

        let outcome = Reconciler::new().reconcile(&raw).unwrap();
        assert!(outcome.count_mismatch.is_none());
    }

    #[test]
    fn test_unrecognized_shape_is_fatal() {
        let raw = json!({"status": "ok", "payload": []});

        let err = Reconciler::new().reconcile(&raw).unwrap_err();
        assert!(matches!(err, ReconcileError::UnrecognizedResponse { .. }));
    }

    #[test]
    fn test_success_count_invariant_across_shapes() {
        let shapes = vec![
            json!({"success": true, "generated_image_base64": "YQ=="}),
            json!({"success": true, "iteration_results": [
                {"iteration": 1, "success": true, "items_added": 1, "generated_image_base64": "YQ=="},
                {"iteration": 2, "success": true, "items_added": 1, "generated_image_base64": "Yg=="}
            ]}),
            json!({"success": true, "total_items": 2, "successful_extractions": 1, "extracted_images": [
                {"item": "a", "success": true, "generated_image_base64": "YQ=="},
                {"item": "b", "success": false, "error": "x"}
            ]}),
        ];

        for raw in shapes {
            let outcome = Reconciler::new().reconcile(&raw).unwrap();
            let counted = outcome.items.iter().filter(|r| r.success).count();
            assert_eq!(outcome.success_count, counted);
            assert_eq!(outcome.total_count, outcome.items.len());
        }
    }
}
