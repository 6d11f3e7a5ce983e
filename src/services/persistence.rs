//! 持久化管线 - 业务能力层
//!
//! 把已归一化的成功产物落库：先上传图片字节，再写目录条目。
//! 整条管线是尽力而为的，任何一件失败都不影响其他件，也不影响
//! 已经拿到的 BatchOutcome

use crate::error::PersistenceError;
use crate::models::outcome::{BatchOutcome, PersistenceResult};
use crate::models::wire::CatalogEntry;
use crate::models::Category;
use crate::services::resolver::sanitize_label;
use base64::engine::general_purpose;
use base64::Engine as _;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 产物存储后端
///
/// 管线通过这个接口落库，测试时可以换成内存实现。
/// 两个方法都要求返回 Send 的 Future，管线会被 spawn 到后台
pub trait ArtifactStore: Send + Sync + 'static {
    /// 上传图片字节，返回可公开访问的 URL
    fn upload_artifact(
        &self,
        bytes: Vec<u8>,
        key: &str,
    ) -> impl Future<Output = Result<String, PersistenceError>> + Send;

    /// 写入目录条目，返回条目 ID
    fn save_catalog_entry(
        &self,
        entry: &CatalogEntry,
    ) -> impl Future<Output = Result<String, PersistenceError>> + Send;
}

/// 单件落库时的补充信息（来自 itemize 等前置步骤）
#[derive(Debug, Clone, Default)]
pub struct EntryHints {
    /// 覆盖默认类目
    pub category: Option<Category>,
    /// 主色
    pub primary_color: Option<String>,
}

/// 持久化管线
pub struct PersistencePipeline<S: ArtifactStore> {
    store: Arc<S>,
}

impl<S: ArtifactStore> Clone for PersistencePipeline<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ArtifactStore> PersistencePipeline<S> {
    /// 创建新的持久化管线
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 并发落库一批结果中的成功件
    ///
    /// # 参数
    /// * `outcome` - 已归一化的批次结果
    /// * `default_category` - hints 未覆盖时使用的类目
    /// * `hints` - 按记录标签补充的类目/颜色信息
    ///
    /// # 返回
    /// 每个成功件恰好一条 PersistenceResult；失败件直接跳过
    pub async fn persist(
        &self,
        outcome: &BatchOutcome,
        default_category: Category,
        hints: &HashMap<String, EntryHints>,
    ) -> Vec<PersistenceResult> {
        let candidates: Vec<_> = outcome.successes().collect();
        if candidates.is_empty() {
            debug!("没有成功件需要落库");
            return Vec::new();
        }

        info!("📦 开始落库 {} 件成功产物", candidates.len());

        let tasks = candidates.into_iter().map(|record| {
            let hint = hints.get(&record.label).cloned().unwrap_or_default();
            self.persist_one(
                record.index,
                record.label.clone(),
                record.artifact.clone(),
                hint.category.unwrap_or(default_category),
                hint.primary_color,
            )
        });

        let results = join_all(tasks).await;

        let uploaded = results.iter().filter(|r| r.uploaded).count();
        let clean = results
            .iter()
            .filter(|r| r.uploaded && r.save_error.is_none())
            .count();
        info!(
            "📦 落库完成: 上传 {}/{}，完整入目录 {}",
            uploaded,
            results.len(),
            clean
        );

        results
    }

    /// 落库单件：解码 → 上传 → 写目录
    ///
    /// 三步中任何一步失败都只记入自己的 PersistenceResult
    async fn persist_one(
        &self,
        index: usize,
        label: String,
        artifact: Option<String>,
        category: Category,
        primary_color: Option<String>,
    ) -> PersistenceResult {
        let encoded = match artifact {
            Some(data) => data,
            None => {
                // 成功件按约定必须带产物，缺了当作解码失败处理
                warn!("⚠️ 第 {} 件标记成功但没有产物: {}", index, label);
                return PersistenceResult {
                    index,
                    uploaded: false,
                    storage_url: None,
                    save_error: Some("成功记录缺少图片产物".to_string()),
                };
            }
        };

        let bytes = match general_purpose::STANDARD.decode(&encoded) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("⚠️ 第 {} 件 base64 解码失败: {}", index, e);
                return PersistenceResult {
                    index,
                    uploaded: false,
                    storage_url: None,
                    save_error: Some(format!("base64 解码失败: {}", e)),
                };
            }
        };

        let key = format!(
            "{}-{}.png",
            Utc::now().timestamp_millis(),
            sanitize_label(&label)
        );

        let url = match self.store.upload_artifact(bytes, &key).await {
            Ok(url) => url,
            Err(e) => {
                warn!("⚠️ 第 {} 件上传失败: {}", index, e);
                return PersistenceResult {
                    index,
                    uploaded: false,
                    storage_url: None,
                    save_error: Some(e.to_string()),
                };
            }
        };

        debug!("✓ 第 {} 件已上传: {}", index, key);

        let entry = CatalogEntry {
            name: label.clone(),
            category: category.slug().to_string(),
            primary_color,
            secondary_color: None,
            size: None,
            image_url: url.clone(),
        };

        match self.store.save_catalog_entry(&entry).await {
            Ok(id) => {
                debug!("✓ 第 {} 件已入目录: {}", index, id);
                PersistenceResult {
                    index,
                    uploaded: true,
                    storage_url: Some(url),
                    save_error: None,
                }
            }
            Err(e) => {
                // 图片已经在存储里了，只是目录写入失败
                warn!("⚠️ 第 {} 件目录写入失败: {}", index, e);
                PersistenceResult {
                    index,
                    uploaded: true,
                    storage_url: Some(url),
                    save_error: Some(e.to_string()),
                }
            }
        }
    }
}
