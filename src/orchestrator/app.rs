//! 应用编排层
//!
//! 批量入橱模式：读取穿搭清单，分批并发地把每张穿搭照片
//! 拆解成单品、批量抠图并落入衣橱

use crate::clients::{StudioClient, WardrobeClient};
use crate::config::Config;
use crate::models::manifest::{load_manifest, OutfitEntry};
use crate::models::Category;
use crate::services::persistence::{EntryHints, PersistencePipeline};
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_outfits_loaded, log_startup,
    print_final_stats,
};
use crate::workflow::TryOnWorkflow;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    studio: StudioClient,
    wardrobe: Arc<WardrobeClient>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(config.max_concurrent_outfits);

        let studio = StudioClient::new(&config)?;
        let wardrobe = Arc::new(WardrobeClient::new(&config)?);

        Ok(Self {
            config,
            studio,
            wardrobe,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载清单中所有待处理的穿搭照片
        let all_outfits = load_outfits(&self.config).await?;

        if all_outfits.is_empty() {
            warn!("⚠️ 清单中没有待处理的穿搭照片，程序结束");
            return Ok(());
        }

        let total_outfits = all_outfits.len();
        log_outfits_loaded(total_outfits, self.config.max_concurrent_outfits);

        // 处理所有穿搭照片
        let stats = process_all_outfits(
            &self.studio,
            &self.wardrobe,
            all_outfits,
            &self.config,
        )
        .await?;

        // 输出最终统计
        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            stats.saved_items,
            &self.config.output_log_file,
        );

        Ok(())
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
    saved_items: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
    saved_items: usize,
}

/// 加载穿搭清单
async fn load_outfits(config: &Config) -> Result<Vec<OutfitEntry>> {
    info!("\n📁 正在读取穿搭清单...");
    let manifest = load_manifest(&config.manifest_path).await?;
    Ok(manifest.outfits)
}

/// 处理所有穿搭照片
async fn process_all_outfits(
    studio: &StudioClient,
    wardrobe: &Arc<WardrobeClient>,
    all_outfits: Vec<OutfitEntry>,
    config: &Config,
) -> Result<ProcessingStats> {
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_outfits));
    let total_outfits = all_outfits.len();
    let mut stats = ProcessingStats {
        total: total_outfits,
        ..Default::default()
    };

    // 分批处理
    for batch_start in (0..total_outfits).step_by(config.max_concurrent_outfits) {
        let batch_end = (batch_start + config.max_concurrent_outfits).min(total_outfits);
        let batch_outfits = &all_outfits[batch_start..batch_end];
        let batch_num = (batch_start / config.max_concurrent_outfits) + 1;
        let total_batches =
            (total_outfits + config.max_concurrent_outfits - 1) / config.max_concurrent_outfits;

        log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total_outfits);

        // 处理本批
        let batch_result = process_batch(
            studio,
            wardrobe,
            batch_outfits,
            batch_start,
            semaphore.clone(),
        )
        .await?;

        stats.success += batch_result.success;
        stats.failed += batch_result.failed;
        stats.saved_items += batch_result.saved_items;

        log_batch_complete(batch_num, batch_result.success, batch_end - batch_start);
    }

    Ok(stats)
}

/// 处理单个批次
async fn process_batch(
    studio: &StudioClient,
    wardrobe: &Arc<WardrobeClient>,
    batch_outfits: &[OutfitEntry],
    batch_start: usize,
    semaphore: Arc<Semaphore>,
) -> Result<BatchResult> {
    let mut batch_handles = Vec::new();

    // 为本批创建并发任务
    for (idx, outfit) in batch_outfits.iter().enumerate() {
        let outfit_index = batch_start + idx + 1;
        let permit = semaphore.clone().acquire_owned().await?;
        let studio_clone = studio.clone();
        let wardrobe_clone = Arc::clone(wardrobe);
        let outfit_clone = outfit.clone();

        let handle = tokio::spawn(async move {
            let _permit = permit;
            match process_single_outfit(studio_clone, wardrobe_clone, outfit_clone, outfit_index)
                .await
            {
                Ok(saved) => Ok(saved),
                Err(e) => {
                    error!("[穿搭 {}] ❌ 处理过程中发生错误: {}", outfit_index, e);
                    Err(e)
                }
            }
        });
        batch_handles.push((outfit_index, handle));
    }

    // 等待本批所有任务完成
    let mut result = BatchResult::default();

    for (outfit_index, handle) in batch_handles {
        match handle.await {
            Ok(Ok(saved)) => {
                result.success += 1;
                result.saved_items += saved;
            }
            Ok(Err(_)) => {
                result.failed += 1;
            }
            Err(e) => {
                error!("[穿搭 {}] 任务执行失败: {}", outfit_index, e);
                result.failed += 1;
            }
        }
    }

    Ok(result)
}

/// 处理单张穿搭照片：拆解 → 批量抠图 → 落库
///
/// # 返回
/// 返回完整入橱的单品数量
async fn process_single_outfit(
    studio: StudioClient,
    wardrobe: Arc<WardrobeClient>,
    outfit: OutfitEntry,
    outfit_index: usize,
) -> Result<usize> {
    let display_name = outfit.display_name();
    info!("[穿搭 {}] 开始处理: {}", outfit_index, display_name);

    // 读取照片
    let bytes = tokio::fs::read(&outfit.path)
        .await
        .with_context(|| format!("读取照片失败: {}", outfit.path))?;
    let file_name = Path::new(&outfit.path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("outfit.png")
        .to_string();
    let content_type = guess_content_type(&file_name);
    let photo = crate::models::Asset::local(0, file_name, bytes, content_type);

    let mut flow = TryOnWorkflow::new(studio, PersistencePipeline::new(wardrobe));

    // 1. 拆解出单品清单
    let itemized = flow.itemize(&photo).await?;
    if !itemized.success {
        anyhow::bail!(
            "拆解失败: {}",
            itemized.error.unwrap_or_else(|| "未知错误".to_string())
        );
    }

    let entries: Vec<_> = itemized
        .clothing_items
        .iter()
        .chain(itemized.accessories.iter())
        .collect();
    if entries.is_empty() {
        warn!("[穿搭 {}] 照片中没有识别出任何单品", outfit_index);
        return Ok(0);
    }
    info!("[穿搭 {}] 拆解出 {} 件单品", outfit_index, entries.len());

    // 2. 拆解结果带的类目/颜色作为落库提示
    let labels: Vec<String> = entries.iter().map(|e| e.name().to_string()).collect();
    let mut hints = HashMap::new();
    for entry in &entries {
        hints.insert(
            entry.name().to_string(),
            EntryHints {
                category: entry.kind().and_then(Category::parse),
                primary_color: entry.primary_color().map(String::from),
            },
        );
    }

    // 3. 批量抠图，默认类目取清单里给的
    let default_category = outfit
        .category
        .as_deref()
        .and_then(Category::parse)
        .unwrap_or(Category::Itemized);
    let outcome = flow
        .run_batch_extract(&photo, &labels, default_category, hints)
        .await?;
    info!(
        "[穿搭 {}] 抠图完成: {}/{} 成功",
        outfit_index, outcome.success_count, outcome.total_count
    );

    // 4. 等后台落库收尾
    let persisted = flow.await_persistence().await;
    let saved = persisted
        .iter()
        .filter(|r| r.uploaded && r.save_error.is_none())
        .count();
    info!(
        "[穿搭 {}] ✓ 入橱 {}/{} 件",
        outfit_index,
        saved,
        persisted.len()
    );

    Ok(saved)
}

/// 按扩展名推断 MIME 类型
fn guess_content_type(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}
