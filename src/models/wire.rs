//! 图像处理服务与衣橱目录的线上数据结构
//!
//! 三种会被归一化的响应形状（单结果 / 顺序迭代 / 并发批量）
//! 也定义在这里，但形状判别只发生在 reconciler 中

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ========== 归一化前的三种响应形状 ==========

/// 单结果形状（extract-clothing 等）
#[derive(Debug, Clone, Deserialize)]
pub struct SingleResultResponse {
    pub success: bool,
    #[serde(default)]
    pub generated_image_base64: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 顺序迭代形状中的单次迭代
#[derive(Debug, Clone, Deserialize)]
pub struct IterationResult {
    pub iteration: usize,
    pub success: bool,
    #[serde(default)]
    pub items_added: usize,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub generated_image_base64: Option<String>,
}

/// 顺序迭代形状（try-on-clothes）
#[derive(Debug, Clone, Deserialize)]
pub struct IterativeTryOnResponse {
    pub success: bool,
    #[serde(default)]
    pub final_image_base64: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images_processed: usize,
    #[serde(default)]
    pub total_iterations: usize,
    #[serde(default)]
    pub successful_iterations: usize,
    #[serde(default)]
    pub total_clothing_items: usize,
    pub iteration_results: Vec<IterationResult>,
}

/// 并发批量形状中的单个条目
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionEntry {
    pub item: String,
    pub success: bool,
    #[serde(default)]
    pub generated_image_base64: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 并发批量形状（extract-clothes-concurrent）
#[derive(Debug, Clone, Deserialize)]
pub struct ConcurrentExtractionResponse {
    pub success: bool,
    #[serde(default)]
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub processing_method: Option<String>,
    #[serde(default)]
    pub total_items: usize,
    #[serde(default)]
    pub successful_extractions: usize,
    pub extracted_images: Vec<ExtractionEntry>,
    #[serde(default)]
    pub error: Option<String>,
}

// ========== 只读分析类响应（不经过归一化） ==========

/// 照片质量分析结果
#[derive(Debug, Clone, Deserialize)]
pub struct QualityAnalysis {
    #[serde(default)]
    pub is_professional: bool,
    #[serde(default)]
    pub is_single_item: bool,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub background_quality: Option<String>,
    #[serde(default)]
    pub lighting_quality: Option<String>,
    #[serde(default)]
    pub overall_confidence: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// check-clothing-quality 响应
#[derive(Debug, Clone, Deserialize)]
pub struct QualityCheckResponse {
    pub success: bool,
    #[serde(default)]
    pub analysis: Option<QualityAnalysis>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 拆解结果中的单个条目
///
/// 服务端历史上既返回过纯字符串，也返回过带属性的对象
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ItemizedEntry {
    Detailed(ItemizedDetail),
    Name(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemizedDetail {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub features: Option<serde_json::Value>,
}

impl ItemizedEntry {
    /// 条目名称（提交给批量抠图接口时只用名字）
    pub fn name(&self) -> &str {
        match self {
            ItemizedEntry::Detailed(d) => &d.name,
            ItemizedEntry::Name(s) => s,
        }
    }

    pub fn primary_color(&self) -> Option<&str> {
        match self {
            ItemizedEntry::Detailed(d) => d.primary_color.as_deref(),
            ItemizedEntry::Name(_) => None,
        }
    }

    pub fn kind(&self) -> Option<&str> {
        match self {
            ItemizedEntry::Detailed(d) => d.kind.as_deref(),
            ItemizedEntry::Name(_) => None,
        }
    }
}

/// itemize-clothing 响应
#[derive(Debug, Clone, Deserialize)]
pub struct ItemizeResponse {
    pub success: bool,
    #[serde(default)]
    pub clothing_items: Vec<ItemizedEntry>,
    #[serde(default)]
    pub accessories: Vec<ItemizedEntry>,
    #[serde(default)]
    pub item_count: usize,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// add-fit-to-wardrobe 响应中的已保存条目
#[derive(Debug, Clone, Deserialize)]
pub struct SavedFitItem {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub extraction_success: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub extraction_error: Option<String>,
}

/// add-fit-to-wardrobe 响应
#[derive(Debug, Clone, Deserialize)]
pub struct WardrobeIngestResponse {
    pub success: bool,
    #[serde(default)]
    pub total_items_found: usize,
    #[serde(default)]
    pub items_saved: usize,
    #[serde(default)]
    pub items_with_images: usize,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub saved_items: Vec<SavedFitItem>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ========== 衣橱目录 ==========

/// 衣橱目录中的一个条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    pub image_url: String,
}

/// 按类别分组的衣橱列表响应
#[derive(Debug, Clone, Deserialize)]
pub struct CategorizedWardrobeResponse {
    pub success: bool,
    #[serde(default)]
    pub categories: HashMap<String, Vec<WardrobeItem>>,
}

/// 待写入衣橱目录的新条目
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub image_url: String,
}

/// 写入衣橱目录后的回执
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntryReceipt {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}
