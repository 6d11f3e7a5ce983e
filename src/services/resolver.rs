//! 素材解析服务 - 业务能力层
//!
//! 只负责"把衣橱条目变成可提交素材"这一件事：
//! 抓取图片字节、生成提交用文件名。
//! 不持有选择集合，也不关心流程顺序

use crate::clients::WardrobeClient;
use crate::error::ResolutionError;
use crate::models::asset::{Asset, AssetPayload, RemoteMeta};
use crate::models::wire::WardrobeItem;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// 占位引用前缀：条目已有元数据，但图片尚未真正落库
pub const PLACEHOLDER_PREFIX: &str = "temp://";

/// 素材解析服务
pub struct AssetResolver;

impl AssetResolver {
    /// 创建新的解析服务
    pub fn new() -> Self {
        Self
    }

    /// 把衣橱条目解析为素材
    ///
    /// # 参数
    /// - `client`: 衣橱客户端（负责实际抓取）
    /// - `seq`: 选择时分配的序号，决定该素材的提交顺序
    /// - `item`: 衣橱条目
    ///
    /// # 返回
    /// - 占位引用：软失败，返回只有元信息、没有内容的素材
    /// - 抓取失败：硬失败，素材不应进入选择集合
    /// - 成功：内容 + 由条目名称派生的文件名
    pub async fn resolve(
        &self,
        client: &WardrobeClient,
        seq: u64,
        item: &WardrobeItem,
    ) -> Result<Asset, ResolutionError> {
        let meta = RemoteMeta::from_item(item);

        if item.image_url.starts_with(PLACEHOLDER_PREFIX) {
            let reason = ResolutionError::Unreachable {
                item_id: item.id.clone(),
                url: item.image_url.clone(),
            };
            warn!("⚠️ {}，仅保留元信息", reason);
            return Ok(Asset::remote(seq, meta, None));
        }

        match client.fetch_item_bytes(&item.image_url).await {
            Ok(bytes) => {
                let file_name = slug_file_name(&item.name);
                debug!(
                    "条目 {} 解析完成: {} 字节, 文件名 {}",
                    item.id,
                    bytes.len(),
                    file_name
                );
                Ok(Asset::remote(
                    seq,
                    meta,
                    Some(AssetPayload {
                        bytes,
                        content_type: "image/png".to_string(),
                        file_name,
                    }),
                ))
            }
            Err(e) => Err(ResolutionError::TransferError {
                item_id: item.id.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// 从条目名称派生提交用文件名（与前序实现保持一致：
/// 非字母数字逐字符换成下划线，再转小写）
pub fn slug_file_name(name: &str) -> String {
    format!("{}.png", sanitize_label(name))
}

/// 清洗名称中的非字母数字字符
pub fn sanitize_label(name: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]").expect("固定模式必然合法"));
    re.replace_all(&name.to_lowercase(), "_").to_string()
}
