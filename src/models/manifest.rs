//! 穿搭清单加载器
//!
//! 批量入库模式下，待处理的穿搭照片由一个 TOML 清单描述

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 清单中的一条穿搭记录
#[derive(Debug, Clone, Deserialize)]
pub struct OutfitEntry {
    /// 照片文件路径
    pub path: String,
    /// 展示名称，缺省时使用文件名
    #[serde(default)]
    pub name: Option<String>,
    /// 类别提示（可选），认不出来时归入 other
    #[serde(default)]
    pub category: Option<String>,
}

impl OutfitEntry {
    /// 获取展示名称，没有配置时退回文件名
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            Path::new(&self.path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| self.path.clone())
        })
    }
}

/// 穿搭清单
#[derive(Debug, Clone, Deserialize)]
pub struct OutfitManifest {
    #[serde(default, rename = "outfit")]
    pub outfits: Vec<OutfitEntry>,
}

/// 从 TOML 文件加载穿搭清单
pub async fn load_manifest(manifest_path: &str) -> Result<OutfitManifest> {
    let path = Path::new(manifest_path);
    if !path.exists() {
        anyhow::bail!("清单文件不存在: {}", manifest_path);
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取清单文件: {}", manifest_path))?;

    let manifest: OutfitManifest = toml::from_str(&content)
        .with_context(|| format!("无法解析清单文件: {}", manifest_path))?;

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let content = r#"
            [[outfit]]
            path = "photos/fit1.jpg"
            name = "周末穿搭"
            category = "tops"

            [[outfit]]
            path = "photos/fit2.jpg"
        "#;

        let manifest: OutfitManifest = toml::from_str(content).unwrap();
        assert_eq!(manifest.outfits.len(), 2);
        assert_eq!(manifest.outfits[0].display_name(), "周末穿搭");
        assert_eq!(manifest.outfits[1].display_name(), "fit2.jpg");
    }

    #[test]
    fn test_empty_manifest() {
        let manifest: OutfitManifest = toml::from_str("").unwrap();
        assert!(manifest.outfits.is_empty());
    }
}
