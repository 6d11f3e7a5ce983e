/// 衣橱目录与存储客户端
///
/// 负责三件事：拉取已保存的衣橱条目、抓取条目图片字节、
/// 把新生成的图片上传到对象存储并写入目录
use crate::config::Config;
use crate::error::{PersistenceError, TransportError};
use crate::models::wire::{CatalogEntry, CatalogEntryReceipt, CategorizedWardrobeResponse};
use crate::services::persistence::ArtifactStore;
use anyhow::Result;
use std::time::Duration;
use tracing::debug;

/// 衣橱目录客户端
pub struct WardrobeClient {
    client: reqwest::Client,
    api_base_url: String,
    storage_base_url: String,
    bucket: String,
    bearer_token: Option<String>,
}

impl WardrobeClient {
    /// 创建新的衣橱客户端
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.studio_api_base_url.clone(),
            storage_base_url: config.storage_base_url.clone(),
            bucket: config.storage_bucket.clone(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// 拉取按类别分组的衣橱条目列表
    pub async fn fetch_categorized(&self) -> Result<CategorizedWardrobeResponse, TransportError> {
        let endpoint = "/supabase/clothes/categorized";
        let url = format!("{}{}", self.api_base_url, endpoint);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| TransportError::RequestFailed {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::BadStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<CategorizedWardrobeResponse>()
            .await
            .map_err(|e| TransportError::DecodeFailed {
                endpoint: endpoint.to_string(),
                source: e,
            })
    }

    /// 抓取单个条目的图片字节
    ///
    /// 占位引用（`temp://`）在解析器里已被拦下，走到这里的
    /// 都是可抓取的 URL
    pub async fn fetch_item_bytes(&self, image_url: &str) -> Result<Vec<u8>, TransportError> {
        debug!("抓取条目图片: {}", image_url);

        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                endpoint: image_url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::BadStatus {
                endpoint: image_url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| TransportError::DecodeFailed {
            endpoint: image_url.to_string(),
            source: e,
        })?;

        Ok(bytes.to_vec())
    }

    /// 对象在存储桶中的公开访问地址
    fn public_url(&self, key: &str) -> String {
        format!("{}/object/public/{}/{}", self.storage_base_url, self.bucket, key)
    }
}

impl ArtifactStore for WardrobeClient {
    /// 上传生成的图片到对象存储，返回公开访问地址
    async fn upload_artifact(&self, bytes: Vec<u8>, key: &str) -> Result<String, PersistenceError> {
        let url = format!("{}/object/{}/{}", self.storage_base_url, self.bucket, key);
        debug!("上传图片 ({} 字节): {}", bytes.len(), url);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "image/png")
            .header("Cache-Control", "max-age=3600")
            .body(bytes);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| PersistenceError::UploadFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistenceError::UploadFailed {
                key: key.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        Ok(self.public_url(key))
    }

    /// 把条目元数据写入衣橱目录，返回条目 id
    async fn save_catalog_entry(&self, entry: &CatalogEntry) -> Result<String, PersistenceError> {
        let url = format!("{}/supabase/clothes", self.api_base_url);
        debug!("写入衣橱目录: {} ({})", entry.name, entry.category);

        let mut request = self.client.post(&url).json(entry);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| PersistenceError::SaveFailed {
            name: entry.name.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistenceError::SaveFailed {
                name: entry.name.clone(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let receipt: CatalogEntryReceipt =
            response.json().await.map_err(|e| PersistenceError::SaveFailed {
                name: entry.name.clone(),
                reason: e.to_string(),
            })?;

        Ok(receipt.id)
    }
}
