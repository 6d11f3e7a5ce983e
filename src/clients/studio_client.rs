/// 图像处理服务（studio API）客户端
///
/// 封装所有与图像处理服务相关的调用逻辑；
/// 所有接口都是 multipart POST，可选携带会话令牌
use crate::config::Config;
use crate::error::TransportError;
use crate::models::wire::{ItemizeResponse, QualityCheckResponse, WardrobeIngestResponse};
use anyhow::Result;
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// 图像处理服务客户端
#[derive(Clone)]
pub struct StudioClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl StudioClient {
    /// 创建新的图像处理客户端
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.studio_api_base_url.clone(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// 单件抠图：生成专业商品照
    ///
    /// # 返回
    /// 单结果形状的原始 JSON，交给 reconciler 归一化
    pub async fn extract_single_item(&self, form: Form) -> Result<Value, TransportError> {
        self.post_multipart("/api/extract-clothing", form).await
    }

    /// 虚拟试穿：第一张图是人物，其余按顺序逐件上身
    ///
    /// # 返回
    /// 顺序迭代形状的原始 JSON
    pub async fn composite_apply(&self, form: Form) -> Result<Value, TransportError> {
        self.post_multipart("/api/try-on-clothes", form).await
    }

    /// 并发批量抠图：按名称列表一次提取多件
    ///
    /// # 返回
    /// 并发批量形状的原始 JSON
    pub async fn batch_extract_items(&self, form: Form) -> Result<Value, TransportError> {
        self.post_multipart("/api/extract-clothes-concurrent", form)
            .await
    }

    /// 照片质量分析（只读，不经过归一化）
    pub async fn classify(&self, form: Form) -> Result<QualityCheckResponse, TransportError> {
        self.post_multipart_as("/api/check-clothing-quality", form)
            .await
    }

    /// 整图拆解出服装/配饰清单（只读，不经过归一化）
    pub async fn itemize(&self, form: Form) -> Result<ItemizeResponse, TransportError> {
        self.post_multipart_as("/api/itemize-clothing", form).await
    }

    /// 一键整套入库（服务端完成拆解+抠图+落库）
    pub async fn wardrobe_ingest(&self, form: Form) -> Result<WardrobeIngestResponse, TransportError> {
        self.post_multipart_as("/api/add-fit-to-wardrobe", form)
            .await
    }

    /// 发送 multipart 请求并返回 JSON 结果
    async fn post_multipart(&self, endpoint: &str, form: Form) -> Result<Value, TransportError> {
        self.post_multipart_as(endpoint, form).await
    }

    /// 发送 multipart 请求并反序列化为指定类型
    async fn post_multipart_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<T, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("提交 multipart 请求: {}", url);

        let mut request = self.client.post(&url).multipart(form);
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

        response.json::<T>().await.map_err(|e| TransportError::DecodeFailed {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}
