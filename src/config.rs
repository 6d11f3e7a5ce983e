/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的穿搭图片数量
    pub max_concurrent_outfits: usize,
    /// 每次试穿最多携带的服装数量
    pub max_clothing_items: usize,
    /// 穿搭清单文件路径（TOML）
    pub manifest_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 图像处理 API 配置 ---
    pub studio_api_base_url: String,
    /// 会话令牌（可选，由外部登录流程提供）
    pub bearer_token: Option<String>,
    /// 单次请求超时秒数
    pub request_timeout_secs: u64,
    // --- 存储 / 衣橱目录配置 ---
    pub storage_base_url: String,
    pub storage_bucket: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_outfits: 4,
            max_clothing_items: 4,
            manifest_path: "outfits.toml".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            studio_api_base_url: "http://localhost:8000".to_string(),
            bearer_token: None,
            request_timeout_secs: 120,
            storage_base_url: "http://localhost:8000/storage/v1".to_string(),
            storage_bucket: "clothing-items".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_outfits: std::env::var("MAX_CONCURRENT_OUTFITS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_outfits),
            max_clothing_items: std::env::var("MAX_CLOTHING_ITEMS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_clothing_items),
            manifest_path: std::env::var("MANIFEST_PATH").unwrap_or(default.manifest_path),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            studio_api_base_url: std::env::var("STUDIO_API_BASE_URL").unwrap_or(default.studio_api_base_url),
            bearer_token: std::env::var("BEARER_TOKEN").ok().filter(|v| !v.is_empty()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            storage_base_url: std::env::var("STORAGE_BASE_URL").unwrap_or(default.storage_base_url),
            storage_bucket: std::env::var("STORAGE_BUCKET").unwrap_or(default.storage_bucket),
        }
    }
}
