use std::fmt;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 衣橱条目解析错误
    Resolution(ResolutionError),
    /// 请求构建错误
    Build(BuildError),
    /// 结果归一化错误
    Reconcile(ReconcileError),
    /// 持久化错误（仅条目级，不会导致整体失败）
    Persistence(PersistenceError),
    /// 网络传输错误
    Transport(TransportError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Resolution(e) => write!(f, "解析错误: {}", e),
            AppError::Build(e) => write!(f, "构建错误: {}", e),
            AppError::Reconcile(e) => write!(f, "归一化错误: {}", e),
            AppError::Persistence(e) => write!(f, "持久化错误: {}", e),
            AppError::Transport(e) => write!(f, "传输错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Resolution(e) => Some(e),
            AppError::Build(e) => Some(e),
            AppError::Reconcile(e) => Some(e),
            AppError::Persistence(e) => Some(e),
            AppError::Transport(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 衣橱条目解析错误
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    /// 占位引用：条目元数据已存在，但图片尚未真正落库
    #[error("条目 {item_id} 的图片引用尚未落库: {url}")]
    Unreachable { item_id: String, url: String },
    /// 抓取已落库的图片时失败
    #[error("抓取条目 {item_id} 的图片失败: {reason}")]
    TransferError { item_id: String, reason: String },
}

/// 请求构建错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// 过滤掉无内容的素材后，没有任何可提交的图片
    #[error("没有任何可提交的图片内容")]
    EmptyPayload,
}

/// 结果归一化错误
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    /// 响应不属于任何已知形状，整批视为失败
    #[error("无法识别的响应形状: {detail}")]
    UnrecognizedResponse { detail: String },
    /// 服务上报的成功数与本地统计不一致（仅诊断，不中止流程）
    #[error("服务上报成功数 {reported} 与实际成功数 {actual} 不一致")]
    CountMismatch { reported: usize, actual: usize },
}

/// 持久化错误（始终是条目级的）
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("上传图片失败 ({key}): {reason}")]
    UploadFailed { key: String, reason: String },
    #[error("写入衣橱目录失败 ({name}): {reason}")]
    SaveFailed { name: String, reason: String },
}

/// 网络传输错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务返回异常 HTTP 状态
    #[error("服务返回异常状态 ({endpoint}): HTTP {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 响应体解析失败
    #[error("响应解析失败 ({endpoint}): {source}")]
    DecodeFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

// ========== 从组件错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<ResolutionError> for AppError {
    fn from(err: ResolutionError) -> Self {
        AppError::Resolution(err)
    }
}

impl From<BuildError> for AppError {
    fn from(err: BuildError) -> Self {
        AppError::Build(err)
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        AppError::Reconcile(err)
    }
}

impl From<PersistenceError> for AppError {
    fn from(err: PersistenceError) -> Self {
        AppError::Persistence(err)
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        AppError::Transport(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建传输错误
    pub fn transport_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Transport(TransportError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
