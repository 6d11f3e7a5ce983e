//! 业务能力层
//!
//! 流程层按固定顺序组合这里的四个服务：
//! 解析 → 组包 → （客户端发送）→ 归一化 → 落库

pub mod persistence;
pub mod reconciler;
pub mod request_builder;
pub mod resolver;

pub use persistence::{ArtifactStore, EntryHints, PersistencePipeline};
pub use reconciler::Reconciler;
pub use request_builder::{FormPart, OutboundRequest, RequestBuilder};
pub use resolver::{AssetResolver, PLACEHOLDER_PREFIX};
