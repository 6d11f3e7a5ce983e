//! # Wardrobe Try-On
//!
//! 一个围绕图像处理服务的穿搭试穿/入橱客户端编排程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有 HTTP 连接，只暴露接口能力
//! - `StudioClient` - 图像处理服务的 multipart 调用能力
//! - `WardrobeClient` - 衣橱目录读取 + 存储落库能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只管一件事
//! - `AssetResolver` - 把衣橱条目解析成可提交的素材
//! - `RequestBuilder` - 按选择顺序组装 multipart 请求
//! - `Reconciler` - 把三种响应形状归一化为统一结果
//! - `PersistencePipeline` - 尽力而为地把成功产物落入衣橱
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义一次提交的完整流程
//! - `SelectionSession` - 选择会话（序号、容量、解析票据）
//! - `TryOnWorkflow` - 状态机编排（组包 → 发送 → 归一化 → 落库）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 批量入橱模式，按清单分批并发处理
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{StudioClient, WardrobeClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Asset, BatchOutcome, Category, SelectionSet, WardrobeItem};
pub use orchestrator::App;
pub use services::{ArtifactStore, PersistencePipeline, Reconciler, RequestBuilder};
pub use workflow::{SelectionSession, TryOnWorkflow, WorkflowState};
