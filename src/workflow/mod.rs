//! 流程编排层
//!
//! 选择会话管理"提交什么"，试穿流程管理"怎么提交"

pub mod session;
pub mod tryon_flow;

pub use session::{ResolutionTicket, SelectionSession};
pub use tryon_flow::{TryOnWorkflow, WorkflowState};
