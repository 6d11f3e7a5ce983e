//! 通用工具模块

pub mod logging;
