//! 应用编排层

pub mod app;

pub use app::App;
