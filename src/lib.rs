//! Bresser 5-in-1 气象站接收器组件
//!
//! 校验 `bresser_5in1` 配置声明，并把校验结果绑定成宿主中的接收器组件。

#[macro_use]
mod macros;

pub mod app;
pub mod config;
pub mod data;
pub mod peripherals;

pub use app::{run_build, BuildError, BuildHost, Host};
pub use config::{BuildConfig, ConfigRecord, SchemaValidator, ValidationError};
