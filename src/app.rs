//! 应用层
//!
//! 宿主接口、组件注册表，以及从配置到组件的绑定和构建流程

pub mod binder;
pub mod build;
pub mod host;
pub mod registry;

pub use binder::{bind, BindError, RADIO_LIBRARY, SPI_CAPABILITY};
pub use build::{run_build, BuildError, BuildHost, BuildManifest, BuildSummary, Library};
pub use host::{Host, HostError};
pub use registry::{Component, ComponentRegistry};
