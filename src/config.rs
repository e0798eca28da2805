//! 接收器配置模块
//!
//! 提供配置文档的加载、校验，以及校验后的配置记录

pub mod error;
pub mod identity;
pub mod loader;
pub mod pins;
pub mod record;
pub mod schema;

// 重新导出常用类型
pub use error::{DeclarationErrors, ValidationError, ValidationReport};
pub use identity::{ComponentId, IdentityRegistry};
pub use loader::{BuildConfig, LoadError};
pub use pins::{PinField, PinReference, TargetPlatform};
pub use record::{ConfigRecord, MeasurementSlots, SensorConfig};
pub use schema::SchemaValidator;
