//! 测量数据定义

pub mod measurement;
pub mod weather;

pub use measurement::{DeviceClass, MeasurementKind, SensorDescriptor, StateClass, DESCRIPTORS};
pub use weather::WeatherData;
