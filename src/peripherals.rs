//! 外设模块

pub mod bresser_5in1;
pub mod gpio;
#[cfg(target_os = "espidf")]
pub mod gpio_manager;
pub mod sensor;

pub use bresser_5in1::Bresser5in1;
pub use gpio::GpioPin;
#[cfg(target_os = "espidf")]
pub use gpio_manager::EspHost;
pub use sensor::{Publisher, Sensor};
