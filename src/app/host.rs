//! 宿主接口
//!
//! 绑定器只通过 [`Host`] 接触外部：注册组件、分配引脚、分配发布器，
//! 以及声明对总线和射频库的依赖。

use thiserror::Error;

use crate::config::{ComponentId, PinReference, SensorConfig};
use crate::peripherals::{Bresser5in1, Publisher};

/// 宿主错误类型
#[derive(Debug, Error)]
pub enum HostError {
    #[error("引脚 {0} 已被使用")]
    PinAlreadyUsed(u8),

    #[error("无效的引脚编号: {0}")]
    InvalidPin(u8),

    #[error("组件 `{0}` 已注册")]
    DuplicateComponent(String),

    #[error("组件 `{0}` 未注册")]
    UnknownComponent(String),

    #[error("分配失败: {0}")]
    Allocation(String),
}

/// 宿主固件提供的分配与注册接口
pub trait Host {
    /// 引脚句柄
    type Pin;
    /// 测量发布器
    type Publisher: Publisher;

    /// 注册组件，之后组件归宿主所有
    fn register_component(
        &mut self,
        component: Bresser5in1<Self::Pin, Self::Publisher>,
    ) -> Result<(), HostError>;

    /// 按标识取回已注册的组件
    fn component_mut(
        &mut self,
        id: &ComponentId,
    ) -> Option<&mut Bresser5in1<Self::Pin, Self::Publisher>>;

    fn allocate_pin(&mut self, pin: &PinReference) -> Result<Self::Pin, HostError>;

    fn allocate_publisher(&mut self, sensor: &SensorConfig) -> Result<Self::Publisher, HostError>;

    /// 声明依赖的总线能力，例如 `spi`
    fn require_capability(&mut self, _capability: &'static str) {}

    /// 声明需要链接的外部库
    fn add_library(&mut self, _name: &'static str, _version: Option<&'static str>) {}
}
