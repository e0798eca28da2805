//! 固件上的宿主
//!
//! 安全地管理 GPIO 引脚的所有权，防止多个组件冲突使用同一引脚，
//! 并持有已注册的接收器组件。

use std::collections::HashSet;

use esp_idf_svc::hal::{
    gpio::{AnyIOPin, Output, PinDriver},
    peripheral::Peripheral,
    peripherals::Peripherals,
};

use crate::app::host::{Host, HostError};
use crate::app::registry::ComponentRegistry;
use crate::config::{ComponentId, PinReference, SensorConfig};

use super::bresser_5in1::Bresser5in1;
use super::sensor::Sensor;

pub type OutputDriver = PinDriver<'static, AnyIOPin, Output>;
pub type EspComponent = Bresser5in1<OutputDriver, Sensor>;

/// ESP-IDF 宿主
///
/// 使用 `clone_unchecked()` 取得引脚，同时跟踪已使用的引脚防止冲突。
pub struct EspHost {
    peripherals: Peripherals,
    used_pins: HashSet<u8>,
    registry: ComponentRegistry<EspComponent>,
}

impl EspHost {
    /// 创建宿主
    ///
    /// # 返回
    /// * `Ok(Self)` - 创建成功
    /// * `Err(HostError)` - 外设已被占用
    pub fn new() -> Result<Self, HostError> {
        let peripherals = Peripherals::take()
            .map_err(|e| HostError::Allocation(format!("获取外设失败: {e}")))?;

        Ok(Self {
            peripherals,
            used_pins: HashSet::new(),
            registry: ComponentRegistry::new(),
        })
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry<EspComponent> {
        &mut self.registry
    }

    /// 安全地获取 GPIO 引脚
    ///
    /// # 参数
    /// * `pin_num` - GPIO 引脚编号
    ///
    /// # 返回
    /// * `Ok(AnyIOPin)` - 引脚获取成功
    /// * `Err(HostError)` - 引脚已被使用或无效
    fn take_gpio(&mut self, pin_num: u8) -> Result<AnyIOPin, HostError> {
        if self.used_pins.contains(&pin_num) {
            return Err(HostError::PinAlreadyUsed(pin_num));
        }

        let pin = match pin_num {
            0 => unsafe { self.peripherals.pins.gpio0.clone_unchecked() }.into(),
            1 => unsafe { self.peripherals.pins.gpio1.clone_unchecked() }.into(),
            2 => unsafe { self.peripherals.pins.gpio2.clone_unchecked() }.into(),
            3 => unsafe { self.peripherals.pins.gpio3.clone_unchecked() }.into(),
            4 => unsafe { self.peripherals.pins.gpio4.clone_unchecked() }.into(),
            5 => unsafe { self.peripherals.pins.gpio5.clone_unchecked() }.into(),
            6 => unsafe { self.peripherals.pins.gpio6.clone_unchecked() }.into(),
            7 => unsafe { self.peripherals.pins.gpio7.clone_unchecked() }.into(),
            8 => unsafe { self.peripherals.pins.gpio8.clone_unchecked() }.into(),
            9 => unsafe { self.peripherals.pins.gpio9.clone_unchecked() }.into(),
            10 => unsafe { self.peripherals.pins.gpio10.clone_unchecked() }.into(),
            11 => unsafe { self.peripherals.pins.gpio11.clone_unchecked() }.into(),
            12 => unsafe { self.peripherals.pins.gpio12.clone_unchecked() }.into(),
            13 => unsafe { self.peripherals.pins.gpio13.clone_unchecked() }.into(),
            14 => unsafe { self.peripherals.pins.gpio14.clone_unchecked() }.into(),
            15 => unsafe { self.peripherals.pins.gpio15.clone_unchecked() }.into(),
            16 => unsafe { self.peripherals.pins.gpio16.clone_unchecked() }.into(),
            17 => unsafe { self.peripherals.pins.gpio17.clone_unchecked() }.into(),
            18 => unsafe { self.peripherals.pins.gpio18.clone_unchecked() }.into(),
            19 => unsafe { self.peripherals.pins.gpio19.clone_unchecked() }.into(),
            21 => unsafe { self.peripherals.pins.gpio21.clone_unchecked() }.into(),
            _ => return Err(HostError::InvalidPin(pin_num)),
        };

        self.used_pins.insert(pin_num);
        Ok(pin)
    }
}

impl Host for EspHost {
    type Pin = OutputDriver;
    type Publisher = Sensor;

    fn register_component(&mut self, component: EspComponent) -> Result<(), HostError> {
        self.registry.register(component.id().clone(), component)
    }

    fn component_mut(&mut self, id: &ComponentId) -> Option<&mut EspComponent> {
        self.registry.get_mut(id)
    }

    fn allocate_pin(&mut self, pin: &PinReference) -> Result<OutputDriver, HostError> {
        let gpio = self.take_gpio(pin.number)?;
        if pin.inverted {
            // PinDriver 不支持反相，由接线保证电平
            log::warn!("{pin} 配置了反相，固件按正常电平驱动");
        }
        PinDriver::output(gpio)
            .map_err(|e| HostError::Allocation(format!("{} 初始化失败: {e}", pin.canonical())))
    }

    fn allocate_publisher(&mut self, sensor: &SensorConfig) -> Result<Sensor, HostError> {
        Ok(Sensor::new(
            sensor.id.clone(),
            sensor.name.clone(),
            sensor.descriptor(),
        ))
    }

    fn require_capability(&mut self, capability: &'static str) {
        log::debug!("需要总线能力: {capability}");
    }

    fn add_library(&mut self, name: &'static str, version: Option<&'static str>) {
        log::debug!("需要外部库: {name} {}", version.unwrap_or("*"));
    }
}
