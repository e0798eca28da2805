use crate::config::ComponentId;
use crate::data::SensorDescriptor;

/// 测量值发布器
///
/// 每次解码后，组件把对应测量写入发布器；未配置的测量没有发布器。
pub trait Publisher {
    fn publish_state(&mut self, value: f32);
}

/// 传感器发布器，保存最近一次发布的状态
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    id: ComponentId,
    name: Option<String>,
    descriptor: &'static SensorDescriptor,
    state: Option<f32>,
    publish_count: u32,
}

impl Sensor {
    pub fn new(id: ComponentId, name: Option<String>, descriptor: &'static SensorDescriptor) -> Self {
        Self {
            id,
            name,
            descriptor,
            state: None,
            publish_count: 0,
        }
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    /// 显示名称，未配置时使用标识
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn descriptor(&self) -> &'static SensorDescriptor {
        self.descriptor
    }

    pub fn state(&self) -> Option<f32> {
        self.state
    }

    pub fn publish_count(&self) -> u32 {
        self.publish_count
    }

    /// 按描述中的精度和单位格式化当前状态
    pub fn state_text(&self) -> Option<String> {
        self.state.map(|value| self.descriptor.format_value(value))
    }
}

impl Publisher for Sensor {
    fn publish_state(&mut self, value: f32) {
        self.state = Some(value);
        self.publish_count += 1;
        log::debug!(
            "'{}': 发布状态 {}",
            self.name(),
            self.descriptor.format_value(value)
        );
    }
}
