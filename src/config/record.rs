//! 已校验的配置记录
//!
//! 校验器的输出，也是绑定器唯一的输入。

use serde_yaml::{Mapping, Value};

use super::identity::ComponentId;
use super::pins::{PinField, PinReference};
use crate::data::{MeasurementKind, SensorDescriptor};

/// 单个测量槽的配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    pub kind: MeasurementKind,
    pub id: ComponentId,
    pub name: Option<String>,
}

impl SensorConfig {
    pub fn descriptor(&self) -> &'static SensorDescriptor {
        self.kind.descriptor()
    }
}

/// 七个测量槽，每个槽要么已配置、要么明确为空
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeasurementSlots([Option<SensorConfig>; 7]);

impl MeasurementSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: MeasurementKind) -> Option<&SensorConfig> {
        self.0[kind.index()].as_ref()
    }

    /// 放入一个传感器配置，槽位由其 `kind` 决定
    pub fn insert(&mut self, sensor: SensorConfig) {
        let index = sensor.kind.index();
        self.0[index] = Some(sensor);
    }

    /// 按声明顺序遍历已配置的槽
    pub fn iter(&self) -> impl Iterator<Item = &SensorConfig> {
        self.0.iter().flatten()
    }

    /// 已配置槽的数量
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntoIterator for MeasurementSlots {
    type Item = SensorConfig;
    type IntoIter = core::iter::Flatten<core::array::IntoIter<Option<SensorConfig>, 7>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter().flatten()
    }
}

/// 单个声明校验后的完整记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    pub id: ComponentId,
    pub chip_select_pin: PinReference,
    pub gd0_pin: PinReference,
    pub gd2_pin: PinReference,
    pub measurements: MeasurementSlots,
}

impl ConfigRecord {
    pub fn pin(&self, field: PinField) -> PinReference {
        match field {
            PinField::ChipSelect => self.chip_select_pin,
            PinField::Gd0 => self.gd0_pin,
            PinField::Gd2 => self.gd2_pin,
        }
    }

    /// 按绑定顺序列出三个引脚
    pub fn pins(&self) -> [(PinField, PinReference); 3] {
        PinField::ALL.map(|field| (field, self.pin(field)))
    }

    /// 还原成配置文件的写法，所有标识都显式写出
    ///
    /// 对输出再做一次校验会得到相同的记录。
    pub fn to_yaml(&self) -> Value {
        let mut root = Mapping::new();
        root.insert("id".into(), self.id.as_str().into());

        for (field, pin) in self.pins() {
            let value = if pin.inverted {
                let mut block = Mapping::new();
                block.insert("number".into(), pin.canonical().into());
                block.insert("inverted".into(), true.into());
                Value::Mapping(block)
            } else {
                pin.canonical().into()
            };
            root.insert(field.key().into(), value);
        }

        for sensor in self.measurements.iter() {
            let mut block = Mapping::new();
            block.insert("id".into(), sensor.id.as_str().into());
            if let Some(name) = &sensor.name {
                block.insert("name".into(), name.as_str().into());
            }
            root.insert(sensor.kind.key().into(), Value::Mapping(block));
        }

        Value::Mapping(root)
    }
}
