//! 配置校验器
//!
//! 把一个未经类型化的配置块校验成 [`ConfigRecord`]。一次校验会收集该声明中
//! 能发现的全部错误，而不是遇到第一个就返回。

use serde_yaml::{Mapping, Value};

use super::error::{DeclarationErrors, ValidationError, ValidationReport};
use super::identity::{ComponentId, IdentityRegistry};
use super::pins::{render_key, PinField, PinReference, TargetPlatform};
use super::record::{ConfigRecord, MeasurementSlots, SensorConfig};
use crate::data::MeasurementKind;

pub const CONF_ID: &str = "id";
pub const CONF_NAME: &str = "name";

/// 未指定标识时组件标识的前缀
pub const COMPONENT_ID_BASE: &str = "bresser_5in1";

/// 配置校验器
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator {
    platform: TargetPlatform,
}

impl SchemaValidator {
    pub fn new(platform: TargetPlatform) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> TargetPlatform {
        self.platform
    }

    /// 校验单个声明
    ///
    /// # 参数
    /// * `registry` - 本次构建的标识注册表，跨声明共享
    /// * `raw` - 声明的原始配置块
    ///
    /// # 返回
    /// * `Ok(ConfigRecord)` - 校验通过
    /// * `Err(Vec<ValidationError>)` - 该声明中发现的全部错误
    pub fn validate(
        &self,
        registry: &mut IdentityRegistry,
        raw: &Value,
    ) -> Result<ConfigRecord, Vec<ValidationError>> {
        let Some(block) = raw.as_mapping() else {
            return Err(vec![ValidationError::InvalidType {
                field: COMPONENT_ID_BASE.to_string(),
                expected: "配置块",
            }]);
        };

        reserve_explicit(registry, raw);
        let mut errors = Vec::new();

        let id = match block.get(CONF_ID) {
            None | Some(Value::Null) => Some(registry.generate(COMPONENT_ID_BASE)),
            Some(value) => claim_explicit(registry, CONF_ID, value).unwrap_or_else(|e| {
                errors.push(e);
                None
            }),
        };
        // 标识无效时仍继续校验，引脚占用者用默认前缀记录
        let owner = id
            .as_ref()
            .map_or(COMPONENT_ID_BASE, ComponentId::as_str)
            .to_string();

        let mut pins = [None; 3];
        for (slot, field) in pins.iter_mut().zip(PinField::ALL) {
            let Some(value) = block.get(field.key()) else {
                errors.push(ValidationError::MissingRequiredField(field.key().to_string()));
                continue;
            };
            match PinReference::from_value(field.key(), value, self.platform) {
                Ok(pin) => match registry.claim_pin(pin.number, format!("{owner}.{field}")) {
                    Ok(()) => *slot = Some(pin),
                    Err(e) => errors.push(e),
                },
                Err(e) => errors.extend(e),
            }
        }

        let mut measurements = MeasurementSlots::new();
        for kind in MeasurementKind::ALL {
            let Some(value) = block.get(kind.key()) else {
                continue;
            };
            match self.validate_sensor(registry, &owner, kind, value) {
                Ok(sensor) => measurements.insert(sensor),
                Err(e) => errors.extend(e),
            }
        }

        for key in block.keys() {
            let known = key.as_str().is_some_and(|key| {
                key == CONF_ID
                    || PinField::from_key(key).is_some()
                    || MeasurementKind::from_key(key).is_some()
            });
            if !known {
                errors.push(ValidationError::UnknownField(render_key(key)));
            }
        }

        match (id, pins) {
            (Some(id), [Some(chip_select_pin), Some(gd0_pin), Some(gd2_pin)]) if errors.is_empty() => {
                log::info!(
                    "声明 `{id}` 校验通过: 引脚 {chip_select_pin}/{gd0_pin}/{gd2_pin}，测量槽 {} 个",
                    measurements.len()
                );
                Ok(ConfigRecord {
                    id,
                    chip_select_pin,
                    gd0_pin,
                    gd2_pin,
                    measurements,
                })
            }
            _ => Err(errors),
        }
    }

    /// 校验测量子块，只接受 `id` 和 `name`
    fn validate_sensor(
        &self,
        registry: &mut IdentityRegistry,
        owner: &str,
        kind: MeasurementKind,
        value: &Value,
    ) -> Result<SensorConfig, Vec<ValidationError>> {
        let empty = Mapping::new();
        let block = match value {
            Value::Null => &empty,
            Value::Mapping(block) => block,
            _ => {
                return Err(vec![ValidationError::InvalidType {
                    field: kind.key().to_string(),
                    expected: "配置块",
                }])
            }
        };

        let mut errors = Vec::new();

        for key in block.keys() {
            if !matches!(key.as_str(), Some(CONF_ID) | Some(CONF_NAME)) {
                errors.push(ValidationError::UnknownField(format!(
                    "{kind}.{}",
                    render_key(key)
                )));
            }
        }

        let name = match block.get(CONF_NAME) {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(_) => {
                errors.push(ValidationError::InvalidType {
                    field: format!("{kind}.{CONF_NAME}"),
                    expected: "字符串",
                });
                None
            }
        };

        let id = match block.get(CONF_ID) {
            None | Some(Value::Null) => Some(registry.generate(&format!("{owner}_{kind}"))),
            Some(value) => claim_explicit(registry, &format!("{kind}.{CONF_ID}"), value)
                .unwrap_or_else(|e| {
                    errors.push(e);
                    None
                }),
        };

        match id {
            Some(id) if errors.is_empty() => Ok(SensorConfig { kind, id, name }),
            _ => Err(errors),
        }
    }

    /// 校验全部声明，汇总所有错误
    ///
    /// 某个声明失败不会中断对后续声明的校验。
    pub fn validate_all(
        &self,
        registry: &mut IdentityRegistry,
        declarations: &[Value],
    ) -> Result<Vec<ConfigRecord>, ValidationReport> {
        let mut records = Vec::with_capacity(declarations.len());
        let mut report = ValidationReport::default();

        // 先登记全部显式标识，生成的标识才不会抢占后面声明的名字
        for raw in declarations {
            reserve_explicit(registry, raw);
        }

        for (index, raw) in declarations.iter().enumerate() {
            match self.validate(registry, raw) {
                Ok(record) => records.push(record),
                Err(errors) => {
                    let id = raw
                        .get(CONF_ID)
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    for error in &errors {
                        log::warn!("bresser_5in1[{index}]: {error}");
                    }
                    report.declarations.push(DeclarationErrors { index, id, errors });
                }
            }
        }

        if report.is_empty() {
            Ok(records)
        } else {
            Err(report)
        }
    }
}

/// 把声明及其测量子块中显式写出的标识登记为保留名
fn reserve_explicit(registry: &mut IdentityRegistry, raw: &Value) {
    let Some(block) = raw.as_mapping() else {
        return;
    };
    if let Some(id) = block.get(CONF_ID).and_then(Value::as_str) {
        registry.reserve(id);
    }
    for kind in MeasurementKind::ALL {
        if let Some(id) = block
            .get(kind.key())
            .and_then(|sensor| sensor.get(CONF_ID))
            .and_then(Value::as_str)
        {
            registry.reserve(id);
        }
    }
}

/// 解析并占用显式给出的标识
fn claim_explicit(
    registry: &mut IdentityRegistry,
    field: &str,
    value: &Value,
) -> Result<Option<ComponentId>, ValidationError> {
    let Some(text) = value.as_str() else {
        return Err(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "字符串",
        });
    };
    let id = ComponentId::parse(text)?;
    registry.claim(&id)?;
    Ok(Some(id))
}
