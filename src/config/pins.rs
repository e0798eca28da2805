//! 引脚配置定义
//!
//! 引脚引用的解析，以及各目标芯片上可作为输出的 GPIO 列表

use core::fmt;
use core::str::FromStr;

use serde_yaml::Value;

use super::error::ValidationError;

/// 接收器的三个必填引脚
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinField {
    /// CC1101 片选
    ChipSelect,
    /// CC1101 GDO0 数据输出
    Gd0,
    /// CC1101 GDO2 数据输出
    Gd2,
}

impl PinField {
    /// 绑定时的固定顺序: 片选、GDO0、GDO2
    pub const ALL: [PinField; 3] = [PinField::ChipSelect, PinField::Gd0, PinField::Gd2];

    pub const fn key(self) -> &'static str {
        match self {
            PinField::ChipSelect => "chip_select_pin",
            PinField::Gd0 => "gd0_pin",
            PinField::Gd2 => "gd2_pin",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for PinField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 已校验的引脚引用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinReference {
    pub number: u8,
    pub inverted: bool,
}

impl PinReference {
    pub const fn new(number: u8) -> Self {
        Self {
            number,
            inverted: false,
        }
    }

    pub const fn inverted(number: u8) -> Self {
        Self {
            number,
            inverted: true,
        }
    }

    /// 规范写法，例如 `GPIO5`
    pub fn canonical(&self) -> String {
        format!("GPIO{}", self.number)
    }

    /// 从配置值解析引脚，并检查它在目标芯片上能否作为输出
    ///
    /// 支持三种写法：整数 `5`，字符串 `GPIO5` / `P5` / `5`，
    /// 以及配置块 `{ number: GPIO5, inverted: true }`。
    pub fn from_value(
        field: &str,
        value: &Value,
        platform: TargetPlatform,
    ) -> Result<Self, Vec<ValidationError>> {
        let pin = match value {
            Value::Mapping(block) => {
                let mut errors = Vec::new();
                for key in block.keys() {
                    match key.as_str() {
                        Some("number") | Some("inverted") => {}
                        _ => errors.push(ValidationError::UnknownField(format!(
                            "{field}.{}",
                            render_key(key)
                        ))),
                    }
                }

                let inverted = match block.get("inverted") {
                    None => false,
                    Some(Value::Bool(inverted)) => *inverted,
                    Some(_) => {
                        errors.push(ValidationError::InvalidType {
                            field: format!("{field}.inverted"),
                            expected: "布尔值",
                        });
                        false
                    }
                };

                let number = match block.get("number") {
                    None => {
                        errors.push(ValidationError::MissingRequiredField(format!(
                            "{field}.number"
                        )));
                        None
                    }
                    Some(number) => match parse_number(field, number) {
                        Ok(number) => Some(number),
                        Err(e) => {
                            errors.push(e);
                            None
                        }
                    },
                };

                match number {
                    Some(number) if errors.is_empty() => PinReference { number, inverted },
                    _ => return Err(errors),
                }
            }
            other => PinReference::new(parse_number(field, other).map_err(|e| vec![e])?),
        };

        if !platform.is_output_capable(pin.number) {
            return Err(vec![ValidationError::InvalidPinReference {
                field: field.to_string(),
                value: render_value(value),
                reason: format!("GPIO{} 不是 {platform} 上可用的输出引脚", pin.number),
            }]);
        }

        Ok(pin)
    }
}

impl fmt::Display for PinReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            write!(f, "GPIO{} (inverted)", self.number)
        } else {
            write!(f, "GPIO{}", self.number)
        }
    }
}

/// 解析 `GPIO5`、`gpio5`、`P5`、`5` 这类写法
pub fn parse_pin_number(text: &str) -> Option<u8> {
    let text = text.trim();
    let digits = ["GPIO", "gpio", "P", "p"]
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn parse_number(field: &str, value: &Value) -> Result<u8, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidPinReference {
        field: field.to_string(),
        value: render_value(value),
        reason: reason.to_string(),
    };

    match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| invalid("引脚编号超出范围")),
        Value::String(text) => parse_pin_number(text).ok_or_else(|| invalid("无法解析引脚编号")),
        _ => Err(ValidationError::InvalidType {
            field: field.to_string(),
            expected: "引脚编号或引脚配置块",
        }),
    }
}

pub(crate) fn render_key(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        other => render_value(other),
    }
}

pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_else(|_| format!("{other:?}")),
    }
}

/// 目标芯片
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetPlatform {
    Esp32,
    #[default]
    Esp32C3,
    Esp8266,
}

impl TargetPlatform {
    /// 可作为输出的 GPIO 编号
    pub const fn output_pins(self) -> &'static [u8] {
        match self {
            // 6-11 接 SPI Flash，34-39 只能输入
            TargetPlatform::Esp32 => &[
                0, 1, 2, 3, 4, 5, 12, 13, 14, 15, 16, 17, 18, 19, 21, 22, 23, 25, 26, 27, 32, 33,
            ],
            TargetPlatform::Esp32C3 => &[
                0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 21,
            ],
            TargetPlatform::Esp8266 => &[0, 1, 2, 3, 4, 5, 12, 13, 14, 15, 16],
        }
    }

    pub fn is_output_capable(self, pin: u8) -> bool {
        self.output_pins().contains(&pin)
    }

    pub const fn name(self) -> &'static str {
        match self {
            TargetPlatform::Esp32 => "esp32",
            TargetPlatform::Esp32C3 => "esp32c3",
            TargetPlatform::Esp8266 => "esp8266",
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "esp32" => Ok(TargetPlatform::Esp32),
            "esp32c3" | "esp32-c3" => Ok(TargetPlatform::Esp32C3),
            "esp8266" => Ok(TargetPlatform::Esp8266),
            other => Err(format!("未知的目标芯片: {other}")),
        }
    }
}
