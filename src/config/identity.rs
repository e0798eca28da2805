//! 构建期标识注册表
//!
//! 记录一次构建中已使用的标识和引脚，防止冲突。生命周期与一次构建相同，
//! 由调用方显式创建并传给校验器，构建结束后丢弃。
//!
//! 显式标识在校验前先登记为保留名，生成标识时跳过它们，
//! 因此生成的标识不会与任何显式标识冲突，结果也与声明顺序无关。

use core::fmt;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::error::ValidationError;

/// 组件或传感器的标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// 校验标识写法: 非空，首字符为字母或下划线，其余为字母、数字或下划线
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let mut chars = text.chars();
        let valid_head = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_head || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ValidationError::InvalidIdentity(text.to_string()));
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 标识与引脚的占用表
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    used_ids: HashSet<ComponentId>,
    /// 配置中显式写出的标识，只用于让生成的标识避让
    reserved: HashSet<String>,
    used_pins: HashMap<u8, String>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 占用一个显式给出的标识
    ///
    /// # 返回
    /// * `Ok(())` - 标识尚未被使用
    /// * `Err(ValidationError::DuplicateIdentity)` - 标识已被占用
    pub fn claim(&mut self, id: &ComponentId) -> Result<(), ValidationError> {
        if !self.used_ids.insert(id.clone()) {
            return Err(ValidationError::DuplicateIdentity(id.to_string()));
        }
        Ok(())
    }

    /// 登记一个显式标识
    ///
    /// 保留名不算占用，之后仍需 [`IdentityRegistry::claim`]。
    pub fn reserve(&mut self, text: &str) {
        self.reserved.insert(text.to_string());
    }

    /// 生成并占用一个新标识
    ///
    /// 优先使用 `base` 本身，被占用或被保留时依次尝试 `base_2`、`base_3` ……
    pub fn generate(&mut self, base: &str) -> ComponentId {
        let mut candidate = ComponentId(base.to_string());
        let mut suffix = 2;
        while self.used_ids.contains(&candidate) || self.reserved.contains(candidate.as_str()) {
            candidate = ComponentId(format!("{base}_{suffix}"));
            suffix += 1;
        }
        self.used_ids.insert(candidate.clone());
        candidate
    }

    /// 占用一个物理引脚
    ///
    /// # 参数
    /// * `pin` - GPIO 编号
    /// * `owner` - 占用者，形如 `weather_station.gd0_pin`
    pub fn claim_pin(&mut self, pin: u8, owner: String) -> Result<(), ValidationError> {
        if let Some(previous) = self.used_pins.get(&pin) {
            return Err(ValidationError::PinConflict {
                field: owner,
                pin,
                owner: previous.clone(),
            });
        }
        self.used_pins.insert(pin, owner);
        Ok(())
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.used_ids.contains(id)
    }

    pub fn pin_owner(&self, pin: u8) -> Option<&str> {
        self.used_pins.get(&pin).map(String::as_str)
    }
}
