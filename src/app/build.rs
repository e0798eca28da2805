//! 一次完整的构建
//!
//! 先校验全部声明并汇总错误，全部通过后才逐个绑定。任何错误都会使整次构建被拒绝。

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::config::{
    BuildConfig, ComponentId, IdentityRegistry, PinReference, SchemaValidator, SensorConfig,
    TargetPlatform, ValidationReport,
};
use crate::peripherals::{Bresser5in1, GpioPin, Sensor};

use super::binder::{self, BindError};
use super::host::{Host, HostError};
use super::registry::ComponentRegistry;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{0}")]
    Validation(#[from] ValidationReport),

    #[error(transparent)]
    Bind(#[from] BindError),
}

/// 构建结果概要
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub components: Vec<ComponentId>,
    pub publishers: usize,
}

/// 需要链接的外部库
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Library {
    pub name: &'static str,
    pub version: Option<&'static str>,
}

/// 构建产物声明的依赖
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildManifest {
    pub capabilities: BTreeSet<&'static str>,
    pub libraries: Vec<Library>,
}

impl BuildManifest {
    pub fn require(&mut self, capability: &'static str) {
        self.capabilities.insert(capability);
    }

    /// 同名库只记录一次
    pub fn add_library(&mut self, name: &'static str, version: Option<&'static str>) {
        if self.libraries.iter().all(|library| library.name != name) {
            self.libraries.push(Library { name, version });
        }
    }
}

pub type BuildComponent = Bresser5in1<GpioPin, Sensor>;

/// 构建期使用的内存宿主
pub struct BuildHost {
    platform: TargetPlatform,
    registry: ComponentRegistry<BuildComponent>,
    manifest: BuildManifest,
    used_pins: HashSet<u8>,
}

impl BuildHost {
    pub fn new(platform: TargetPlatform) -> Self {
        Self {
            platform,
            registry: ComponentRegistry::new(),
            manifest: BuildManifest::default(),
            used_pins: HashSet::new(),
        }
    }

    pub fn platform(&self) -> TargetPlatform {
        self.platform
    }

    pub fn registry(&self) -> &ComponentRegistry<BuildComponent> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry<BuildComponent> {
        &mut self.registry
    }

    pub fn manifest(&self) -> &BuildManifest {
        &self.manifest
    }
}

impl Host for BuildHost {
    type Pin = GpioPin;
    type Publisher = Sensor;

    fn register_component(&mut self, component: BuildComponent) -> Result<(), HostError> {
        self.registry.register(component.id().clone(), component)
    }

    fn component_mut(&mut self, id: &ComponentId) -> Option<&mut BuildComponent> {
        self.registry.get_mut(id)
    }

    fn allocate_pin(&mut self, pin: &PinReference) -> Result<GpioPin, HostError> {
        if !self.platform.is_output_capable(pin.number) {
            return Err(HostError::InvalidPin(pin.number));
        }
        if !self.used_pins.insert(pin.number) {
            return Err(HostError::PinAlreadyUsed(pin.number));
        }
        Ok(GpioPin::new(*pin))
    }

    fn allocate_publisher(&mut self, sensor: &SensorConfig) -> Result<Sensor, HostError> {
        Ok(Sensor::new(
            sensor.id.clone(),
            sensor.name.clone(),
            sensor.descriptor(),
        ))
    }

    fn require_capability(&mut self, capability: &'static str) {
        self.manifest.require(capability);
    }

    fn add_library(&mut self, name: &'static str, version: Option<&'static str>) {
        self.manifest.add_library(name, version);
    }
}

/// 执行一次构建
///
/// # 参数
/// * `config` - 已加载的配置
/// * `host` - 接收组件的宿主
///
/// # 返回
/// * `Ok(BuildSummary)` - 全部声明都已注册
/// * `Err(BuildError::Validation)` - 校验失败，包含全部错误，没有任何组件被注册
/// * `Err(BuildError::Bind)` - 绑定失败，构建被拒绝
pub fn run_build<H: Host>(config: &BuildConfig, host: &mut H) -> Result<BuildSummary, BuildError> {
    let mut registry = IdentityRegistry::new();
    let validator = SchemaValidator::new(config.platform);
    let records = validator.validate_all(&mut registry, &config.declarations)?;

    let mut summary = BuildSummary::default();
    for record in records {
        let id = record.id.clone();
        let publishers = record.measurements.len();
        if let Err(e) = binder::bind(record, host) {
            log::error!("{e}");
            return Err(e.into());
        }
        summary.components.push(id);
        summary.publishers += publishers;
    }

    log::info!(
        "构建完成: {} 个组件，{} 个发布器",
        summary.components.len(),
        summary.publishers
    );
    Ok(summary)
}
