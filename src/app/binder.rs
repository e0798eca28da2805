//! 组件绑定
//!
//! 把一个已校验的 [`ConfigRecord`] 变成宿主中的一个组件：先注册组件，
//! 再依次挂接片选、GDO0、GDO2 引脚，最后按声明顺序挂接已配置的发布器。
//! 任何一步失败都立即中止，已挂接的部分不回滚，整次构建会被拒绝。

use thiserror::Error;

use crate::config::{ComponentId, ConfigRecord, PinField, PinReference};
use crate::data::MeasurementKind;
use crate::peripherals::Bresser5in1;

use super::host::{Host, HostError};

/// 组件依赖的总线
pub const SPI_CAPABILITY: &str = "spi";
/// 负责 CC1101 收发与解码的外部库
pub const RADIO_LIBRARY: &str = "RadioLib";

/// 绑定阶段的错误
#[derive(Debug, Error)]
pub enum BindError {
    #[error("组件 `{id}` 注册失败: {source}")]
    Registration {
        id: ComponentId,
        #[source]
        source: HostError,
    },

    #[error("组件 `{id}` 的引脚 {field} ({pin}) 解析失败: {source}")]
    PinResolution {
        id: ComponentId,
        field: PinField,
        pin: PinReference,
        #[source]
        source: HostError,
    },

    #[error("组件 `{id}` 的 {kind} 发布器分配失败: {source}")]
    PublisherAllocation {
        id: ComponentId,
        kind: MeasurementKind,
        #[source]
        source: HostError,
    },
}

impl BindError {
    pub fn id(&self) -> &ComponentId {
        match self {
            BindError::Registration { id, .. }
            | BindError::PinResolution { id, .. }
            | BindError::PublisherAllocation { id, .. } => id,
        }
    }
}

/// 绑定一个声明
///
/// 记录被消耗，成功后组件只能通过宿主的注册表访问。
pub fn bind<H: Host>(record: ConfigRecord, host: &mut H) -> Result<(), BindError> {
    let pins = record.pins();
    let ConfigRecord {
        id, measurements, ..
    } = record;

    host.require_capability(SPI_CAPABILITY);
    host.add_library(RADIO_LIBRARY, None);

    host.register_component(Bresser5in1::new(id.clone()))
        .map_err(|source| BindError::Registration {
            id: id.clone(),
            source,
        })?;

    for (field, pin) in pins {
        log::debug!("[{id}] 挂接引脚 {field} -> {pin}");
        let handle = host
            .allocate_pin(&pin)
            .map_err(|source| BindError::PinResolution {
                id: id.clone(),
                field,
                pin,
                source,
            })?;
        registered(host, &id)?.set_pin(field, handle);
    }

    for sensor in measurements {
        log::debug!("[{id}] 挂接发布器 {} -> `{}`", sensor.kind, sensor.id);
        let publisher = host
            .allocate_publisher(&sensor)
            .map_err(|source| BindError::PublisherAllocation {
                id: id.clone(),
                kind: sensor.kind,
                source,
            })?;
        registered(host, &id)?.set_sensor(sensor.kind, publisher);
    }

    Ok(())
}

fn registered<'h, H: Host>(
    host: &'h mut H,
    id: &ComponentId,
) -> Result<&'h mut Bresser5in1<H::Pin, H::Publisher>, BindError> {
    host.component_mut(id).ok_or_else(|| BindError::Registration {
        id: id.clone(),
        source: HostError::UnknownComponent(id.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MeasurementSlots, SensorConfig};
    use crate::peripherals::Publisher;

    #[derive(Debug, Default, PartialEq)]
    struct FakePublisher(Option<MeasurementKind>);

    impl Publisher for FakePublisher {
        fn publish_state(&mut self, _value: f32) {}
    }

    /// 记录调用顺序，可在指定步骤注入失败
    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<String>,
        components: Vec<Bresser5in1<u8, FakePublisher>>,
        fail_pin: Option<u8>,
        fail_publisher: Option<MeasurementKind>,
        fail_register: bool,
    }

    impl Host for RecordingHost {
        type Pin = u8;
        type Publisher = FakePublisher;

        fn register_component(
            &mut self,
            component: Bresser5in1<u8, FakePublisher>,
        ) -> Result<(), HostError> {
            self.calls.push(format!("register {}", component.id()));
            if self.fail_register {
                return Err(HostError::DuplicateComponent(component.id().to_string()));
            }
            self.components.push(component);
            Ok(())
        }

        fn component_mut(
            &mut self,
            id: &ComponentId,
        ) -> Option<&mut Bresser5in1<u8, FakePublisher>> {
            self.components.iter_mut().find(|c| c.id() == id)
        }

        fn allocate_pin(&mut self, pin: &PinReference) -> Result<u8, HostError> {
            self.calls.push(format!("pin {}", pin.number));
            if self.fail_pin == Some(pin.number) {
                return Err(HostError::PinAlreadyUsed(pin.number));
            }
            Ok(pin.number)
        }

        fn allocate_publisher(&mut self, sensor: &SensorConfig) -> Result<FakePublisher, HostError> {
            self.calls.push(format!("publisher {}", sensor.kind));
            if self.fail_publisher == Some(sensor.kind) {
                return Err(HostError::Allocation("out of memory".to_string()));
            }
            Ok(FakePublisher(Some(sensor.kind)))
        }

        fn require_capability(&mut self, capability: &'static str) {
            self.calls.push(format!("require {capability}"));
        }

        fn add_library(&mut self, name: &'static str, _version: Option<&'static str>) {
            self.calls.push(format!("library {name}"));
        }
    }

    fn record(kinds: &[MeasurementKind]) -> ConfigRecord {
        let mut measurements = MeasurementSlots::new();
        for &kind in kinds {
            measurements.insert(SensorConfig {
                kind,
                id: ComponentId::parse(&format!("station_{kind}")).unwrap(),
                name: None,
            });
        }
        ConfigRecord {
            id: ComponentId::parse("station").unwrap(),
            chip_select_pin: PinReference::new(5),
            gd0_pin: PinReference::new(6),
            gd2_pin: PinReference::new(7),
            measurements,
        }
    }

    #[test]
    fn test_step_order() {
        let mut host = RecordingHost::default();
        bind(
            record(&[MeasurementKind::Battery, MeasurementKind::Temperature]),
            &mut host,
        )
        .unwrap();

        assert_eq!(
            host.calls,
            vec![
                "require spi",
                "library RadioLib",
                "register station",
                "pin 5",
                "pin 6",
                "pin 7",
                "publisher temperature",
                "publisher battery",
            ]
        );

        let station = &host.components[0];
        assert_eq!(station.pin(PinField::ChipSelect), Some(&5));
        assert_eq!(station.pin(PinField::Gd0), Some(&6));
        assert_eq!(station.pin(PinField::Gd2), Some(&7));
        assert_eq!(station.publisher_count(), 2);
        assert_eq!(
            station.sensor(MeasurementKind::Battery),
            Some(&FakePublisher(Some(MeasurementKind::Battery)))
        );
    }

    #[test]
    fn test_no_measurements() {
        let mut host = RecordingHost::default();
        bind(record(&[]), &mut host).unwrap();

        assert_eq!(host.components.len(), 1);
        assert_eq!(host.components[0].publisher_count(), 0);
    }

    #[test]
    fn test_pin_failure_aborts_remaining_steps() {
        let mut host = RecordingHost {
            fail_pin: Some(6),
            ..Default::default()
        };

        let err = bind(record(&[MeasurementKind::Rain]), &mut host).unwrap_err();
        assert!(matches!(
            &err,
            BindError::PinResolution { field: PinField::Gd0, pin, source: HostError::PinAlreadyUsed(6), .. }
                if pin.number == 6
        ));
        assert_eq!(err.id().as_str(), "station");

        // 已挂接的片选不回滚，后续步骤不再执行
        assert_eq!(host.calls.last().map(String::as_str), Some("pin 6"));
        assert_eq!(host.components[0].pin(PinField::ChipSelect), Some(&5));
        assert_eq!(host.components[0].publisher_count(), 0);
    }

    #[test]
    fn test_publisher_failure() {
        let mut host = RecordingHost {
            fail_publisher: Some(MeasurementKind::Humidity),
            ..Default::default()
        };

        let err = bind(
            record(&[
                MeasurementKind::Temperature,
                MeasurementKind::Humidity,
                MeasurementKind::Rain,
            ]),
            &mut host,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            BindError::PublisherAllocation { kind: MeasurementKind::Humidity, .. }
        ));
        assert_eq!(host.components[0].publisher_count(), 1);
        assert!(!host.calls.contains(&"publisher rain".to_string()));
    }

    #[test]
    fn test_registration_failure() {
        let mut host = RecordingHost {
            fail_register: true,
            ..Default::default()
        };

        let err = bind(record(&[]), &mut host).unwrap_err();
        assert!(matches!(err, BindError::Registration { .. }));
        assert!(host.components.is_empty());
        assert!(!host.calls.iter().any(|call| call.starts_with("pin")));
    }
}
