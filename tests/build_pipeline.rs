//! 从配置文件到已注册组件的完整流程

use std::io::Write;

use esp_bresser_5in1::app::{BuildError, BuildHost};
use esp_bresser_5in1::config::{
    BuildConfig, IdentityRegistry, LoadError, PinField, SchemaValidator, TargetPlatform,
    ValidationError,
};
use esp_bresser_5in1::data::{MeasurementKind, WeatherData};
use esp_bresser_5in1::run_build;
use proptest::prelude::*;
use serde_yaml::{Mapping, Value};

fn declaration(pins: &[(PinField, u8)], kinds: &[MeasurementKind]) -> Value {
    let mut block = Mapping::new();
    for (field, pin) in pins {
        block.insert(field.key().into(), Value::from(*pin));
    }
    for kind in kinds {
        block.insert(kind.key().into(), Value::Mapping(Mapping::new()));
    }
    Value::Mapping(block)
}

fn config(declarations: Vec<Value>) -> BuildConfig {
    BuildConfig {
        platform: TargetPlatform::Esp32C3,
        declarations,
    }
}

/// 三个互不相同、可作为输出的引脚
fn distinct_pins() -> impl Strategy<Value = Vec<u8>> {
    proptest::sample::subsequence(TargetPlatform::Esp32C3.output_pins().to_vec(), 3)
        .prop_shuffle()
}

fn measurement_subset() -> impl Strategy<Value = Vec<MeasurementKind>> {
    proptest::sample::subsequence(MeasurementKind::ALL.to_vec(), 0..=7)
}

/// 引脚值的三种写法之一，可能带反相
fn pin_value(number: u8, inverted: bool) -> Value {
    if inverted {
        let mut block = Mapping::new();
        block.insert("number".into(), format!("GPIO{number}").into());
        block.insert("inverted".into(), true.into());
        Value::Mapping(block)
    } else {
        Value::from(number)
    }
}

/// 带可选名称的测量子块
fn sensor_block(name: Option<String>) -> Value {
    let mut block = Mapping::new();
    if let Some(name) = name {
        block.insert("name".into(), name.into());
    }
    Value::Mapping(block)
}

fn measurement_names() -> impl Strategy<Value = Vec<(MeasurementKind, Option<String>)>> {
    measurement_subset().prop_flat_map(|kinds| {
        let len = kinds.len();
        (
            Just(kinds),
            prop::collection::vec(prop::option::of("[A-Za-z][A-Za-z ]{0,12}"), len),
        )
            .prop_map(|(kinds, names)| kinds.into_iter().zip(names).collect::<Vec<_>>())
    })
}

/// `count` 个声明各自使用的三个引脚，互不重复
fn pin_groups(count: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::sample::subsequence(TargetPlatform::Esp32C3.output_pins().to_vec(), count * 3)
        .prop_shuffle()
        .prop_map(|pins| pins.chunks(3).map(<[u8]>::to_vec).collect())
}

fn with_id(mut declaration: Value, id: &str) -> Value {
    if let Value::Mapping(block) = &mut declaration {
        block.insert("id".into(), id.into());
    }
    declaration
}

#[test]
fn test_load_from_file_and_build() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "
platform: esp32
bresser_5in1:
  - id: roof
    chip_select_pin: GPIO5
    gd0_pin: GPIO4
    gd2_pin: GPIO2
    temperature: {{name: Roof temperature}}
    wind_speed: {{}}
  - chip_select_pin: 25
    gd0_pin: 26
    gd2_pin: 27
    rain:
"
    )
    .unwrap();

    let config = BuildConfig::from_file(file.path()).unwrap();
    assert_eq!(config.platform, TargetPlatform::Esp32);

    let mut host = BuildHost::new(config.platform);
    let summary = run_build(&config, &mut host).unwrap();
    assert_eq!(
        summary
            .components
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>(),
        vec!["roof", "bresser_5in1"]
    );
    assert_eq!(summary.publishers, 3);

    let registry = host.registry_mut();
    registry.setup_all();
    let roof = summary.components[0].clone();
    let station = registry.get_mut(&roof).unwrap();
    station.receive(WeatherData {
        temperature_celsius: 4.25,
        wind_avg_meter_sec: 7.0,
        battery_ok: false,
        ..WeatherData::default()
    });
    registry.poll_all();

    let station = registry.get(&roof).unwrap();
    let temperature = station.sensor(MeasurementKind::Temperature).unwrap();
    assert_eq!(temperature.name(), "Roof temperature");
    assert_eq!(temperature.state(), Some(4.25));
    let wind = station.sensor(MeasurementKind::WindSpeed).unwrap();
    assert_eq!(wind.state_text().as_deref(), Some("7.0 m/s"));
    assert!(station.sensor(MeasurementKind::Battery).is_none());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = BuildConfig::from_file(dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(LoadError::Io { .. })));
}

#[test]
fn test_pin_not_output_capable_on_platform() {
    // GPIO34 在 ESP32 上只能输入
    let pins = [
        (PinField::ChipSelect, 5),
        (PinField::Gd0, 34),
        (PinField::Gd2, 4),
    ];
    let config = BuildConfig {
        platform: TargetPlatform::Esp32,
        declarations: vec![declaration(&pins, &[])],
    };

    let mut host = BuildHost::new(config.platform);
    let Err(BuildError::Validation(report)) = run_build(&config, &mut host) else {
        panic!("expected validation failure");
    };
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        ValidationError::InvalidPinReference { field, .. } if field == "gd0_pin"
    ));
    assert!(host.registry().is_empty());
}

proptest! {
    #[test]
    fn test_pins_only_declaration_has_no_publishers(pins in distinct_pins()) {
        let pins: Vec<_> = PinField::ALL.into_iter().zip(pins).collect();
        let config = config(vec![declaration(&pins, &[])]);

        let mut host = BuildHost::new(config.platform);
        let summary = run_build(&config, &mut host).unwrap();

        prop_assert_eq!(summary.components.len(), 1);
        prop_assert_eq!(summary.publishers, 0);
        let station = host.registry().get(&summary.components[0]).unwrap();
        for (field, number) in pins {
            prop_assert_eq!(station.pin(field).map(|pin| pin.number()), Some(number));
        }
    }

    #[test]
    fn test_publishers_match_configured_kinds(
        pins in distinct_pins(),
        kinds in measurement_subset(),
    ) {
        let pins: Vec<_> = PinField::ALL.into_iter().zip(pins).collect();
        let config = config(vec![declaration(&pins, &kinds)]);

        let mut host = BuildHost::new(config.platform);
        let summary = run_build(&config, &mut host).unwrap();
        prop_assert_eq!(summary.publishers, kinds.len());

        let station = host.registry().get(&summary.components[0]).unwrap();
        for kind in MeasurementKind::ALL {
            let sensor = station.sensor(kind);
            prop_assert_eq!(sensor.is_some(), kinds.contains(&kind));
            if let Some(sensor) = sensor {
                prop_assert_eq!(sensor.descriptor(), kind.descriptor());
            }
        }
    }

    #[test]
    fn test_missing_pin_is_named(
        pins in distinct_pins(),
        missing in 0usize..3,
        kinds in measurement_subset(),
    ) {
        let pins: Vec<_> = PinField::ALL
            .into_iter()
            .zip(pins)
            .enumerate()
            .filter(|(index, _)| *index != missing)
            .map(|(_, pin)| pin)
            .collect();
        let config = config(vec![declaration(&pins, &kinds)]);

        let mut host = BuildHost::new(config.platform);
        let result = run_build(&config, &mut host);

        let Err(BuildError::Validation(report)) = result else {
            panic!("expected validation failure");
        };
        let expected = ValidationError::MissingRequiredField(
            PinField::ALL[missing].key().to_string(),
        );
        prop_assert_eq!(report.errors().collect::<Vec<_>>(), vec![&expected]);
        prop_assert!(host.registry().is_empty());
    }
}

proptest! {
    #[test]
    fn test_revalidating_rendered_record_is_identical(
        pins in distinct_pins(),
        inverted in prop::array::uniform3(any::<bool>()),
        measurements in measurement_names(),
        explicit_id in any::<bool>(),
    ) {
        let mut block = Mapping::new();
        if explicit_id {
            block.insert("id".into(), "garden".into());
        }
        for ((field, number), inverted) in PinField::ALL.into_iter().zip(pins).zip(inverted) {
            block.insert(field.key().into(), pin_value(number, inverted));
        }
        for (kind, name) in measurements {
            block.insert(kind.key().into(), sensor_block(name));
        }

        let validator = SchemaValidator::default();
        let record = validator
            .validate(&mut IdentityRegistry::new(), &Value::Mapping(block))
            .unwrap();
        let again = validator
            .validate(&mut IdentityRegistry::new(), &record.to_yaml())
            .unwrap();
        prop_assert_eq!(again, record);
    }

    #[test]
    fn test_second_of_two_explicit_ids_rejected(
        (count, first, second) in (2usize..=5)
            .prop_flat_map(|count| (Just(count), 0..count, 0..count))
            .prop_filter("two positions", |(_, first, second)| first != second),
        groups in pin_groups(5),
    ) {
        let (first, second) = (first.min(second), first.max(second));
        let declarations: Vec<_> = groups
            .iter()
            .take(count)
            .enumerate()
            .map(|(index, pins)| {
                let pins: Vec<_> = PinField::ALL.into_iter().zip(pins.iter().copied()).collect();
                let declaration = declaration(&pins, &[MeasurementKind::Rain]);
                if index == first || index == second {
                    with_id(declaration, "station")
                } else {
                    declaration
                }
            })
            .collect();

        let mut host = BuildHost::new(TargetPlatform::Esp32C3);
        let Err(BuildError::Validation(report)) = run_build(&config(declarations), &mut host) else {
            panic!("expected validation failure");
        };
        prop_assert_eq!(report.declarations.len(), 1);
        prop_assert_eq!(report.declarations[0].index, second);
        prop_assert_eq!(
            &report.declarations[0].errors,
            &vec![ValidationError::DuplicateIdentity("station".to_string())]
        );
        prop_assert!(host.registry().is_empty());
    }

    #[test]
    fn test_explicit_id_never_taken_by_generated_one(
        (count, explicit) in (2usize..=5).prop_flat_map(|count| (Just(count), 0..count)),
        groups in pin_groups(5),
    ) {
        let declarations: Vec<_> = groups
            .iter()
            .take(count)
            .enumerate()
            .map(|(index, pins)| {
                let pins: Vec<_> = PinField::ALL.into_iter().zip(pins.iter().copied()).collect();
                let declaration = declaration(&pins, &[MeasurementKind::Temperature]);
                if index == explicit {
                    with_id(declaration, "bresser_5in1")
                } else {
                    declaration
                }
            })
            .collect();

        let mut host = BuildHost::new(TargetPlatform::Esp32C3);
        let summary = run_build(&config(declarations), &mut host).unwrap();

        prop_assert_eq!(summary.components.len(), count);
        prop_assert_eq!(summary.components[explicit].as_str(), "bresser_5in1");
        let mut ids: Vec<_> = summary.components.iter().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), count);
    }
}
