//! 测量类型定义
//!
//! 5-in-1 接收器能上报的七种测量，以及每种测量固定的发布契约（单位、精度、分类）。

use core::fmt;
use serde::Serialize;

/// 测量类型
///
/// 顺序即声明顺序，绑定时按此顺序依次分配发布器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Temperature,
    Humidity,
    WindSpeed,
    WindGust,
    WindDirection,
    Rain,
    Battery,
}

impl MeasurementKind {
    /// 全部测量类型，按声明顺序排列
    pub const ALL: [MeasurementKind; 7] = [
        MeasurementKind::Temperature,
        MeasurementKind::Humidity,
        MeasurementKind::WindSpeed,
        MeasurementKind::WindGust,
        MeasurementKind::WindDirection,
        MeasurementKind::Rain,
        MeasurementKind::Battery,
    ];

    /// 配置文件中使用的键名
    pub const fn key(self) -> &'static str {
        match self {
            MeasurementKind::Temperature => "temperature",
            MeasurementKind::Humidity => "humidity",
            MeasurementKind::WindSpeed => "wind_speed",
            MeasurementKind::WindGust => "wind_gust",
            MeasurementKind::WindDirection => "wind_direction",
            MeasurementKind::Rain => "rain",
            MeasurementKind::Battery => "battery",
        }
    }

    /// 在 [`MeasurementKind::ALL`] 中的下标，用作槽位索引
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// 该测量类型固定的发布描述
    pub fn descriptor(self) -> &'static SensorDescriptor {
        &DESCRIPTORS[self.index()]
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 设备语义分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Temperature,
    Humidity,
    Speed,
    Direction,
    Precipitation,
    Battery,
}

impl DeviceClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Temperature => "temperature",
            DeviceClass::Humidity => "humidity",
            DeviceClass::Speed => "speed",
            DeviceClass::Direction => "direction",
            DeviceClass::Precipitation => "precipitation",
            DeviceClass::Battery => "battery",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 状态分类
///
/// 本接收器只有瞬时测量值，没有累计型传感器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
}

/// 传感器输出描述
///
/// 单位、精度和分类由测量类型决定，用户无法配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorDescriptor {
    pub kind: MeasurementKind,
    pub unit_of_measurement: &'static str,
    pub accuracy_decimals: u8,
    pub device_class: DeviceClass,
    pub state_class: StateClass,
}

impl SensorDescriptor {
    /// 按精度和单位格式化一个测量值，例如 `21.4 °C`
    pub fn format_value(&self, value: f32) -> String {
        format!(
            "{value:.prec$} {unit}",
            prec = self.accuracy_decimals as usize,
            unit = self.unit_of_measurement
        )
    }
}

const fn descriptor(
    kind: MeasurementKind,
    unit_of_measurement: &'static str,
    accuracy_decimals: u8,
    device_class: DeviceClass,
) -> SensorDescriptor {
    SensorDescriptor {
        kind,
        unit_of_measurement,
        accuracy_decimals,
        device_class,
        state_class: StateClass::Measurement,
    }
}

/// 各测量类型的描述表，下标与 [`MeasurementKind::index`] 一致
pub static DESCRIPTORS: [SensorDescriptor; 7] = [
    descriptor(MeasurementKind::Temperature, "°C", 1, DeviceClass::Temperature),
    descriptor(MeasurementKind::Humidity, "%", 1, DeviceClass::Humidity),
    descriptor(MeasurementKind::WindSpeed, "m/s", 1, DeviceClass::Speed),
    descriptor(MeasurementKind::WindGust, "m/s", 1, DeviceClass::Speed),
    descriptor(MeasurementKind::WindDirection, "°", 0, DeviceClass::Direction),
    descriptor(MeasurementKind::Rain, "mm", 1, DeviceClass::Precipitation),
    descriptor(MeasurementKind::Battery, "%", 2, DeviceClass::Battery),
];
