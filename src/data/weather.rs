use core::fmt;

use super::measurement::MeasurementKind;

/// 一帧已解码的气象数据
///
/// 解码由外部射频库完成，这里只负责把各字段分发给对应的发布器。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeatherData {
    pub sensor_id: u8,
    pub temperature_celsius: f32,
    pub humidity: u8,
    pub wind_direction_degree: f32,
    pub wind_gust_meter_sec: f32,
    pub wind_avg_meter_sec: f32,
    pub rain_mm: f32,
    pub battery_ok: bool,
}

impl fmt::Display for WeatherData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WeatherData {{ id: {}, battery: {}, temperature: {:.1}°C, humidity: {}%, \
             wind gust: {:.1}m/s, wind speed: {:.1}m/s, direction: {:.1}°, rain: {:.1}mm }}",
            self.sensor_id,
            if self.battery_ok { "OK" } else { "Low" },
            self.temperature_celsius,
            self.humidity,
            self.wind_gust_meter_sec,
            self.wind_avg_meter_sec,
            self.wind_direction_degree,
            self.rain_mm
        )
    }
}

impl WeatherData {
    /// 取出某一测量类型对应的值
    ///
    /// 电池状态按百分比发布：正常为 100，电量低为 0。
    pub fn value(&self, kind: MeasurementKind) -> f32 {
        match kind {
            MeasurementKind::Temperature => self.temperature_celsius,
            MeasurementKind::Humidity => f32::from(self.humidity),
            MeasurementKind::WindSpeed => self.wind_avg_meter_sec,
            MeasurementKind::WindGust => self.wind_gust_meter_sec,
            MeasurementKind::WindDirection => self.wind_direction_degree,
            MeasurementKind::Rain => self.rain_mm,
            MeasurementKind::Battery => {
                if self.battery_ok {
                    100.0
                } else {
                    0.0
                }
            }
        }
    }
}
