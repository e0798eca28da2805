//! Bresser 5-in-1 接收器组件
//!
//! 组件持有 CC1101 的三个引脚和最多七个测量发布器。射频解码由外部库完成，
//! 解码出的数据经 [`Bresser5in1::receive`] 交给组件，在下一次轮询时发布。
//! 设置了站点编号时，只接收该站点的数据帧。

use embedded_hal::digital::OutputPin;

use crate::app::registry::Component;
use crate::config::{ComponentId, PinField};
use crate::data::{MeasurementKind, WeatherData};

use super::sensor::Publisher;

pub struct Bresser5in1<P, S> {
    id: ComponentId,
    pins: [Option<P>; 3],
    sensors: [Option<S>; 7],
    /// 只接收此编号的站点，未设置时接收全部
    sensor_id: Option<u8>,
    pending: Option<WeatherData>,
}

impl<P, S> Bresser5in1<P, S> {
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            pins: Default::default(),
            sensors: Default::default(),
            sensor_id: None,
            pending: None,
        }
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn set_pin(&mut self, field: PinField, pin: P) {
        self.pins[field as usize] = Some(pin);
    }

    pub fn pin(&self, field: PinField) -> Option<&P> {
        self.pins[field as usize].as_ref()
    }

    pin_setters! {
        set_cs_pin => ChipSelect,
        set_gd0_pin => Gd0,
        set_gd2_pin => Gd2,
    }

    pub fn set_sensor(&mut self, kind: MeasurementKind, sensor: S) {
        self.sensors[kind.index()] = Some(sensor);
    }

    pub fn sensor(&self, kind: MeasurementKind) -> Option<&S> {
        self.sensors[kind.index()].as_ref()
    }

    sensor_setters! {
        set_temperature_sensor => Temperature,
        set_humidity_sensor => Humidity,
        set_wind_speed_sensor => WindSpeed,
        set_wind_gust_sensor => WindGust,
        set_wind_direction_sensor => WindDirection,
        set_rain_sensor => Rain,
        set_battery_sensor => Battery,
    }

    /// 已挂接的发布器数量
    pub fn publisher_count(&self) -> usize {
        self.sensors.iter().flatten().count()
    }

    /// 设置要接收的站点编号，附近其他 Bresser 站点的数据帧会被忽略
    pub fn set_sensor_id(&mut self, sensor_id: u8) {
        self.sensor_id = Some(sensor_id);
    }

    pub fn sensor_id(&self) -> Option<u8> {
        self.sensor_id
    }

    /// 收到一帧解码数据，新数据覆盖尚未发布的旧数据
    ///
    /// # 返回
    /// 数据帧被接收时返回 `true`，来自其他站点时返回 `false`
    pub fn receive(&mut self, data: WeatherData) -> bool {
        if self.sensor_id.is_some_and(|id| id != data.sensor_id) {
            log::info!("[{}] 忽略站点 {} 的数据", self.id, data.sensor_id);
            return false;
        }
        if let Some(dropped) = self.pending.replace(data) {
            log::debug!("[{}] 丢弃未发布的数据: {dropped}", self.id);
        }
        true
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<P, S: Publisher> Bresser5in1<P, S> {
    /// 把一帧数据写入所有已配置的发布器，未配置的测量直接跳过
    ///
    /// # 返回
    /// 实际发布的测量数量
    pub fn publish(&mut self, data: &WeatherData) -> usize {
        log::info!("[{}] {data}", self.id);
        let mut published = 0;
        for (kind, slot) in MeasurementKind::ALL.into_iter().zip(self.sensors.iter_mut()) {
            if let Some(sensor) = slot {
                sensor.publish_state(data.value(kind));
                published += 1;
            }
        }
        published
    }
}

impl<P: OutputPin, S: Publisher> Component for Bresser5in1<P, S> {
    fn setup(&mut self) {
        for field in PinField::ALL {
            if self.pin(field).is_none() {
                log::error!("[{}] 缺少引脚 {field}", self.id);
            }
        }

        // 片选空闲时保持高电平
        if let Some(cs) = self.pins[PinField::ChipSelect as usize].as_mut() {
            if let Err(e) = cs.set_high() {
                log::error!("[{}] 设置片选引脚失败: {e:?}", self.id);
            }
        }

        log::info!(
            "[{}] 初始化完成，已挂接 {} 个发布器，等待数据...",
            self.id,
            self.publisher_count()
        );
    }

    fn poll(&mut self) {
        if let Some(data) = self.pending.take() {
            self.publish(&data);
        }
    }

    fn teardown(&mut self) {
        self.pending = None;
    }
}
