//! 组件辅助宏
//!
//! 为组件生成按名称访问的引脚和发布器 setter

/// 生成引脚 setter
///
/// # 示例
/// ```ignore
/// pin_setters! {
///     set_cs_pin => ChipSelect,
/// }
/// ```
macro_rules! pin_setters {
    ($($setter:ident => $field:ident),* $(,)?) => {
        $(
            #[doc = concat!("设置 `", stringify!($field), "` 引脚")]
            pub fn $setter(&mut self, pin: P) {
                self.set_pin($crate::config::PinField::$field, pin);
            }
        )*
    };
}

/// 生成测量发布器 setter
///
/// # 示例
/// ```ignore
/// sensor_setters! {
///     set_temperature_sensor => Temperature,
/// }
/// ```
macro_rules! sensor_setters {
    ($($setter:ident => $kind:ident),* $(,)?) => {
        $(
            #[doc = concat!("设置 `", stringify!($kind), "` 发布器")]
            pub fn $setter(&mut self, sensor: S) {
                self.set_sensor($crate::data::MeasurementKind::$kind, sensor);
            }
        )*
    };
}
