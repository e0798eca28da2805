//! 构建期的引脚句柄
//!
//! 在主机上运行校验时没有真实的 GPIO，用它记录引脚编号、反相设置和输出电平。

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::config::PinReference;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioPin {
    number: u8,
    inverted: bool,
    /// 引脚上的物理电平
    level_high: bool,
}

impl GpioPin {
    pub fn new(pin: PinReference) -> Self {
        Self {
            number: pin.number,
            inverted: pin.inverted,
            level_high: false,
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn is_level_high(&self) -> bool {
        self.level_high
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level_high = self.inverted;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level_high = !self.inverted;
        Ok(())
    }
}
