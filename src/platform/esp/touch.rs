use anyhow::Result;
use esp_idf_hal::gpio::{Gpio14, Gpio27, Input, PinDriver, Pull};
use esp_idf_hal::spi::{config::Config, SpiDeviceDriver, SpiDriver};
use esp_idf_hal::units::FromValueType;
use log::{info, warn};
use std::sync::Arc;

use super::display::SharedBus;
use crate::touch::{RawTouch, TouchInput};

// ── XPT2046 commands (12-bit, differential) ─────────────────────────
const CMD_X: u8 = 0xD0;
const CMD_Y: u8 = 0x90;
const CMD_Z1: u8 = 0xB0;
const CMD_Z2: u8 = 0xC0;

const TOUCH_SPI_MHZ: u32 = 2;
/// Minimum pressure reading counted as a press.
const Z_THRESHOLD: i32 = 400;
const SAMPLES: i32 = 3;

/// Resistive touch controller sharing the panel's SPI bus. The IRQ line
/// goes low while the panel is pressed.
pub struct Xpt2046 {
    spi: SpiDeviceDriver<'static, Arc<SpiDriver<'static>>>,
    irq: PinDriver<'static, Gpio27, Input>,
}

impl Xpt2046 {
    pub fn new(bus: SharedBus, cs: Gpio14, irq: Gpio27) -> Result<Self> {
        let config = Config::new().baudrate(TOUCH_SPI_MHZ.MHz().into());
        let spi = SpiDeviceDriver::new(bus, Some(cs), &config)?;
        let mut irq = PinDriver::input(irq)?;
        irq.set_pull(Pull::Up)?;
        info!("XPT2046 touch ready");
        Ok(Self { spi, irq })
    }

    fn read12(&mut self, cmd: u8) -> Result<i32> {
        let tx = [cmd, 0, 0];
        let mut rx = [0u8; 3];
        self.spi.transfer(&mut rx, &tx)?;
        Ok(((i32::from(rx[1]) << 8) | i32::from(rx[2])) >> 3)
    }

    fn sample(&mut self) -> Result<Option<RawTouch>> {
        let z1 = self.read12(CMD_Z1)?;
        let z2 = self.read12(CMD_Z2)?;
        if z1 + 4095 - z2 < Z_THRESHOLD {
            return Ok(None);
        }
        let (mut x, mut y) = (0, 0);
        for _ in 0..SAMPLES {
            x += self.read12(CMD_X)?;
            y += self.read12(CMD_Y)?;
        }
        Ok(Some(RawTouch { x: x / SAMPLES, y: y / SAMPLES }))
    }
}

impl TouchInput for Xpt2046 {
    fn raw_point(&mut self) -> Option<RawTouch> {
        if self.irq.is_high() {
            return None;
        }
        match self.sample() {
            Ok(point) => point,
            Err(e) => {
                warn!("Touch read failed: {:#}", e);
                None
            }
        }
    }
}
