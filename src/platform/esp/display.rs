use anyhow::{anyhow, Result};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{Gpio15, Gpio18, Gpio19, Gpio2, Gpio23, Gpio5, Output, PinDriver};
use esp_idf_hal::spi::{config::Config, SpiDeviceDriver, SpiDriver, SpiDriverConfig, SPI2};
use esp_idf_hal::units::FromValueType;
use log::info;
use mipidsi::interface::{Interface, InterfacePixelFormat, SpiInterface};
use mipidsi::models::Model;
use mipidsi::Builder;
use std::sync::Arc;

use crate::framebuffer::Panel;
use crate::layout::{SCREEN_H, SCREEN_W};

const PANEL_SPI_MHZ: u32 = 40;
/// Bytes mipidsi batches per SPI transaction.
const SPI_BUFFER_LEN: usize = 512;

pub type SharedBus = Arc<SpiDriver<'static>>;

/// VSPI bus shared by the panel and the touch controller.
pub fn spi_bus(spi: SPI2, sclk: Gpio18, mosi: Gpio23, miso: Gpio19) -> Result<SharedBus> {
    let driver = SpiDriver::new(spi, sclk, mosi, Some(miso), &SpiDriverConfig::new())?;
    Ok(Arc::new(driver))
}

/// Panel driver plus the backlight pin, which must stay driven high.
struct DisplayPanel<DI, M, RST>
where
    DI: Interface,
    M: Model,
    RST: OutputPin,
{
    display: mipidsi::Display<DI, M, RST>,
    _backlight: PinDriver<'static, Gpio15, Output>,
}

impl<DI, M, RST> Panel for DisplayPanel<DI, M, RST>
where
    DI: Interface,
    M: Model<ColorFormat = Rgb565>,
    Rgb565: InterfacePixelFormat<DI::Word>,
    RST: OutputPin,
{
    fn write_rows(&mut self, y: u32, rows: u32, pixels: &[Rgb565]) -> Result<()> {
        if rows == 0 {
            return Ok(());
        }
        let x_end = (SCREEN_W - 1) as u16;
        let y_end = (y + rows - 1) as u16;
        self.display
            .set_pixels(0, y as u16, x_end, y_end, pixels.iter().copied())
            .map_err(|e| anyhow!("display write failed: {:?}", e))
    }
}

pub fn init(bus: SharedBus, cs: Gpio5, dc: Gpio2, backlight: Gpio15) -> Result<Box<dyn Panel>> {
    let spi_config = Config::new().baudrate(PANEL_SPI_MHZ.MHz().into());
    let spi = SpiDeviceDriver::new(bus, Some(cs), &spi_config)?;
    let dc = PinDriver::output(dc)?;
    let buffer: &'static mut [u8] = Box::leak(vec![0u8; SPI_BUFFER_LEN].into_boxed_slice());
    let di = SpiInterface::new(spi, dc, buffer);

    #[cfg(feature = "display-st7789")]
    let builder = Builder::new(mipidsi::models::ST7789, di)
        .invert_colors(mipidsi::options::ColorInversion::Inverted);
    #[cfg(not(feature = "display-st7789"))]
    let builder = Builder::new(mipidsi::models::ILI9341Rgb565, di)
        .color_order(mipidsi::options::ColorOrder::Bgr);

    let display = builder
        .display_size(SCREEN_W as u16, SCREEN_H as u16)
        .init(&mut FreeRtos)
        .map_err(|e| anyhow!("Display init failed: {:?}", e))?;

    let mut backlight = PinDriver::output(backlight)?;
    backlight.set_high()?;
    info!("Display ready ({}x{})", SCREEN_W, SCREEN_H);

    Ok(Box::new(DisplayPanel {
        display,
        _backlight: backlight,
    }))
}
