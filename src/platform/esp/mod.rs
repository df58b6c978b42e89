//! ESP32 build: SPI TFT, optional XPT2046 touch, SPIFFS, SNTP and deep sleep.

mod display;
mod http;
mod storage;
mod system;
mod time;
#[cfg(feature = "touch")]
mod touch;
mod wifi;

use anyhow::Result;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use log::info;
use std::path::{Path, PathBuf};

use crate::astronomy::Astronomy;
use crate::clock::SystemClock;
use crate::config::Settings;
use crate::power::PowerControl;
use crate::station::Hardware;
use crate::weather::OwmClient;

pub use storage::DATA_DIR;

pub fn init_logging() {
    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
}

pub fn mount_storage() -> Result<PathBuf> {
    storage::mount()?;
    Ok(PathBuf::from(DATA_DIR))
}

/// Deep sleep with no wakeup source configured: only reset brings it back.
fn deep_sleep() {
    info!("esp_deep_sleep_start");
    unsafe { esp_idf_sys::esp_deep_sleep_start() }
}

pub fn hardware(settings: &Settings, data_dir: &Path) -> Result<Hardware> {
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let pins = peripherals.pins;

    let bus = display::spi_bus(peripherals.spi2, pins.gpio18, pins.gpio23, pins.gpio19)?;
    let panel = display::init(bus.clone(), pins.gpio5, pins.gpio2, pins.gpio15)?;

    #[cfg(feature = "touch")]
    let touch = Some(crate::station::TouchHardware {
        input: Box::new(touch::Xpt2046::new(bus, pins.gpio14, pins.gpio27)?),
        store: Box::new(crate::touch::FileCalibrationStore::new(
            data_dir.join(crate::touch::CALIBRATION_FILE),
        )),
    });
    #[cfg(not(feature = "touch"))]
    let touch = {
        let _ = (bus, data_dir);
        None
    };

    Ok(Hardware {
        clock: Box::new(SystemClock::new()),
        network: Box::new(wifi::EspNetwork::new(peripherals.modem, sysloop)?),
        time: Box::new(time::SntpTime::default()),
        weather: Box::new(OwmClient::new(
            http::EspHttp,
            settings.is_metric,
            &settings.owm_language,
        )),
        moon: Box::new(Astronomy),
        panel,
        touch,
        system: Box::new(system::EspSystemInfo),
        power: PowerControl::Supported(deep_sleep),
    })
}
