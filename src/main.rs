mod astronomy;
mod carousel;
mod clock;
mod config;
mod framebuffer;
mod layout;
mod network;
mod platform;
mod power;
mod refresh;
mod render;
mod screen;
mod station;
mod system;
mod time_sync;
mod touch;
mod views;
mod weather;
mod weather_icons;

use anyhow::Result;
use log::{info, warn};
use std::path::PathBuf;

use crate::config::{Settings, PROPERTIES_FILE};
use crate::station::Station;

fn main() -> Result<()> {
    platform::init_logging();
    info!("BOOT: wx_station v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Storage + properties ──
    let mut settings = Settings::default();
    let data_dir = match platform::mount_storage() {
        Ok(dir) => dir,
        Err(e) => {
            warn!("Storage unavailable, using defaults: {:#}", e);
            PathBuf::from(platform::DATA_DIR)
        }
    };
    if let Err(e) = settings.load_properties(&data_dir.join(PROPERTIES_FILE)) {
        warn!("Properties not loaded, using defaults: {:#}", e);
    }

    // ── 2. Hardware ──
    let hardware = platform::hardware(&settings, &data_dir)?;

    // ── 3. Boot + main loop ──
    let mut station = Station::new(settings, hardware);
    station.run();
    Ok(())
}
