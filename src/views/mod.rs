pub mod about;
pub mod detail;
pub mod forecast_table;
pub mod home;

use crate::carousel::Carousel;
use crate::config::Settings;
use crate::framebuffer::Framebuffer;
use crate::screen::Screen;
use crate::time_sync::TimeSource;
use crate::weather::WeatherSnapshot;

/// Chip and network facts, gathered only while the About screen shows.
#[derive(Debug, Clone, Default)]
pub struct AboutInfo {
    pub free_heap_bytes: u32,
    pub cpu_freq_mhz: u32,
    pub uptime_ms: u64,
    pub ip_address: Option<String>,
    pub reset_reason: String,
}

/// Everything a view reads. Views never mutate station state.
pub struct ViewContext<'a> {
    pub snapshot: &'a WeatherSnapshot,
    pub settings: &'a Settings,
    pub time: &'a dyn TimeSource,
    pub now_epoch: i64,
    pub rssi_dbm: i32,
    pub about: Option<AboutInfo>,
}

/// Draw the body of `screen` into the back buffer.
///
/// Returns the carousel's remaining frame time on Home, 0 elsewhere.
pub fn draw_screen(
    fb: &mut Framebuffer,
    screen: Screen,
    ctx: &ViewContext<'_>,
    carousel: &mut Carousel,
    now_ms: u64,
) -> u64 {
    match screen {
        Screen::Home => {
            home::draw_time(fb, ctx);
            home::draw_wifi_quality(fb, ctx);
            let remaining = carousel.update(now_ms, fb, ctx);
            home::draw_current_weather(fb, ctx);
            home::draw_astronomy(fb, ctx);
            remaining
        }
        Screen::CurrentDetail => {
            detail::draw(fb, ctx);
            0
        }
        Screen::ForecastTableFirst => {
            forecast_table::draw(fb, ctx, 0);
            0
        }
        Screen::ForecastTableSecond => {
            forecast_table::draw(fb, ctx, 4);
            0
        }
        Screen::About => {
            about::draw(fb, ctx);
            0
        }
    }
}
