use embedded_graphics::{mono_font::MonoTextStyle, text::Alignment};
use profont::{PROFONT_10_POINT, PROFONT_12_POINT};

use crate::framebuffer::Framebuffer;
use crate::layout::*;
use crate::views::ViewContext;
use crate::weather::ForecastEntry;
use crate::weather_icons::IconSize;

/// Entries shown per table screen.
pub const ROWS: usize = 4;
/// Tallest row block below its anchor line.
const ROW_BODY_H: i32 = 45;

const COL1_LABEL_X: i32 = 50;
const COL1_VALUE_X: i32 = COL1_LABEL_X + 20;
const COL2_LABEL_X: i32 = SCREEN_W / 2 + 10;
const COL2_VALUE_X: i32 = COL2_LABEL_X + 40;

/// Forecast table of up to four entries beginning at `start`.
pub fn draw(fb: &mut Framebuffer, ctx: &ViewContext<'_>, start: usize) {
    draw_title(fb, "Forecasts");
    for row in 0..ROWS {
        let y = TABLE_ROW_Y + row as i32 * TABLE_ROW_H;
        if y + ROW_BODY_H > SCREEN_H {
            break;
        }
        let Some(entry) = ctx.snapshot.forecasts.get(start + row) else {
            break;
        };
        draw_row(fb, ctx, entry, y);
    }
}

fn draw_row(fb: &mut Framebuffer, ctx: &ViewContext<'_>, entry: &ForecastEntry, y: i32) {
    let settings = ctx.settings;
    let local = ctx.time.local(entry.observation_time);

    let head_style = MonoTextStyle::new(&PROFONT_12_POINT, TEXT_PRIMARY);
    let head = format!("{} {}:00", local.weekday_short(), local.hour);
    draw_text(fb, &head, SCREEN_W / 2, y - 15, head_style, Alignment::Center);

    let main_style = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_ACCENT);
    draw_text(fb, &entry.main, 0, y - 4, main_style, Alignment::Left);
    entry.icon.draw(fb, 0, y + 8, IconSize::Mini);

    let label = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_SECONDARY);
    let value = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_PRIMARY);
    let cells = [
        (COL1_LABEL_X, COL1_VALUE_X, 0, "T:", format!("{:.0}{}", entry.temp, settings.temperature_unit())),
        (COL1_LABEL_X, COL1_VALUE_X, 15, "H:", format!("{}%", entry.humidity)),
        (COL1_LABEL_X, COL1_VALUE_X, 30, "P:", format!("{:.2}{}", entry.rain, settings.rain_unit())),
        (COL2_LABEL_X, COL2_VALUE_X, 0, "Pr:", format!("{}hPa", entry.pressure_hpa)),
        (COL2_LABEL_X, COL2_VALUE_X, 15, "WSp:", format!("{:.0}{}", entry.wind_speed, settings.speed_unit())),
        (COL2_LABEL_X, COL2_VALUE_X, 30, "WDi:", format!("{:.0}°", entry.wind_deg)),
    ];
    for (label_x, value_x, dy, name, text) in cells.iter() {
        draw_text(fb, name, *label_x, y + dy, label, Alignment::Left);
        draw_text(fb, text, *value_x, y + dy, value, Alignment::Left);
    }
    draw_hline(fb, y + ROW_BODY_H + 2, Palette::Blue);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::views::testing::UtcTime;
    use crate::weather::WeatherSnapshot;

    fn snapshot(count: usize) -> WeatherSnapshot {
        let mut snapshot = WeatherSnapshot::default();
        for i in 0..count {
            snapshot
                .forecasts
                .push(ForecastEntry { observation_time: i as i64 * 43_200, ..Default::default() })
                .ok();
        }
        snapshot
    }

    fn separator_rows(fb: &Framebuffer) -> Vec<i32> {
        (0..SCREEN_H)
            .filter(|&y| (0..SCREEN_W).all(|x| fb.pixel(x as u32, y as u32) == Palette::Blue))
            .collect()
    }

    fn render(snapshot: &WeatherSnapshot, start: usize) -> Framebuffer {
        let settings = Settings::default();
        let time = UtcTime::new(0);
        let ctx = ViewContext {
            snapshot,
            settings: &settings,
            time: &time,
            now_epoch: 0,
            rssi_dbm: -60,
            about: None,
        };
        let mut fb = Framebuffer::new(SCREEN_W as u32, SCREEN_H as u32);
        draw(&mut fb, &ctx, start);
        fb
    }

    #[test]
    fn full_table_draws_four_rows() {
        let fb = render(&snapshot(12), 4);
        assert_eq!(separator_rows(&fb).len(), ROWS);
    }

    #[test]
    fn short_forecast_stops_early() {
        assert_eq!(separator_rows(&render(&snapshot(6), 4)).len(), 2);
        assert!(separator_rows(&render(&snapshot(3), 4)).is_empty());
    }
}
