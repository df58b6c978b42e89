use embedded_graphics::{
    mono_font::MonoTextStyle,
    prelude::*,
    primitives::{Circle, PrimitiveStyle},
    text::Alignment,
};
use profont::{PROFONT_10_POINT, PROFONT_12_POINT, PROFONT_24_POINT, PROFONT_9_POINT};

use crate::framebuffer::Framebuffer;
use crate::layout::*;
use crate::network::{signal_bars, signal_quality, SIGNAL_BARS};
use crate::views::ViewContext;
use crate::weather_icons::IconSize;

const MOON_DIAMETER: u32 = 30;

pub fn draw_time(fb: &mut Framebuffer, ctx: &ViewContext<'_>) {
    let local = ctx.time.local(ctx.now_epoch);

    let date_style = MonoTextStyle::new(&PROFONT_12_POINT, TEXT_PRIMARY);
    draw_text(fb, &local.date_line(), SCREEN_W / 2, CLOCK_DATE_Y, date_style, Alignment::Center);

    let (clock, marker) = local.clock_text(ctx.settings.is_12h_style, ctx.settings.is_hhmm_style);
    let clock_style = MonoTextStyle::new(&PROFONT_24_POINT, TEXT_PRIMARY);
    draw_text(fb, &clock, SCREEN_W / 2, CLOCK_TIME_Y, clock_style, Alignment::Center);

    if let Some(marker) = marker {
        let marker_style = MonoTextStyle::new(&PROFONT_9_POINT, TEXT_SECONDARY);
        draw_text(fb, marker, 195, CLOCK_TIME_Y + 14, marker_style, Alignment::Left);
    }
}

/// Percentage plus a four-bar indicator in the top-right corner.
pub fn draw_wifi_quality(fb: &mut Framebuffer, ctx: &ViewContext<'_>) {
    let quality = signal_quality(ctx.rssi_dbm);
    let style = MonoTextStyle::new(&PROFONT_9_POINT, TEXT_PRIMARY);
    draw_text(fb, &format!("{}%", quality), SCREEN_W - 12, 9, style, Alignment::Right);

    // Bar i is 2*(i+1) px tall; unlit bars keep their baseline pixel.
    let lit_bars = signal_bars(quality);
    for i in 0..SIGNAL_BARS {
        let lit = i < lit_bars;
        let i = i32::from(i);
        for j in 0..2 * (i + 1) {
            if lit || j == 0 {
                Pixel(Point::new(SCREEN_W - 10 + 2 * i, 18 - j), TEXT_PRIMARY)
                    .draw(fb)
                    .ok();
            }
        }
    }
}

pub fn draw_current_weather(fb: &mut Framebuffer, ctx: &ViewContext<'_>) {
    let right = SCREEN_W - 20;

    let name_style = MonoTextStyle::new(&PROFONT_12_POINT, TEXT_SECONDARY);
    draw_text(fb, &ctx.settings.location_name, right, 65, name_style, Alignment::Right);

    let Some(current) = &ctx.snapshot.current else {
        let style = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_ACCENT);
        draw_text(fb, "No data yet", right, 90, style, Alignment::Right);
        return;
    };

    current.icon.draw(fb, 0, CURRENT_WEATHER_Y, IconSize::Large);

    let temp = format!("{:.1}{}", current.temp, ctx.settings.temperature_unit());
    let temp_style = MonoTextStyle::new(&PROFONT_24_POINT, TEXT_PRIMARY);
    draw_text(fb, &temp, right, 82, temp_style, Alignment::Right);

    let desc_style = MonoTextStyle::new(&PROFONT_12_POINT, TEXT_ACCENT);
    draw_text(fb, &current.description, right, 118, desc_style, Alignment::Right);
}

/// One carousel slot: weekday and hour, temperature, icon, rain.
fn draw_forecast_detail(fb: &mut Framebuffer, ctx: &ViewContext<'_>, x: i32, y: i32, index: usize) {
    let Some(entry) = ctx.snapshot.forecasts.get(index) else {
        return;
    };
    let local = ctx.time.local(entry.observation_time);
    let center = x + 25;

    let head_style = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_ACCENT);
    let head = format!("{} {}:00", local.weekday_short(), local.hour);
    draw_text(fb, &head, center, y - 15, head_style, Alignment::Center);

    let temp_style = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_PRIMARY);
    let temp = format!("{:.1}{}", entry.temp, ctx.settings.temperature_unit());
    draw_text(fb, &temp, center, y, temp_style, Alignment::Center);

    entry.icon.draw(fb, x + 5, y + 15, IconSize::Mini);

    let rain_style = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_SECONDARY);
    let rain = format!("{:.1}{}", entry.rain, ctx.settings.rain_unit());
    draw_text(fb, &rain, center, y + 60, rain_style, Alignment::Center);
}

/// `items` forecast columns starting at entry `first`.
pub fn draw_forecast_columns(fb: &mut Framebuffer, ctx: &ViewContext<'_>, first: usize, items: usize) {
    let shift_x = SCREEN_W / items.max(1) as i32;
    for i in 0..items {
        draw_forecast_detail(fb, ctx, 10 + shift_x * i as i32, FORECAST_Y, first + i);
    }
}

fn draw_moon(fb: &mut Framebuffer, ctx: &ViewContext<'_>) {
    let Some(moon) = ctx.snapshot.moon else {
        return;
    };
    let center = Point::new(SCREEN_W / 2, ASTRONOMY_Y + 18 + MOON_DIAMETER as i32 / 2);
    Circle::with_center(center, MOON_DIAMETER)
        .into_styled(PrimitiveStyle::with_fill(Palette::White))
        .draw(fb)
        .ok();
    // Shadow disc slides off the lit side as illumination grows.
    let offset = (moon.illumination * MOON_DIAMETER as f64).round() as i32;
    let dx = if moon.phase.is_waxing() { -offset } else { offset };
    Circle::with_center(center + Point::new(dx, 0), MOON_DIAMETER)
        .into_styled(PrimitiveStyle::with_fill(Palette::Black))
        .draw(fb)
        .ok();
    Circle::with_center(center, MOON_DIAMETER)
        .into_styled(PrimitiveStyle::with_stroke(Palette::Blue, 1))
        .draw(fb)
        .ok();
}

/// Sun times on the left, moon phase glyph in the middle, moon age on the right.
pub fn draw_astronomy(fb: &mut Framebuffer, ctx: &ViewContext<'_>) {
    let label = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_ACCENT);
    let value = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_PRIMARY);
    let (row1, row2) = (ASTRONOMY_Y + 26, ASTRONOMY_Y + 41);

    draw_moon(fb, ctx);
    if let Some(moon) = ctx.snapshot.moon {
        draw_text(fb, moon.phase.label(), SCREEN_W / 2, ASTRONOMY_Y, label, Alignment::Center);
    }

    draw_text(fb, "Sun", 5, ASTRONOMY_Y, label, Alignment::Left);
    let (rise, set) = match &ctx.snapshot.current {
        Some(c) => (ctx.time.local(c.sunrise).hhmm(), ctx.time.local(c.sunset).hhmm()),
        None => ("--:--".to_string(), "--:--".to_string()),
    };
    draw_text(fb, "Rise:", 5, row1, value, Alignment::Left);
    draw_text(fb, &rise, 45, row1, value, Alignment::Left);
    draw_text(fb, "Set:", 5, row2, value, Alignment::Left);
    draw_text(fb, &set, 45, row2, value, Alignment::Left);

    let right = SCREEN_W - 5;
    draw_text(fb, "Moon", right, ASTRONOMY_Y, label, Alignment::Right);
    draw_text(fb, "Age:", right - 40, row1, value, Alignment::Right);
    draw_text(fb, "Illum:", right - 40, row2, value, Alignment::Right);
    if let Some(moon) = ctx.snapshot.moon {
        let age = format!("{:.1}d", moon.approximate_age_days());
        let illum = format!("{:.0}%", moon.illumination * 100.0);
        draw_text(fb, &age, right, row1, value, Alignment::Right);
        draw_text(fb, &illum, right, row2, value, Alignment::Right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astronomy::{MoonData, MoonPhase};
    use crate::config::Settings;
    use crate::views::testing::UtcTime;
    use crate::weather::WeatherSnapshot;

    fn ctx<'a>(snapshot: &'a WeatherSnapshot, settings: &'a Settings, time: &'a UtcTime, rssi: i32) -> ViewContext<'a> {
        ViewContext {
            snapshot,
            settings,
            time,
            now_epoch: 0,
            rssi_dbm: rssi,
            about: None,
        }
    }

    fn bar_pixels(fb: &Framebuffer) -> usize {
        let mut n = 0;
        for x in (SCREEN_W - 10)..(SCREEN_W - 2) {
            for y in 10..=18 {
                if fb.pixel(x as u32, y as u32) != Palette::Black {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn signal_bars_grow_with_quality() {
        let snapshot = WeatherSnapshot::default();
        let settings = Settings::default();
        let time = UtcTime::new(0);

        let mut weak = Framebuffer::new(SCREEN_W as u32, SCREEN_H as u32);
        draw_wifi_quality(&mut weak, &ctx(&snapshot, &settings, &time, -100));
        let mut strong = Framebuffer::new(SCREEN_W as u32, SCREEN_H as u32);
        draw_wifi_quality(&mut strong, &ctx(&snapshot, &settings, &time, -40));

        // Baseline pixels only vs all bars (2 + 4 + 6 + 8).
        assert_eq!(bar_pixels(&weak), 4);
        assert_eq!(bar_pixels(&strong), 20);
    }

    #[test]
    fn drawn_bars_match_signal_bars() {
        let snapshot = WeatherSnapshot::default();
        let settings = Settings::default();
        let time = UtcTime::new(0);

        // -97 dBm: one lit bar (2 px) plus three baselines.
        let mut fb = Framebuffer::new(SCREEN_W as u32, SCREEN_H as u32);
        draw_wifi_quality(&mut fb, &ctx(&snapshot, &settings, &time, -97));
        assert_eq!(signal_bars(signal_quality(-97)), 1);
        assert_eq!(bar_pixels(&fb), 5);

        // -75 dBm is 50%: bars 0 and 1 lit (2 + 4) plus two baselines.
        let mut fb = Framebuffer::new(SCREEN_W as u32, SCREEN_H as u32);
        draw_wifi_quality(&mut fb, &ctx(&snapshot, &settings, &time, -75));
        assert_eq!(signal_bars(signal_quality(-75)), 2);
        assert_eq!(bar_pixels(&fb), 8);
    }

    #[test]
    fn full_moon_glyph_is_lit_in_the_middle() {
        let snapshot = WeatherSnapshot {
            moon: Some(MoonData { phase: MoonPhase::Full, illumination: 1.0 }),
            ..Default::default()
        };
        let settings = Settings::default();
        let time = UtcTime::new(0);
        let mut fb = Framebuffer::new(SCREEN_W as u32, SCREEN_H as u32);
        draw_moon(&mut fb, &ctx(&snapshot, &settings, &time, -60));
        let cy = ASTRONOMY_Y + 18 + MOON_DIAMETER as i32 / 2;
        assert_eq!(fb.pixel((SCREEN_W / 2) as u32, cy as u32), Palette::White);
    }

    #[test]
    fn new_moon_glyph_is_dark() {
        let snapshot = WeatherSnapshot {
            moon: Some(MoonData { phase: MoonPhase::New, illumination: 0.0 }),
            ..Default::default()
        };
        let settings = Settings::default();
        let time = UtcTime::new(0);
        let mut fb = Framebuffer::new(SCREEN_W as u32, SCREEN_H as u32);
        draw_moon(&mut fb, &ctx(&snapshot, &settings, &time, -60));
        let cy = ASTRONOMY_Y + 18 + MOON_DIAMETER as i32 / 2;
        assert_eq!(fb.pixel((SCREEN_W / 2) as u32, cy as u32), Palette::Black);
    }
}
