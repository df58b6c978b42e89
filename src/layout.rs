use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::{raw::RawU2, Rgb565},
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use profont::{PROFONT_12_POINT, PROFONT_14_POINT};

use crate::framebuffer::Framebuffer;

// ── Palette ─────────────────────────────────────────────────────────

/// The four colors the 2-bit framebuffer can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    Black,
    White,
    Yellow,
    Blue,
}

impl PixelColor for Palette {
    type Raw = RawU2;
}

impl Palette {
    pub const fn index(self) -> u8 {
        match self {
            Palette::Black => 0,
            Palette::White => 1,
            Palette::Yellow => 2,
            Palette::Blue => 3,
        }
    }

    /// Decode the low two bits.
    pub const fn from_index(bits: u8) -> Palette {
        match bits & 0b11 {
            0 => Palette::Black,
            1 => Palette::White,
            2 => Palette::Yellow,
            _ => Palette::Blue,
        }
    }

    pub fn to_rgb565(self) -> Rgb565 {
        match self {
            Palette::Black => Rgb565::BLACK,
            Palette::White => Rgb565::WHITE,
            Palette::Yellow => Rgb565::YELLOW,
            Palette::Blue => BLUE_565,
        }
    }
}

/// 0x7E3C, the light blue used for secondary text.
const BLUE_565: Rgb565 = Rgb565::new(0x0F, 0x31, 0x1C);

pub const TEXT_PRIMARY: Palette = Palette::White;
pub const TEXT_ACCENT: Palette = Palette::Yellow;
pub const TEXT_SECONDARY: Palette = Palette::Blue;
pub const BG: Palette = Palette::Black;

// ── Geometry ────────────────────────────────────────────────────────

/// Both supported panels are driven as 240x320 portrait.
pub const SCREEN_W: i32 = 240;
pub const SCREEN_H: i32 = 320;

/// Presses above this line toggle the clock style instead of paging.
pub const TOUCH_HEADER_H: i32 = 80;

pub const CLOCK_DATE_Y: i32 = 6;
pub const CLOCK_TIME_Y: i32 = 20;
pub const CURRENT_WEATHER_Y: i32 = 55;
pub const FORECAST_Y: i32 = 165;
pub const ASTRONOMY_Y: i32 = 250;
pub const DETAIL_ROW_Y: i32 = 30;
pub const DETAIL_ROW_H: i32 = 15;
pub const TABLE_ROW_Y: i32 = 45;
pub const TABLE_ROW_H: i32 = 75;

/// Forecast entries per carousel frame.
pub fn items_per_frame(screen_w: i32) -> usize {
    if screen_w > 300 {
        4
    } else {
        3
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

pub fn draw_hline(fb: &mut Framebuffer, y: i32, color: Palette) {
    Rectangle::new(Point::new(0, y), Size::new(fb.size().width, 1))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(fb)
        .ok();
}

/// Text with its top edge at `y`; `x` is the left, center or right edge
/// depending on `alignment`.
pub fn draw_text(
    fb: &mut Framebuffer,
    text: &str,
    x: i32,
    y: i32,
    style: MonoTextStyle<'_, Palette>,
    alignment: Alignment,
) {
    let text_style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(text, Point::new(x, y), style, text_style)
        .draw(fb)
        .ok();
}

/// One `label` / `value` row: label on the left margin, value from mid-screen.
pub fn draw_label_value(fb: &mut Framebuffer, line: i32, label: &str, value: &str) {
    let y = DETAIL_ROW_Y + line * DETAIL_ROW_H;
    let label_style = MonoTextStyle::new(&PROFONT_12_POINT, TEXT_ACCENT);
    let value_style = MonoTextStyle::new(&PROFONT_12_POINT, TEXT_PRIMARY);
    draw_text(fb, label, 15, y, label_style, Alignment::Left);
    draw_text(fb, value, SCREEN_W / 2, y, value_style, Alignment::Left);
}

/// Screen title centered at the top.
pub fn draw_title(fb: &mut Framebuffer, title: &str) {
    let style = MonoTextStyle::new(&PROFONT_14_POINT, TEXT_PRIMARY);
    draw_text(fb, title, SCREEN_W / 2, 2, style, Alignment::Center);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_index_round_trips() {
        for color in [Palette::Black, Palette::White, Palette::Yellow, Palette::Blue] {
            assert_eq!(Palette::from_index(color.index()), color);
        }
        assert_eq!(Palette::from_index(0b1101), Palette::White);
    }

    #[test]
    fn wide_panels_show_four_items_per_frame() {
        assert_eq!(items_per_frame(240), 3);
        assert_eq!(items_per_frame(300), 3);
        assert_eq!(items_per_frame(320), 4);
    }

    #[test]
    fn carousel_never_reads_past_forecast_capacity() {
        for w in [240, 320, 480] {
            assert!(items_per_frame(w) * crate::carousel::FRAME_COUNT <= crate::weather::MAX_FORECASTS);
        }
    }
}
