use embedded_graphics::{
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle},
};

use crate::framebuffer::Framebuffer;
use crate::layout::Palette;

/// Weather icons keyed by the OpenWeatherMap icon code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeatherIcon {
    Clear,
    FewClouds,
    ScatteredClouds,
    BrokenClouds,
    ShowerRain,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSize {
    /// 50x50, current conditions and the table screens.
    Large,
    /// 50x40, forecast columns.
    Mini,
}

impl IconSize {
    fn scale(self) -> i32 {
        match self {
            IconSize::Large => 5,
            IconSize::Mini => 4,
        }
    }
}

impl WeatherIcon {
    /// Map an OWM icon code such as `"10d"`. Day and night share a glyph.
    pub fn from_owm_code(code: &str) -> WeatherIcon {
        match code.get(..2) {
            Some("01") => Self::Clear,
            Some("02") => Self::FewClouds,
            Some("03") => Self::ScatteredClouds,
            Some("04") => Self::BrokenClouds,
            Some("09") => Self::ShowerRain,
            Some("10") => Self::Rain,
            Some("11") => Self::Thunderstorm,
            Some("13") => Self::Snow,
            Some("50") => Self::Mist,
            _ => Self::Unknown,
        }
    }

    /// Draw the icon with its top-left corner at (x, y).
    pub fn draw(self, fb: &mut Framebuffer, x: i32, y: i32, size: IconSize) {
        let s = size.scale();
        let origin = Point::new(x, y);
        match self {
            Self::Clear => sun(fb, origin, s, 0),
            Self::FewClouds => {
                sun(fb, origin, s, -2 * s);
                cloud(fb, origin + Point::new(2 * s, 3 * s), s, Palette::White);
            }
            Self::ScatteredClouds => cloud(fb, origin + Point::new(0, s), s, Palette::White),
            Self::BrokenClouds => {
                cloud(fb, origin + Point::new(2 * s, 0), s, Palette::Blue);
                cloud(fb, origin + Point::new(0, 2 * s), s, Palette::White);
            }
            Self::ShowerRain => {
                cloud(fb, origin, s, Palette::White);
                drops(fb, origin + Point::new(s, 6 * s), s, 3);
            }
            Self::Rain => {
                sun(fb, origin, s, -2 * s);
                cloud(fb, origin + Point::new(s, s), s, Palette::White);
                drops(fb, origin + Point::new(2 * s, 7 * s), s, 2);
            }
            Self::Thunderstorm => {
                cloud(fb, origin, s, Palette::Blue);
                bolt(fb, origin + Point::new(4 * s, 5 * s), s);
            }
            Self::Snow => {
                cloud(fb, origin, s, Palette::White);
                flakes(fb, origin + Point::new(s, 7 * s), s);
            }
            Self::Mist => mist(fb, origin + Point::new(0, 2 * s), s),
            Self::Unknown => {
                Rectangle::new(origin, Size::new((10 * s) as u32, (8 * s) as u32))
                    .into_styled(PrimitiveStyle::with_stroke(Palette::Blue, 1))
                    .draw(fb)
                    .ok();
            }
        }
    }
}

// ── Glyph parts (unit = s pixels, icon is 10s x 10s) ────────────────

fn sun(fb: &mut Framebuffer, origin: Point, s: i32, dx: i32) {
    let center = origin + Point::new(5 * s + dx, 4 * s);
    Circle::with_center(center, (4 * s) as u32)
        .into_styled(PrimitiveStyle::with_fill(Palette::Yellow))
        .draw(fb)
        .ok();
}

fn cloud(fb: &mut Framebuffer, origin: Point, s: i32, color: Palette) {
    let fill = PrimitiveStyle::with_fill(color);
    Circle::new(origin + Point::new(s, 2 * s), (3 * s) as u32)
        .into_styled(fill)
        .draw(fb)
        .ok();
    Circle::new(origin + Point::new(3 * s, s), (4 * s) as u32)
        .into_styled(fill)
        .draw(fb)
        .ok();
    Rectangle::new(origin + Point::new(2 * s, 3 * s), Size::new((5 * s) as u32, (2 * s) as u32))
        .into_styled(fill)
        .draw(fb)
        .ok();
}

fn drops(fb: &mut Framebuffer, origin: Point, s: i32, count: i32) {
    let style = PrimitiveStyle::with_stroke(Palette::Blue, 2);
    for i in 0..count {
        let top = origin + Point::new(i * 2 * s + s, 0);
        Line::new(top, top + Point::new(-s / 2, 2 * s))
            .into_styled(style)
            .draw(fb)
            .ok();
    }
}

fn bolt(fb: &mut Framebuffer, origin: Point, s: i32) {
    Triangle::new(origin, origin + Point::new(-2 * s, 3 * s), origin + Point::new(0, 3 * s))
        .into_styled(PrimitiveStyle::with_fill(Palette::Yellow))
        .draw(fb)
        .ok();
    Triangle::new(
        origin + Point::new(0, 2 * s),
        origin + Point::new(s, 2 * s),
        origin + Point::new(-s, 5 * s),
    )
    .into_styled(PrimitiveStyle::with_fill(Palette::Yellow))
    .draw(fb)
    .ok();
}

fn flakes(fb: &mut Framebuffer, origin: Point, s: i32) {
    for i in 0..3 {
        Circle::new(origin + Point::new(i * 2 * s + s, (i % 2) * s), s as u32)
            .into_styled(PrimitiveStyle::with_fill(Palette::White))
            .draw(fb)
            .ok();
    }
}

fn mist(fb: &mut Framebuffer, origin: Point, s: i32) {
    let style = PrimitiveStyle::with_stroke(Palette::Blue, 2);
    for i in 0..4 {
        let y = i * 2 * s;
        let indent = if i % 2 == 0 { 0 } else { s };
        Line::new(origin + Point::new(indent, y), origin + Point::new(9 * s - indent, y))
            .into_styled(style)
            .draw(fb)
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_and_night_codes_share_an_icon() {
        assert_eq!(WeatherIcon::from_owm_code("10d"), WeatherIcon::Rain);
        assert_eq!(WeatherIcon::from_owm_code("10n"), WeatherIcon::Rain);
        assert_eq!(WeatherIcon::from_owm_code("01n"), WeatherIcon::Clear);
        assert_eq!(WeatherIcon::from_owm_code("50d"), WeatherIcon::Mist);
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(WeatherIcon::from_owm_code(""), WeatherIcon::Unknown);
        assert_eq!(WeatherIcon::from_owm_code("7"), WeatherIcon::Unknown);
        assert_eq!(WeatherIcon::from_owm_code("99d"), WeatherIcon::Unknown);
    }

    #[test]
    fn clear_icon_paints_yellow_inside_its_box() {
        let mut fb = Framebuffer::new(60, 60);
        WeatherIcon::Clear.draw(&mut fb, 5, 5, IconSize::Large);
        assert_eq!(fb.pixel(5 + 25, 5 + 20), Palette::Yellow);
        assert_eq!(fb.pixel(59, 59), Palette::Black);
    }
}
