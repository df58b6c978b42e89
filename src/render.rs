use embedded_graphics::{
    mono_font::MonoTextStyle,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle},
    text::Alignment,
};
use log::warn;
use profont::PROFONT_12_POINT;

use crate::carousel::Carousel;
use crate::framebuffer::{Framebuffer, Panel};
use crate::layout::*;
use crate::screen::Screen;
use crate::touch::TouchPoint;
use crate::views::{self, about, ViewContext};

/// Owns the framebuffer and the panel; the only place frames get committed.
pub struct Renderer {
    fb: Framebuffer,
    panel: Box<dyn Panel>,
    commits: u32,
}

impl Renderer {
    pub fn new(panel: Box<dyn Panel>) -> Self {
        Self {
            fb: Framebuffer::new(SCREEN_W as u32, SCREEN_H as u32),
            panel,
            commits: 0,
        }
    }

    #[cfg(test)]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn commits(&self) -> u32 {
        self.commits
    }

    /// Push the back buffer. Panel errors are logged; the next commit
    /// resends whatever did not arrive.
    pub fn commit(&mut self) {
        self.commits += 1;
        if let Err(e) = self.fb.commit(self.panel.as_mut()) {
            warn!("Panel commit failed: {:#}", e);
        }
    }

    pub fn clear(&mut self) {
        self.fb.clear_color(BG);
        self.commit();
    }

    /// One loop iteration's frame. Returns the carousel budget left.
    pub fn frame(
        &mut self,
        screen: Screen,
        ctx: &ViewContext<'_>,
        carousel: &mut Carousel,
        now_ms: u64,
    ) -> u64 {
        self.fb.clear_color(BG);
        let remaining = views::draw_screen(&mut self.fb, screen, ctx, carousel, now_ms);
        self.commit();
        remaining
    }

    /// Full-screen progress: banner, status text and a bar at `pct` percent.
    pub fn progress(&mut self, pct: u8, text: &str) {
        let pct = i32::from(pct.min(100));
        self.fb.clear_color(BG);
        about::draw_banner(&mut self.fb);

        let style = MonoTextStyle::new(&PROFONT_12_POINT, TEXT_ACCENT);
        draw_text(&mut self.fb, text, SCREEN_W / 2, 146, style, Alignment::Center);

        Rectangle::new(Point::new(10, 168), Size::new((SCREEN_W - 20) as u32, 15))
            .into_styled(PrimitiveStyle::with_stroke(Palette::White, 1))
            .draw(&mut self.fb)
            .ok();
        let fill_w = (SCREEN_W - 24) * pct / 100;
        if fill_w > 0 {
            Rectangle::new(Point::new(12, 170), Size::new(fill_w as u32, 11))
                .into_styled(PrimitiveStyle::with_fill(Palette::Blue))
                .draw(&mut self.fb)
                .ok();
        }
        self.commit();
    }

    /// Calibration prompt with a dot on the target to press.
    pub fn calibration_target(&mut self, target: TouchPoint) {
        self.fb.clear_color(BG);
        let style = MonoTextStyle::new(&PROFONT_12_POINT, TEXT_ACCENT);
        for (i, line) in ["Please calibrate", "touch screen by", "touch point"].iter().enumerate() {
            draw_text(&mut self.fb, line, SCREEN_W / 2, 140 + 16 * i as i32, style, Alignment::Center);
        }
        Circle::with_center(Point::new(target.x, target.y), 20)
            .into_styled(PrimitiveStyle::with_fill(Palette::White))
            .draw(&mut self.fb)
            .ok();
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use embedded_graphics::pixelcolor::Rgb565;

    struct NullPanel;

    impl Panel for NullPanel {
        fn write_rows(&mut self, _y: u32, _rows: u32, _pixels: &[Rgb565]) -> Result<()> {
            Ok(())
        }
    }

    fn bar_fill_end(fb: &Framebuffer) -> Option<u32> {
        (12..SCREEN_W as u32).rev().find(|&x| fb.committed_pixel(x, 175) == Palette::Blue)
    }

    #[test]
    fn progress_bar_width_tracks_percentage() {
        let mut r = Renderer::new(Box::new(NullPanel));
        r.progress(0, "Connecting");
        assert_eq!(bar_fill_end(r.framebuffer()), None);
        r.progress(50, "Connecting");
        assert_eq!(bar_fill_end(r.framebuffer()), Some(12 + 108 - 1));
        r.progress(100, "Done");
        assert_eq!(bar_fill_end(r.framebuffer()), Some(12 + 216 - 1));
        assert_eq!(r.commits(), 3);
    }

    #[test]
    fn over_hundred_is_clamped() {
        let mut r = Renderer::new(Box::new(NullPanel));
        r.progress(250, "x");
        assert_eq!(bar_fill_end(r.framebuffer()), Some(12 + 216 - 1));
    }

    #[test]
    fn calibration_target_marks_the_point() {
        let mut r = Renderer::new(Box::new(NullPanel));
        r.calibration_target(TouchPoint { x: 20, y: 20 });
        assert_eq!(r.framebuffer().committed_pixel(20, 20), Palette::White);
    }
}
