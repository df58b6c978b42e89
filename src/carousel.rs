use log::debug;

use crate::framebuffer::Framebuffer;
use crate::layout::items_per_frame;
use crate::views::{home, ViewContext};

#[cfg(test)]
pub const FRAME_COUNT: usize = 3;
/// Time each forecast frame stays on screen.
pub const FRAME_DURATION_MS: u64 = 5_000;

/// Forecast frames of the Home screen, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarouselFrame {
    #[default]
    First,
    Second,
    Third,
}

impl CarouselFrame {
    pub fn next(self) -> CarouselFrame {
        match self {
            CarouselFrame::First => CarouselFrame::Second,
            CarouselFrame::Second => CarouselFrame::Third,
            CarouselFrame::Third => CarouselFrame::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            CarouselFrame::First => 0,
            CarouselFrame::Second => 1,
            CarouselFrame::Third => 2,
        }
    }
}

/// Time-sliced forecast columns inside the Home screen.
pub struct Carousel {
    frame: CarouselFrame,
    frame_started_ms: u64,
    frame_duration_ms: u64,
    items: usize,
}

impl Carousel {
    pub fn new(now_ms: u64, screen_w: i32) -> Self {
        Self {
            frame: CarouselFrame::First,
            frame_started_ms: now_ms,
            frame_duration_ms: FRAME_DURATION_MS,
            items: items_per_frame(screen_w),
        }
    }

    #[cfg(test)]
    pub fn frame(&self) -> CarouselFrame {
        self.frame
    }

    #[cfg(test)]
    pub fn items(&self) -> usize {
        self.items
    }

    /// Restart the current frame's budget from `now_ms`.
    pub fn restart(&mut self, now_ms: u64) {
        self.frame_started_ms = now_ms;
    }

    /// Forecast index shown in slot 0 of the current frame.
    pub fn first_entry(&self) -> usize {
        self.frame.index() * self.items
    }

    /// Advance at most one frame. The new frame's budget starts at `now_ms`,
    /// so a long stall never skips frames.
    fn advance_if_due(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.frame_started_ms) < self.frame_duration_ms {
            return false;
        }
        self.frame = self.frame.next();
        self.frame_started_ms = now_ms;
        debug!("carousel: frame {} from entry {}", self.frame.index(), self.first_entry());
        true
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.frame_duration_ms
            .saturating_sub(now_ms.saturating_sub(self.frame_started_ms))
    }

    /// Step the carousel, draw the current frame, and return the time left
    /// until the next frame switch.
    pub fn update(&mut self, now_ms: u64, fb: &mut Framebuffer, ctx: &ViewContext<'_>) -> u64 {
        self.advance_if_due(now_ms);
        let items = self.items;
        match self.frame {
            CarouselFrame::First => home::draw_forecast_columns(fb, ctx, 0, items),
            CarouselFrame::Second => home::draw_forecast_columns(fb, ctx, items, items),
            CarouselFrame::Third => home::draw_forecast_columns(fb, ctx, 2 * items, items),
        }
        self.remaining_ms(now_ms)
    }
}
