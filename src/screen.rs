use log::{debug, info};

use crate::clock::IntervalTimer;
use crate::layout::TOUCH_HEADER_H;
use crate::touch::TouchPoint;

/// Screens in rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    CurrentDetail,
    ForecastTableFirst,
    ForecastTableSecond,
    About,
}

impl Screen {
    pub const COUNT: usize = 5;

    pub fn next(self) -> Screen {
        match self {
            Screen::Home => Screen::CurrentDetail,
            Screen::CurrentDetail => Screen::ForecastTableFirst,
            Screen::ForecastTableFirst => Screen::ForecastTableSecond,
            Screen::ForecastTableSecond => Screen::About,
            Screen::About => Screen::Home,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Screen::Home => 0,
            Screen::CurrentDetail => 1,
            Screen::ForecastTableFirst => 2,
            Screen::ForecastTableSecond => 3,
            Screen::About => 4,
        }
    }
}

/// What a touch press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    ToggledClockStyle,
    Advanced(Screen),
}

/// Active screen plus the automatic rotation timer.
pub struct ScreenState {
    current: Screen,
    rotation: IntervalTimer,
}

impl ScreenState {
    pub fn new(rotation_secs: u32, now_ms: u64) -> Self {
        Self {
            current: Screen::Home,
            rotation: IntervalTimer::from_secs(rotation_secs, now_ms),
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    /// Restart the rotation interval, used once boot has finished.
    pub fn restart_rotation(&mut self, now_ms: u64) {
        self.rotation.reset(now_ms);
    }

    /// A new press in the header band toggles the 12h flag; anywhere else
    /// pages forward. Neither resets the rotation timer.
    pub fn handle_touch(&mut self, point: TouchPoint, is_12h: &mut bool) -> TouchAction {
        if point.y < TOUCH_HEADER_H {
            *is_12h = !*is_12h;
            info!("Clock style: {}", if *is_12h { "12h" } else { "24h" });
            TouchAction::ToggledClockStyle
        } else {
            self.current = self.current.next();
            info!("Touch: screen -> {:?}", self.current);
            TouchAction::Advanced(self.current)
        }
    }

    /// Automatic rotation. Returns true when the screen advanced.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if !self.rotation.is_due(now_ms) {
            return false;
        }
        self.current = self.current.next();
        self.rotation.reset(now_ms);
        debug!("Rotation: screen -> {:?} ({}/{})", self.current, self.current.index() + 1, Screen::COUNT);
        true
    }
}
