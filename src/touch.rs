use anyhow::{bail, Result};
use log::debug;
use serde::{Deserialize, Serialize};
#[cfg(any(test, feature = "touch"))]
use std::path::PathBuf;

#[cfg(any(test, feature = "touch"))]
pub const CALIBRATION_FILE: &str = "calibration.json";
/// Distance of the calibration targets from the screen corners.
const CALIBRATION_MARGIN: i32 = 20;

/// Controller coordinates, before calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTouch {
    pub x: i32,
    pub y: i32,
}

/// Screen coordinates in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: i32,
    pub y: i32,
}

/// A touch controller. `None` while nothing presses the panel.
pub trait TouchInput {
    fn raw_point(&mut self) -> Option<RawTouch>;
}

/// Persisted two-point calibration.
pub trait CalibrationStore {
    fn load(&mut self) -> Result<Option<Calibration>>;
    fn save(&mut self, calibration: &Calibration) -> Result<()>;
}

// ── Calibration ─────────────────────────────────────────────────────

/// Per-axis linear map from raw to screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub scale_x: f32,
    pub offset_x: f32,
    pub scale_y: f32,
    pub offset_y: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            offset_x: 0.0,
            scale_y: 1.0,
            offset_y: 0.0,
        }
    }
}

impl Calibration {
    /// Fit from two raw samples taken at two known screen targets.
    pub fn from_samples(
        targets: [TouchPoint; 2],
        samples: [RawTouch; 2],
    ) -> Result<Calibration> {
        let dx = samples[1].x - samples[0].x;
        let dy = samples[1].y - samples[0].y;
        if dx == 0 || dy == 0 {
            bail!("calibration samples do not span both axes ({:?})", samples);
        }
        let scale_x = (targets[1].x - targets[0].x) as f32 / dx as f32;
        let scale_y = (targets[1].y - targets[0].y) as f32 / dy as f32;
        Ok(Calibration {
            scale_x,
            offset_x: targets[0].x as f32 - samples[0].x as f32 * scale_x,
            scale_y,
            offset_y: targets[0].y as f32 - samples[0].y as f32 * scale_y,
        })
    }

    pub fn apply(&self, raw: RawTouch) -> TouchPoint {
        TouchPoint {
            x: (raw.x as f32 * self.scale_x + self.offset_x).round() as i32,
            y: (raw.y as f32 * self.scale_y + self.offset_y).round() as i32,
        }
    }
}

/// Two-point calibration run: show a target, record the raw press, repeat.
pub struct Calibrator {
    targets: [TouchPoint; 2],
    samples: Vec<RawTouch>,
}

impl Calibrator {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            targets: [
                TouchPoint { x: CALIBRATION_MARGIN, y: CALIBRATION_MARGIN },
                TouchPoint {
                    x: width - CALIBRATION_MARGIN,
                    y: height - CALIBRATION_MARGIN,
                },
            ],
            samples: Vec::with_capacity(2),
        }
    }

    /// The target to draw next, or `None` once both are recorded.
    pub fn target(&self) -> Option<TouchPoint> {
        self.targets.get(self.samples.len()).copied()
    }

    /// Record the press for the current target. Returns the fitted
    /// calibration after the second one.
    pub fn record(&mut self, raw: RawTouch) -> Option<Result<Calibration>> {
        if self.target().is_none() {
            return None;
        }
        debug!("calibration: target {} raw=({}, {})", self.samples.len(), raw.x, raw.y);
        self.samples.push(raw);
        if self.samples.len() < 2 {
            return None;
        }
        Some(Calibration::from_samples(self.targets, [self.samples[0], self.samples[1]]))
    }

    /// Start over after a degenerate fit.
    pub fn restart(&mut self) {
        self.samples.clear();
    }
}

// ── Press tracking ──────────────────────────────────────────────────

/// Turns a level-sampled controller into press events: a press is reported
/// once, on the poll where the panel goes from released to touched.
#[derive(Debug, Default)]
pub struct PressTracker {
    down: bool,
    presses: u32,
}

impl PressTracker {
    pub fn poll(&mut self, input: &mut dyn TouchInput) -> Option<RawTouch> {
        let sample = input.raw_point();
        let was_down = self.down;
        self.down = sample.is_some();
        match sample {
            Some(raw) if !was_down => {
                self.presses += 1;
                debug!("TOUCH down #{} raw=({}, {})", self.presses, raw.x, raw.y);
                Some(raw)
            }
            _ => None,
        }
    }
}

// ── File store ──────────────────────────────────────────────────────

/// JSON calibration file on the mounted filesystem.
#[cfg(any(test, feature = "touch"))]
pub struct FileCalibrationStore {
    path: PathBuf,
}

#[cfg(any(test, feature = "touch"))]
impl FileCalibrationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(any(test, feature = "touch"))]
impl CalibrationStore for FileCalibrationStore {
    fn load(&mut self) -> Result<Option<Calibration>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&text) {
            Ok(cal) => {
                log::info!("Touch calibration loaded from {}", self.path.display());
                Ok(Some(cal))
            }
            Err(e) => {
                log::warn!("Touch calibration file unreadable ({}), recalibrating", e);
                Ok(None)
            }
        }
    }

    fn save(&mut self, calibration: &Calibration) -> Result<()> {
        std::fs::write(&self.path, serde_json::to_string(calibration)?)?;
        log::info!("Touch calibration saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a scripted sequence of controller samples, then reports idle.
    #[derive(Default)]
    pub struct ScriptedTouch {
        pub samples: VecDeque<Option<RawTouch>>,
    }

    impl ScriptedTouch {
        pub fn new(samples: impl IntoIterator<Item = Option<RawTouch>>) -> Self {
            Self { samples: samples.into_iter().collect() }
        }
    }

    impl TouchInput for ScriptedTouch {
        fn raw_point(&mut self) -> Option<RawTouch> {
            self.samples.pop_front().flatten()
        }
    }
}
