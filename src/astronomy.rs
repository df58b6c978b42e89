use std::f64::consts::PI;

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530588853;
/// A known new moon: 2000-01-06 18:14 UTC.
const REFERENCE_NEW_MOON_EPOCH: i64 = 947_182_440;
const LUNAR_MONTH_APPROX: f64 = 29.53;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoonPhase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    ThirdQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub fn from_index(index: u8) -> MoonPhase {
        match index % 8 {
            0 => MoonPhase::New,
            1 => MoonPhase::WaxingCrescent,
            2 => MoonPhase::FirstQuarter,
            3 => MoonPhase::WaxingGibbous,
            4 => MoonPhase::Full,
            5 => MoonPhase::WaningGibbous,
            6 => MoonPhase::ThirdQuarter,
            _ => MoonPhase::WaningCrescent,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            MoonPhase::New => 0,
            MoonPhase::WaxingCrescent => 1,
            MoonPhase::FirstQuarter => 2,
            MoonPhase::WaxingGibbous => 3,
            MoonPhase::Full => 4,
            MoonPhase::WaningGibbous => 5,
            MoonPhase::ThirdQuarter => 6,
            MoonPhase::WaningCrescent => 7,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoonPhase::New => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::Full => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::ThirdQuarter => "Third Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn is_waxing(self) -> bool {
        self.index() <= 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonData {
    pub phase: MoonPhase,
    /// Lit fraction in [0, 1].
    pub illumination: f64,
}

impl MoonData {
    /// Moon age in days, estimated from phase and illumination.
    pub fn approximate_age_days(&self) -> f64 {
        if self.phase.is_waxing() {
            LUNAR_MONTH_APPROX * self.illumination / 2.0
        } else {
            LUNAR_MONTH_APPROX - self.illumination * LUNAR_MONTH_APPROX / 2.0
        }
    }
}

pub trait MoonCalculator {
    fn moon_data(&self, epoch_secs: i64) -> MoonData;
}

/// Mean-motion moon model: good to a few hours, plenty for a phase glyph.
#[derive(Debug, Default, Clone, Copy)]
pub struct Astronomy;

impl Astronomy {
    /// Days since the last new moon, in [0, synodic month).
    pub fn moon_age_days(epoch_secs: i64) -> f64 {
        let days = (epoch_secs - REFERENCE_NEW_MOON_EPOCH) as f64 / 86_400.0;
        days.rem_euclid(SYNODIC_MONTH_DAYS)
    }
}

impl MoonCalculator for Astronomy {
    fn moon_data(&self, epoch_secs: i64) -> MoonData {
        let fraction = Self::moon_age_days(epoch_secs) / SYNODIC_MONTH_DAYS;
        let phase = MoonPhase::from_index(((fraction * 8.0 + 0.5).floor() as i64).rem_euclid(8) as u8);
        let illumination = ((1.0 - (2.0 * PI * fraction).cos()) / 2.0).clamp(0.0, 1.0);
        MoonData {
            phase,
            illumination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    #[test]
    fn reference_epoch_is_new_moon() {
        let moon = Astronomy.moon_data(REFERENCE_NEW_MOON_EPOCH);
        assert_eq!(moon.phase, MoonPhase::New);
        assert!(moon.illumination < 0.01);
    }

    #[test]
    fn half_a_month_later_is_full() {
        let epoch = REFERENCE_NEW_MOON_EPOCH + (SYNODIC_MONTH_DAYS / 2.0 * DAY as f64) as i64;
        let moon = Astronomy.moon_data(epoch);
        assert_eq!(moon.phase, MoonPhase::Full);
        assert!(moon.illumination > 0.99);
    }

    #[test]
    fn quarter_phases_are_half_lit() {
        let quarter = (SYNODIC_MONTH_DAYS / 4.0 * DAY as f64) as i64;
        let first = Astronomy.moon_data(REFERENCE_NEW_MOON_EPOCH + quarter);
        let third = Astronomy.moon_data(REFERENCE_NEW_MOON_EPOCH + 3 * quarter);
        assert_eq!(first.phase, MoonPhase::FirstQuarter);
        assert_eq!(third.phase, MoonPhase::ThirdQuarter);
        assert!((first.illumination - 0.5).abs() < 0.01);
    }

    #[test]
    fn dates_before_reference_still_work() {
        let age = Astronomy::moon_age_days(REFERENCE_NEW_MOON_EPOCH - DAY);
        assert!((age - (SYNODIC_MONTH_DAYS - 1.0)).abs() < 1e-6);
    }

    #[test]
    fn approximate_age_uses_waxing_branch() {
        let waxing = MoonData { phase: MoonPhase::FirstQuarter, illumination: 0.5 };
        let waning = MoonData { phase: MoonPhase::ThirdQuarter, illumination: 0.5 };
        assert!((waxing.approximate_age_days() - 7.3825).abs() < 1e-9);
        assert!((waning.approximate_age_days() - 22.1475).abs() < 1e-9);
    }

    #[test]
    fn phase_index_wraps() {
        assert_eq!(MoonPhase::from_index(9), MoonPhase::WaxingCrescent);
        assert_eq!(MoonPhase::WaningCrescent.label(), "Waning Crescent");
    }
}
