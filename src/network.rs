use anyhow::Result;

/// Station-mode network association.
pub trait Network {
    /// Start associating. Completion is observed through `is_connected`.
    fn begin(&mut self, ssid: &str, password: &str) -> Result<()>;
    fn is_connected(&mut self) -> bool;
    fn rssi_dbm(&mut self) -> i32;
    fn ip_address(&mut self) -> Option<String>;
}

/// Map RSSI in dBm to a 0..=100 quality percentage.
pub fn signal_quality(dbm: i32) -> u8 {
    if dbm <= -100 {
        0
    } else if dbm >= -50 {
        100
    } else {
        (2 * (dbm + 100)) as u8
    }
}

pub const SIGNAL_BARS: u8 = 4;

/// Whether bar `index` (0 = shortest) is lit: each bar covers a quarter
/// of the quality range and lights once quality exceeds its floor.
pub fn bar_lit(quality: u8, index: u8) -> bool {
    u16::from(quality) > u16::from(index) * 25
}

/// Number of lit bars (0..=4) for the quality indicator.
pub fn signal_bars(quality: u8) -> u8 {
    (0..SIGNAL_BARS).filter(|&i| bar_lit(quality, i)).count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_at_both_ends() {
        assert_eq!(signal_quality(-120), 0);
        assert_eq!(signal_quality(-100), 0);
        assert_eq!(signal_quality(-50), 100);
        assert_eq!(signal_quality(-20), 100);
    }

    #[test]
    fn quality_is_linear_in_between() {
        assert_eq!(signal_quality(-99), 2);
        assert_eq!(signal_quality(-75), 50);
        assert_eq!(signal_quality(-51), 98);
    }

    #[test]
    fn bars_follow_quality() {
        assert_eq!(signal_bars(0), 0);
        assert_eq!(signal_bars(1), 1);
        assert_eq!(signal_bars(25), 1);
        assert_eq!(signal_bars(26), 2);
        assert_eq!(signal_bars(50), 2);
        assert_eq!(signal_bars(51), 3);
        assert_eq!(signal_bars(76), 4);
        assert_eq!(signal_bars(100), 4);
    }

    #[test]
    fn weak_signal_still_lights_one_bar() {
        // -97 dBm is 6% quality, above the first bar's floor.
        let quality = signal_quality(-97);
        assert_eq!(quality, 6);
        assert!(bar_lit(quality, 0));
        assert!(!bar_lit(quality, 1));
        assert_eq!(signal_bars(quality), 1);
    }
}
