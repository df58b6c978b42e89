use anyhow::Result;

const WEEKDAY_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTH_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Broken-down local time, as `localtime_r` reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalTime {
    pub year: i32,
    /// 1..=12
    pub month: u8,
    pub day: u8,
    /// 0 = Sunday
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Wall-clock source: NTP on hardware, the host clock in the simulator.
pub trait TimeSource {
    /// Apply a POSIX TZ string and start synchronization.
    fn configure(&mut self, timezone: &str) -> Result<()>;
    fn epoch_secs(&self) -> i64;
    fn local(&self, epoch_secs: i64) -> LocalTime;
}

impl LocalTime {
    pub fn weekday_short(&self) -> &'static str {
        WEEKDAY_SHORT[self.weekday as usize % 7]
    }

    /// "Wed Nov 15 2023"
    pub fn date_line(&self) -> String {
        let month = MONTH_SHORT[(self.month.clamp(1, 12) - 1) as usize];
        format!("{} {} {} {}", self.weekday_short(), month, self.day, self.year)
    }

    /// Clock text and, in 12h mode, the AM/PM marker.
    pub fn clock_text(&self, is_12h: bool, hhmm: bool) -> (String, Option<&'static str>) {
        let (hour, marker) = if is_12h {
            let h = match self.hour % 12 {
                0 => 12,
                h => h,
            };
            (h, Some(if self.hour >= 12 { "PM" } else { "AM" }))
        } else {
            (self.hour, None)
        };
        // 12h hours are space padded, 24h hours zero padded.
        let hour = if is_12h {
            format!("{:2}", hour)
        } else {
            format!("{:02}", hour)
        };
        let text = if hhmm {
            format!("{}:{:02}", hour, self.minute)
        } else {
            format!("{}:{:02}:{:02}", hour, self.minute, self.second)
        };
        (text, marker)
    }

    /// Sunrise/sunset style "HH:MM".
    pub fn hhmm(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// "2d 3h 4m" style uptime.
pub fn format_uptime(uptime_ms: u64) -> String {
    let minutes_total = uptime_ms / 60_000;
    let days = minutes_total / (24 * 60);
    let hours = (minutes_total / 60) % 24;
    let minutes = minutes_total % 60;
    format!("{:2}d{:2}h{:2}m", days, hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u8, minute: u8, second: u8) -> LocalTime {
        LocalTime {
            year: 2023,
            month: 11,
            day: 5,
            weekday: 0,
            hour,
            minute,
            second,
        }
    }

    #[test]
    fn twenty_four_hour_clock() {
        assert_eq!(at(0, 5, 9).clock_text(false, false), ("00:05:09".to_string(), None));
        assert_eq!(at(23, 59, 0).clock_text(false, true), ("23:59".to_string(), None));
    }

    #[test]
    fn twelve_hour_clock_has_marker() {
        assert_eq!(at(0, 0, 0).clock_text(true, true), ("12:00".to_string(), Some("AM")));
        assert_eq!(at(12, 30, 0).clock_text(true, true), ("12:30".to_string(), Some("PM")));
        assert_eq!(at(15, 1, 2).clock_text(true, false), (" 3:01:02".to_string(), Some("PM")));
    }

    #[test]
    fn date_line_format() {
        assert_eq!(at(1, 2, 3).date_line(), "Sun Nov 5 2023");
    }

    #[test]
    fn uptime_breaks_into_days_hours_minutes() {
        let ms = ((2 * 24 + 3) * 60 + 4) * 60_000 + 59_999;
        assert_eq!(format_uptime(ms), " 2d 3h 4m");
        assert_eq!(format_uptime(0), " 0d 0h 0m");
    }
}
