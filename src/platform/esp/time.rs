use anyhow::Result;
use esp_idf_svc::sntp::{EspSntp, OperatingMode, SntpConf, SyncMode};
use log::info;

use crate::time_sync::{LocalTime, TimeSource};

const SNTP_SERVERS: [&str; 2] = ["pool.ntp.org", "time.nist.gov"];

/// SNTP-backed wall clock. Local time goes through libc with the TZ
/// string set by `configure`. The client lives as long as the source so
/// it keeps re-syncing in the background.
#[derive(Default)]
pub struct SntpTime {
    sntp: Option<EspSntp<'static>>,
}

impl TimeSource for SntpTime {
    fn configure(&mut self, timezone: &str) -> Result<()> {
        info!("Setting timezone: {}", timezone);
        std::env::set_var("TZ", timezone);
        unsafe { libc::tzset() };

        if self.sntp.is_none() {
            let conf = SntpConf {
                servers: SNTP_SERVERS,
                sync_mode: SyncMode::Immediate,
                operating_mode: OperatingMode::Poll,
            };
            info!("Starting SNTP sync with {}", SNTP_SERVERS[0]);
            self.sntp = Some(EspSntp::new_with_callback(&conf, |_| {
                info!("SNTP sync callback triggered");
            })?);
        }
        Ok(())
    }

    fn epoch_secs(&self) -> i64 {
        let mut now: libc::time_t = 0;
        unsafe {
            libc::time(&mut now);
        }
        now as i64
    }

    fn local(&self, epoch_secs: i64) -> LocalTime {
        let now = epoch_secs as libc::time_t;
        let mut tm: libc::tm = unsafe { std::mem::zeroed() };
        unsafe {
            libc::localtime_r(&now, &mut tm);
        }
        LocalTime {
            year: tm.tm_year + 1900,
            month: (tm.tm_mon + 1) as u8,
            day: tm.tm_mday as u8,
            weekday: tm.tm_wday as u8,
            hour: tm.tm_hour as u8,
            minute: tm.tm_min as u8,
            second: tm.tm_sec as u8,
        }
    }
}
