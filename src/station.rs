use log::{debug, info, warn};

use crate::astronomy::MoonCalculator;
use crate::carousel::Carousel;
use crate::clock::{wait_until, Clock};
use crate::config::{Settings, NTP_MIN_VALID_EPOCH};
use crate::framebuffer::Panel;
use crate::layout::{SCREEN_H, SCREEN_W};
use crate::network::Network;
use crate::power::{PowerControl, PowerManager, SleepOutcome};
use crate::refresh::{DataRefresh, RefreshReport, RefreshSources};
use crate::render::Renderer;
use crate::screen::{Screen, ScreenState, TouchAction};
use crate::system::SystemInfo;
use crate::time_sync::TimeSource;
use crate::touch::{Calibration, CalibrationStore, Calibrator, PressTracker, TouchInput};
use crate::views::{AboutInfo, ViewContext};
use crate::weather::{WeatherClient, WeatherSnapshot};

// ── Timing ──────────────────────────────────────────────────────────
const WIFI_POLL_MS: u64 = 500;
const TIME_SYNC_POLL_MS: u64 = 300;
const TOUCH_POLL_MS: u64 = 20;
/// Longest the loop blocks on the carousel so clock and touch stay live.
const MAX_FRAME_HOLD_MS: u64 = 1_000;
/// Pause on screens without a carousel so the idle task gets to run.
const IDLE_MS: u64 = 20;

/// Touch controller plus where its calibration lives.
pub struct TouchHardware {
    pub input: Box<dyn TouchInput>,
    pub store: Box<dyn CalibrationStore>,
}

/// Platform collaborators handed to the station at startup.
pub struct Hardware {
    pub clock: Box<dyn Clock>,
    pub network: Box<dyn Network>,
    pub time: Box<dyn TimeSource>,
    pub weather: Box<dyn WeatherClient>,
    pub moon: Box<dyn MoonCalculator>,
    pub panel: Box<dyn Panel>,
    pub touch: Option<TouchHardware>,
    pub system: Box<dyn SystemInfo>,
    pub power: PowerControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Slept(SleepOutcome),
}

/// The firmware's context object: owns every piece of runtime state and
/// drives boot plus the cooperative main loop.
pub struct Station {
    settings: Settings,
    clock: Box<dyn Clock>,
    network: Box<dyn Network>,
    time: Box<dyn TimeSource>,
    weather: Box<dyn WeatherClient>,
    moon: Box<dyn MoonCalculator>,
    touch: Option<TouchHardware>,
    system: Box<dyn SystemInfo>,
    renderer: Renderer,
    snapshot: WeatherSnapshot,
    screen: ScreenState,
    carousel: Carousel,
    refresh: DataRefresh,
    power: PowerManager,
    calibration: Calibration,
    presses: PressTracker,
}

impl Station {
    pub fn new(settings: Settings, hw: Hardware) -> Self {
        let now = hw.clock.now_ms();
        Self {
            screen: ScreenState::new(settings.screen_change_secs, now),
            carousel: Carousel::new(now, SCREEN_W),
            refresh: DataRefresh::new(settings.update_interval_secs, now),
            power: PowerManager::new(settings.sleep_interval_secs, hw.power, now),
            settings,
            clock: hw.clock,
            network: hw.network,
            time: hw.time,
            weather: hw.weather,
            moon: hw.moon,
            touch: hw.touch,
            system: hw.system,
            renderer: Renderer::new(hw.panel),
            snapshot: WeatherSnapshot::default(),
            calibration: Calibration::default(),
            presses: PressTracker::default(),
        }
    }

    /// Boot: connect, calibrate touch if needed, sync time, first refresh,
    /// then start the rotation and inactivity timers.
    pub fn boot(&mut self) {
        info!("Booting weather station");
        self.renderer.clear();
        self.connect_wifi();
        self.calibrate_touch();
        self.sync_time();
        self.update_data();

        let now = self.clock.now_ms();
        self.screen.restart_rotation(now);
        self.carousel.restart(now);
        self.power.start(now);
        info!("Boot complete, entering main loop");
    }

    fn connect_wifi(&mut self) {
        let ssid = self.settings.wifi_ssid.clone();
        info!("Connecting to WiFi '{}' (password <{} chars>)", ssid, self.settings.wifi_pass.len());
        if let Err(e) = self.network.begin(&ssid, &self.settings.wifi_pass) {
            warn!("WiFi begin failed: {:#}", e);
        }
        let text = format!("Connecting to WiFi '{}'", ssid);
        let network = &mut self.network;
        let renderer = &mut self.renderer;
        // 0, 10, .. 80, then back to 0.
        let ticks = wait_until(
            self.clock.as_mut(),
            WIFI_POLL_MS,
            || network.is_connected(),
            |tick| renderer.progress(((tick % 9) * 10) as u8, &text),
        );
        info!("WiFi connected after {} polls, IP {:?}", ticks, self.network.ip_address());
        self.renderer
            .progress(100, &format!("Connected to WiFi '{}'", ssid));
    }

    fn calibrate_touch(&mut self) {
        let Some(touch) = self.touch.as_mut() else {
            return;
        };
        match touch.store.load() {
            Ok(Some(cal)) => {
                self.calibration = cal;
                return;
            }
            Ok(None) => info!("No touch calibration stored, starting calibration"),
            Err(e) => warn!("Touch calibration load failed: {:#}", e),
        }

        let mut calibrator = Calibrator::new(SCREEN_W, SCREEN_H);
        let calibration = loop {
            let Some(target) = calibrator.target() else {
                calibrator.restart();
                continue;
            };
            self.renderer.calibration_target(target);
            let mut pressed = None;
            let presses = &mut self.presses;
            let input = touch.input.as_mut();
            wait_until(
                self.clock.as_mut(),
                TOUCH_POLL_MS,
                || {
                    pressed = presses.poll(&mut *input);
                    pressed.is_some()
                },
                |_| {},
            );
            let Some(raw) = pressed else {
                continue;
            };
            match calibrator.record(raw) {
                Some(Ok(cal)) => break cal,
                Some(Err(e)) => {
                    warn!("Touch calibration rejected: {:#}", e);
                    calibrator.restart();
                }
                None => {}
            }
        };

        if let Err(e) = touch.store.save(&calibration) {
            warn!("Touch calibration not saved: {:#}", e);
        }
        self.calibration = calibration;
    }

    fn sync_time(&mut self) {
        if let Err(e) = self.time.configure(&self.settings.timezone) {
            warn!("Time source configuration failed: {:#}", e);
        }
        let time = &self.time;
        let renderer = &mut self.renderer;
        let ticks = wait_until(
            self.clock.as_mut(),
            TIME_SYNC_POLL_MS,
            || time.epoch_secs() >= NTP_MIN_VALID_EPOCH,
            |tick| renderer.progress(((tick % 10) * 10) as u8, "Updating time..."),
        );
        info!("Time synchronized after {} polls", ticks);
        self.renderer.progress(100, "Time synchronized");
    }

    /// Run the three-step refresh behind progress screens.
    pub fn update_data(&mut self) -> RefreshReport {
        let epoch = self.time.epoch_secs();
        let renderer = &mut self.renderer;
        let report = self.refresh.run(
            &mut self.snapshot,
            RefreshSources {
                weather: self.weather.as_mut(),
                moon: self.moon.as_ref(),
            },
            &self.settings,
            self.clock.as_mut(),
            epoch,
            |pct, text| renderer.progress(pct, text),
        );
        if !report.all_ok() {
            warn!("Refresh incomplete, stale data kept where a step failed");
        }
        report
    }

    fn poll_touch(&mut self) {
        let Some(touch) = self.touch.as_mut() else {
            return;
        };
        let Some(raw) = self.presses.poll(touch.input.as_mut()) else {
            return;
        };
        let point = self.calibration.apply(raw);
        if let TouchAction::Advanced(screen) =
            self.screen.handle_touch(point, &mut self.settings.is_12h_style)
        {
            if screen == Screen::Home {
                self.carousel.restart(self.clock.now_ms());
            }
        }
    }

    fn about_info(&mut self) -> AboutInfo {
        AboutInfo {
            free_heap_bytes: self.system.free_heap_bytes(),
            cpu_freq_mhz: self.system.cpu_freq_mhz(),
            uptime_ms: self.clock.now_ms(),
            ip_address: self.network.ip_address(),
            reset_reason: self.system.reset_reason(),
        }
    }

    /// One loop iteration: input, render, commit, cadence hold, then the
    /// refresh, rotation and sleep timers.
    pub fn step(&mut self) -> StepOutcome {
        self.poll_touch();

        let screen = self.screen.current();
        let about = (screen == Screen::About).then(|| self.about_info());
        let rssi_dbm = self.network.rssi_dbm();
        let now = self.clock.now_ms();
        let ctx = ViewContext {
            snapshot: &self.snapshot,
            settings: &self.settings,
            time: self.time.as_ref(),
            now_epoch: self.time.epoch_secs(),
            rssi_dbm,
            about,
        };
        let remaining = self.renderer.frame(screen, &ctx, &mut self.carousel, now);
        debug!("frame #{} {:?}, carousel {} ms left", self.renderer.commits(), screen, remaining);
        let hold = if remaining > 0 {
            remaining.min(MAX_FRAME_HOLD_MS)
        } else {
            IDLE_MS
        };
        self.clock.delay_ms(hold);

        let now = self.clock.now_ms();
        if self.refresh.is_due(now) {
            self.update_data();
        }

        let now = self.clock.now_ms();
        self.screen.tick(now);

        if self.power.should_sleep(now) {
            let renderer = &mut self.renderer;
            let outcome = self
                .power
                .enter_sleep(self.clock.as_mut(), |pct, text| renderer.progress(pct, text));
            return StepOutcome::Slept(outcome);
        }
        StepOutcome::Continue
    }

    /// Boot, then loop forever. With deep sleep available this ends in a halt.
    pub fn run(&mut self) {
        self.boot();
        loop {
            self.step();
        }
    }
}

#[cfg(test)]
impl Station {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn snapshot(&self) -> &WeatherSnapshot {
        &self.snapshot
    }

    pub fn screen(&self) -> Screen {
        self.screen.current()
    }

    pub fn refresh_cycles(&self) -> u32 {
        self.refresh.cycles()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}
