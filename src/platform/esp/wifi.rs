use anyhow::Result;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use crate::network::Network;

/// Station-mode WiFi. `begin` only starts association; the boot sequence
/// polls `is_connected` behind its progress screen.
pub struct EspNetwork {
    wifi: Box<EspWifi<'static>>,
}

impl EspNetwork {
    pub fn new(modem: Modem, sysloop: EspSystemEventLoop) -> Result<Self> {
        let wifi = EspWifi::new(modem, sysloop, None)?;
        Ok(Self { wifi: Box::new(wifi) })
    }

    /// Associated AP record, if any.
    fn ap_info() -> Option<esp_idf_sys::wifi_ap_record_t> {
        let mut ap_info: esp_idf_sys::wifi_ap_record_t = unsafe { core::mem::zeroed() };
        let rc = unsafe { esp_idf_sys::esp_wifi_sta_get_ap_info(&mut ap_info) };
        (rc == esp_idf_sys::ESP_OK).then_some(ap_info)
    }
}

impl Network for EspNetwork {
    fn begin(&mut self, ssid: &str, password: &str) -> Result<()> {
        let auth = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let mut wifi_ssid = heapless::String::<32>::new();
        let mut wifi_pass = heapless::String::<64>::new();
        if wifi_ssid.push_str(ssid).is_err() {
            warn!("WiFi SSID longer than 32 bytes, truncated");
        }
        if wifi_pass.push_str(password).is_err() {
            warn!("WiFi password longer than 64 bytes, truncated");
        }

        self.wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: wifi_ssid,
            password: wifi_pass,
            auth_method: auth,
            ..Default::default()
        }))?;
        self.wifi.start()?;
        self.wifi.connect()?;
        info!("WiFi association to '{}' started", ssid);
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    fn rssi_dbm(&mut self) -> i32 {
        Self::ap_info().map(|ap| i32::from(ap.rssi)).unwrap_or(-100)
    }

    fn ip_address(&mut self) -> Option<String> {
        if !self.is_connected() {
            return None;
        }
        match self.wifi.sta_netif().get_ip_info() {
            Ok(ip_info) => Some(ip_info.ip.to_string()),
            Err(e) => {
                warn!("WiFi IP lookup failed: {}", e);
                None
            }
        }
    }
}
