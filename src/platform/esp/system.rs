use crate::system::SystemInfo;

pub struct EspSystemInfo;

impl SystemInfo for EspSystemInfo {
    fn free_heap_bytes(&self) -> u32 {
        unsafe { esp_idf_sys::esp_get_free_heap_size() }
    }

    fn cpu_freq_mhz(&self) -> u32 {
        unsafe { esp_idf_sys::ets_get_cpu_frequency() }
    }

    fn reset_reason(&self) -> String {
        let reason = unsafe { esp_idf_sys::esp_reset_reason() };
        let text = match reason {
            esp_idf_sys::esp_reset_reason_t_ESP_RST_POWERON => "Power on",
            esp_idf_sys::esp_reset_reason_t_ESP_RST_EXT => "External pin",
            esp_idf_sys::esp_reset_reason_t_ESP_RST_SW => "Software reset",
            esp_idf_sys::esp_reset_reason_t_ESP_RST_PANIC => "Panic",
            esp_idf_sys::esp_reset_reason_t_ESP_RST_INT_WDT => "Interrupt watchdog",
            esp_idf_sys::esp_reset_reason_t_ESP_RST_TASK_WDT => "Task watchdog",
            esp_idf_sys::esp_reset_reason_t_ESP_RST_WDT => "Other watchdog",
            esp_idf_sys::esp_reset_reason_t_ESP_RST_DEEPSLEEP => "Deep sleep wakeup",
            esp_idf_sys::esp_reset_reason_t_ESP_RST_BROWNOUT => "Brownout",
            esp_idf_sys::esp_reset_reason_t_ESP_RST_SDIO => "SDIO",
            _ => "Unknown",
        };
        text.to_string()
    }
}
