/// Chip facts for the About screen.
pub trait SystemInfo {
    fn free_heap_bytes(&self) -> u32;
    fn cpu_freq_mhz(&self) -> u32;
    fn reset_reason(&self) -> String;
}

/// Host build: no chip to ask.
#[cfg(any(test, not(target_os = "espidf")))]
pub struct HostSystemInfo;

#[cfg(any(test, not(target_os = "espidf")))]
impl SystemInfo for HostSystemInfo {
    fn free_heap_bytes(&self) -> u32 {
        0
    }

    fn cpu_freq_mhz(&self) -> u32 {
        0
    }

    fn reset_reason(&self) -> String {
        "Power on".to_string()
    }
}
