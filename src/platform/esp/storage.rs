use anyhow::Result;
use esp_idf_sys::EspError;
use log::info;

use crate::platform::mount::mount_or_format;

/// Mount point of the SPIFFS data partition.
pub const DATA_DIR: &str = "/spiffs";
const MAX_OPEN_FILES: usize = 5;

fn register() -> Result<(), EspError> {
    let conf = esp_idf_sys::esp_vfs_spiffs_conf_t {
        base_path: c"/spiffs".as_ptr(),
        partition_label: core::ptr::null(),
        max_files: MAX_OPEN_FILES,
        format_if_mount_failed: false,
    };
    EspError::convert(unsafe { esp_idf_sys::esp_vfs_spiffs_register(&conf) })
}

/// Mount SPIFFS. A partition that fails to mount is formatted once and
/// mounted again; the second failure is returned.
pub fn mount() -> Result<()> {
    mount_or_format("SPIFFS", register, || {
        EspError::convert(unsafe { esp_idf_sys::esp_spiffs_format(core::ptr::null()) })
    })?;

    let mut total = 0usize;
    let mut used = 0usize;
    let rc = unsafe { esp_idf_sys::esp_spiffs_info(core::ptr::null(), &mut total, &mut used) };
    if rc == esp_idf_sys::ESP_OK {
        info!("SPIFFS mounted at {} ({} of {} bytes used)", DATA_DIR, used, total);
    } else {
        info!("SPIFFS mounted at {}", DATA_DIR);
    }
    Ok(())
}
