use embedded_graphics::{mono_font::MonoTextStyle, text::Alignment};
use profont::{PROFONT_10_POINT, PROFONT_18_POINT};

use crate::framebuffer::Framebuffer;
use crate::layout::*;
use crate::time_sync::format_uptime;
use crate::views::ViewContext;

/// Label/value lines start below the banner.
const FIRST_LINE: i32 = 7;

pub fn draw_banner(fb: &mut Framebuffer) {
    let title = MonoTextStyle::new(&PROFONT_18_POINT, TEXT_ACCENT);
    draw_text(fb, "WX Station", SCREEN_W / 2, 30, title, Alignment::Center);
    let sub = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_PRIMARY);
    draw_text(fb, "openweathermap.org", SCREEN_W / 2, 90, sub, Alignment::Center);
}

pub fn draw(fb: &mut Framebuffer, ctx: &ViewContext<'_>) {
    draw_banner(fb);

    let info = ctx.about.clone().unwrap_or_default();
    let ip = info.ip_address.unwrap_or_else(|| "-".to_string());
    let rows = [
        ("Heap Mem:", format!("{}kb", info.free_heap_bytes / 1024)),
        ("WiFi Strength:", format!("{}dB", ctx.rssi_dbm)),
        ("CPU Freq.:", format!("{}MHz", info.cpu_freq_mhz)),
        ("Uptime:", format_uptime(info.uptime_ms)),
        ("IP Address:", ip),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        draw_label_value(fb, FIRST_LINE + i as i32, label, value);
    }

    let label = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_ACCENT);
    let value = MonoTextStyle::new(&PROFONT_10_POINT, TEXT_PRIMARY);
    draw_text(fb, "Last Reset:", 15, 280, label, Alignment::Left);
    draw_text(fb, &info.reset_reason, 15, 295, value, Alignment::Left);
}
