use crate::framebuffer::Framebuffer;
use crate::layout::{draw_label_value, draw_title};
use crate::views::ViewContext;

pub fn draw(fb: &mut Framebuffer, ctx: &ViewContext<'_>) {
    draw_title(fb, "Current Conditions");

    let Some(c) = &ctx.snapshot.current else {
        draw_label_value(fb, 0, "Status:", "no data yet");
        return;
    };
    let settings = ctx.settings;
    let rows = [
        ("Temperature:", format!("{:.1}{}", c.temp, settings.temperature_unit())),
        ("Wind Speed:", format!("{:.1}{}", c.wind_speed, settings.speed_unit())),
        ("Wind Dir:", format!("{:.1}°", c.wind_deg)),
        ("Humidity:", format!("{}%", c.humidity)),
        ("Pressure:", format!("{}hPa", c.pressure_hpa)),
        ("Clouds:", format!("{}%", c.clouds)),
        ("Visibility:", format!("{}m", c.visibility_m)),
    ];
    for (line, (label, value)) in rows.iter().enumerate() {
        draw_label_value(fb, line as i32, label, value);
    }
}
