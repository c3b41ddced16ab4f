// Human-readable rendering of thermostats and colored status lines.

use crate::api::{RegulationMode, Thermostat};
use std::fmt::Write as _;

/// Hundredths of a degree as a Celsius string: 2100 -> "21.0", 2155 -> "21.55".
pub fn celsius(hundredths: i32) -> String {
    let text = format!("{:.2}", f64::from(hundredths) / 100.0);
    let trimmed = text.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

fn optional_celsius(value: Option<i32>) -> String {
    value.map(celsius).unwrap_or_else(|| "n/a".to_string())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "Enabled"
    } else {
        "Disabled"
    }
}

/// Numbered entry used by the list view and the selection prompt.
pub fn format_summary(index: usize, t: &Thermostat) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}. {} ({})", index, t.name, t.serial_number);
    let _ = writeln!(
        out,
        "   Status: {}, {}",
        if t.online { "Online" } else { "Offline" },
        if t.heating { "Heating" } else { "Not Heating" }
    );
    let _ = writeln!(
        out,
        "   Temperature: Current {}°C, Target {}°C",
        optional_celsius(t.current_temperature()),
        celsius(t.target_temperature())
    );
    let _ = writeln!(out, "   Mode: {}", t.mode());
    let _ = writeln!(out, "   Model: {}", t.model);
    let _ = writeln!(out, "   Software Version: {}", t.software_version);
    out
}

pub fn format_details(t: &Thermostat) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== {} Details ===", t.name);
    let _ = writeln!(out, "Serial Number: {}", t.serial_number);
    let _ = writeln!(out, "Model: {}", t.model);
    let _ = writeln!(out, "Software Version: {}", t.software_version);
    let _ = writeln!(out, "Status: {}", if t.online { "Online" } else { "Offline" });
    let _ = writeln!(out, "Heating: {}", if t.heating { "Yes" } else { "No" });

    let _ = writeln!(
        out,
        "Current Temperature: {}°C",
        optional_celsius(t.current_temperature())
    );
    let _ = writeln!(out, "Target Temperature: {}°C", celsius(t.target_temperature()));
    if let Some(floor) = t.temperature_floor {
        let _ = writeln!(out, "Floor Temperature: {}°C", celsius(floor));
    }
    if let Some(room) = t.temperature_room {
        let _ = writeln!(out, "Room Temperature: {}°C", celsius(room));
    }
    let _ = writeln!(
        out,
        "Temperature Range: {}°C - {}°C",
        celsius(t.min_temperature),
        celsius(t.max_temperature)
    );

    let _ = writeln!(out, "Regulation Mode: {}", t.mode());
    let supported: Vec<String> = t
        .supported_regulation_modes
        .iter()
        .map(ToString::to_string)
        .collect();
    let _ = writeln!(out, "Supported Modes: {}", supported.join(", "));

    if let Some(adaptive) = t.adaptive_mode {
        let _ = writeln!(out, "Adaptive Mode: {}", enabled(adaptive));
    }
    if let Some(open_window) = t.open_window_detection {
        let _ = writeln!(out, "Open Window Detection: {}", enabled(open_window));
    }
    if let Some(energy) = t.current_energy() {
        let _ = writeln!(out, "Energy Usage: {} kWh", energy);
    }

    match (t.mode(), t.boost_end_time, t.comfort_end_time) {
        (RegulationMode::Boost, Some(end), _) => {
            let _ = writeln!(out, "Boost End Time: {}", end);
        }
        (RegulationMode::Comfort, _, Some(end)) => {
            let _ = writeln!(out, "Comfort End Time: {}", end);
        }
        _ => {}
    }
    if t.vacation_mode {
        if let Some(begin) = t.vacation_begin_time {
            let _ = writeln!(out, "Vacation Begin Time: {}", begin);
        }
        if let Some(end) = t.vacation_end_time {
            let _ = writeln!(out, "Vacation End Time: {}", end);
        }
    }
    out
}

fn print_colored(
    mut target: impl std::io::Write,
    color: crossterm::style::Color,
    prefix: &str,
    msg: &str,
) {
    use crossterm::style::{Print, ResetColor, SetForegroundColor};

    let _ = crossterm::execute!(
        target,
        SetForegroundColor(color),
        Print(prefix),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Green check mark, stdout.
pub fn print_success(msg: &str) {
    print_colored(std::io::stdout(), crossterm::style::Color::Green, "✓ ", msg);
}

/// Red cross, stderr.
pub fn print_error(msg: &str) {
    print_colored(std::io::stderr(), crossterm::style::Color::Red, "✗ ", msg);
}

pub fn print_warning(msg: &str) {
    print_colored(std::io::stderr(), crossterm::style::Color::Yellow, "⚠ ", msg);
}

pub fn print_info(msg: &str) {
    print_colored(std::io::stdout(), crossterm::style::Color::Cyan, "ℹ ", msg);
}
