// Thermostat record as exposed to the rest of the program. Both API families
// decode their own JSON shape and convert into this one struct, so the menu
// code never sees vendor field names.

use chrono::{DateTime, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt;

/// Control strategy of a thermostat. Discriminants are the vendor codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegulationMode {
    Schedule,
    Comfort,
    Manual,
    Vacation,
    FrostProtection,
    Boost,
    Eco,
    /// Code the client does not know about; shown by number.
    Other(u8),
}

impl RegulationMode {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => RegulationMode::Schedule,
            2 => RegulationMode::Comfort,
            3 => RegulationMode::Manual,
            4 => RegulationMode::Vacation,
            6 => RegulationMode::FrostProtection,
            8 => RegulationMode::Boost,
            9 => RegulationMode::Eco,
            other => RegulationMode::Other(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            RegulationMode::Schedule => 1,
            RegulationMode::Comfort => 2,
            RegulationMode::Manual => 3,
            RegulationMode::Vacation => 4,
            RegulationMode::FrostProtection => 6,
            RegulationMode::Boost => 8,
            RegulationMode::Eco => 9,
            RegulationMode::Other(code) => code,
        }
    }
}

impl fmt::Display for RegulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegulationMode::Schedule => f.write_str("Schedule"),
            RegulationMode::Comfort => f.write_str("Comfort"),
            RegulationMode::Manual => f.write_str("Manual"),
            RegulationMode::Vacation => f.write_str("Vacation"),
            RegulationMode::FrostProtection => f.write_str("Frost Protection"),
            RegulationMode::Boost => f.write_str("Boost"),
            RegulationMode::Eco => f.write_str("Eco"),
            RegulationMode::Other(code) => write!(f, "{}", code),
        }
    }
}

/// Which probe drives the reported current temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorMode {
    #[default]
    Room,
    Floor,
    RoomFloor,
}

impl SensorMode {
    pub fn from_code(code: u8) -> Self {
        match code {
            3 => SensorMode::RoomFloor,
            4 => SensorMode::Floor,
            _ => SensorMode::Room,
        }
    }
}

/// One thermostat as last reported by the vendor. Temperatures are integer
/// hundredths of a degree Celsius.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Thermostat {
    pub model: String,
    pub serial_number: String,
    pub software_version: String,
    pub name: String,
    pub online: bool,
    pub heating: bool,
    pub regulation_mode: Option<RegulationMode>,
    pub supported_regulation_modes: Vec<RegulationMode>,
    /// Setpoint per regulation mode.
    pub temperatures: BTreeMap<RegulationMode, i32>,
    pub min_temperature: i32,
    pub max_temperature: i32,
    pub temperature_floor: Option<i32>,
    pub temperature_room: Option<i32>,
    pub sensor_mode: SensorMode,
    pub comfort_end_time: Option<NaiveDateTime>,
    pub boost_end_time: Option<NaiveDateTime>,
    pub vacation_mode: bool,
    pub vacation_begin_time: Option<NaiveDateTime>,
    pub vacation_end_time: Option<NaiveDateTime>,
    pub adaptive_mode: Option<bool>,
    pub open_window_detection: Option<bool>,
    /// kWh readings, most recent first.
    pub energy: Vec<f64>,
}

impl Thermostat {
    pub fn mode(&self) -> RegulationMode {
        self.regulation_mode.unwrap_or(RegulationMode::Schedule)
    }

    /// Reading of the probe selected by the sensor mode, falling back to the
    /// other probe when the selected one is absent.
    pub fn current_temperature(&self) -> Option<i32> {
        match self.sensor_mode {
            SensorMode::Floor => self.temperature_floor.or(self.temperature_room),
            SensorMode::Room | SensorMode::RoomFloor => {
                self.temperature_room.or(self.temperature_floor)
            }
        }
    }

    pub fn target_temperature(&self) -> i32 {
        let mode = self.mode();
        if let Some(value) = self.temperatures.get(&mode) {
            return *value;
        }
        if mode == RegulationMode::Boost {
            return self.max_temperature;
        }
        self.temperatures
            .get(&RegulationMode::Manual)
            .copied()
            .unwrap_or(self.min_temperature)
    }

    /// Stored setpoint for a mode other than the active one.
    pub fn setpoint(&self, mode: RegulationMode) -> Option<i32> {
        self.temperatures.get(&mode).copied()
    }

    pub fn current_energy(&self) -> Option<f64> {
        self.energy.first().copied()
    }

    pub fn in_band(&self, temperature: i32) -> bool {
        temperature >= self.min_temperature && temperature <= self.max_temperature
    }
}

/// Vendor timestamps come either as RFC 3339 or as a bare local datetime.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%d/%m/%Y %H:%M:%S %:z") {
        return Some(dt.naive_utc());
    }
    tracing::debug!(raw, "unrecognized timestamp");
    None
}
