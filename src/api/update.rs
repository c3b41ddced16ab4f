// Body of a mode/setpoint change. Both families accept the same field names;
// WD5 wraps the object in `SetThermostat`, WG4 posts it as is.

use super::thermostat::{RegulationMode, Thermostat};
use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;

/// Comfort duration used when the caller does not give one, in minutes.
pub const DEFAULT_COMFORT_MINUTES: u32 = 240;

/// Boost always runs for one hour.
const BOOST_MINUTES: i64 = 60;

#[derive(Serialize, Debug, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ThermostatUpdate {
    pub regulation_mode: u8,
    pub vacation_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comfort_setpoint: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comfort_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_mode_setpoint: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacation_temperature: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacation_begin_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacation_end_day: Option<String>,
}

impl ThermostatUpdate {
    /// Switch to `mode`. A missing temperature falls back to the setpoint the
    /// device already stores for that mode.
    pub fn regulation(
        resource: &Thermostat,
        mode: RegulationMode,
        temperature: Option<i32>,
        duration: Option<u32>,
        now: NaiveDateTime,
    ) -> Self {
        let temperature = temperature.or_else(|| resource.setpoint(mode));
        let mut update = ThermostatUpdate {
            regulation_mode: mode.code(),
            ..Default::default()
        };
        match mode {
            RegulationMode::Comfort => {
                let minutes = duration.unwrap_or(DEFAULT_COMFORT_MINUTES);
                update.comfort_setpoint = temperature;
                update.comfort_end_time =
                    Some(wire_time(now + Duration::minutes(i64::from(minutes))));
            }
            RegulationMode::Manual => {
                update.manual_mode_setpoint = temperature;
            }
            RegulationMode::Boost => {
                update.boost_end_time = Some(wire_time(now + Duration::minutes(BOOST_MINUTES)));
            }
            _ => {}
        }
        update
    }

    pub fn vacation(temperature: i32, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        ThermostatUpdate {
            regulation_mode: RegulationMode::Vacation.code(),
            vacation_enabled: true,
            vacation_temperature: Some(temperature),
            vacation_begin_day: Some(wire_time(start)),
            vacation_end_day: Some(wire_time(end)),
            ..Default::default()
        }
    }
}

/// Current time on the clock the vendor timestamps are written in. Every
/// time sent to a thermostat, computed or defaulted, starts from here.
pub fn wire_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub(crate) fn wire_time(at: NaiveDateTime) -> String {
    at.format("%d/%m/%Y %H:%M:00 +00:00").to_string()
}
