// Client for the WG4 family (UWG4, AWG4). Plain email/password login; the
// session id travels as a query parameter.

use super::error::{ApiError, Result};
use super::http::Transport;
use super::thermostat::{parse_timestamp, RegulationMode, SensorMode, Thermostat};
use super::update::{wire_now, ThermostatUpdate};
use super::wd5::{login_session, LoginResponse};
use super::ThermostatApi;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const WG4_HOST: &str = "mythermostat.info";

const LOGIN_PATH: &str = "/api/authenticate/user";
const THERMOSTATS_PATH: &str = "/api/thermostats";
const UPDATE_PATH: &str = "/api/thermostat";
const APPLICATION_ID: u32 = 2;

const SUPPORTED_MODES: [RegulationMode; 4] = [
    RegulationMode::Schedule,
    RegulationMode::Comfort,
    RegulationMode::Manual,
    RegulationMode::Vacation,
];

pub struct Wg4Api {
    transport: Transport,
    username: String,
    password: String,
    session_id: Option<String>,
}

impl Wg4Api {
    pub fn new(
        username: &str,
        password: &str,
        host: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Wg4Api {
            transport: Transport::new(host.unwrap_or(WG4_HOST), timeout)?,
            username: username.to_string(),
            password: password.to_string(),
            session_id: None,
        })
    }

    fn session(&self) -> Result<&str> {
        self.session_id.as_deref().ok_or(ApiError::NotLoggedIn)
    }

    fn update(&self, serial: &str, update: ThermostatUpdate) -> Result<()> {
        let session = self.session()?;
        let res: SuccessResponse = self.transport.post(
            UPDATE_PATH,
            &[("sessionid", session), ("serialnumber", serial)],
            &update,
        )?;
        if res.success {
            Ok(())
        } else {
            Err(ApiError::Request(format!(
                "thermostat {} rejected the update",
                serial
            )))
        }
    }
}

impl ThermostatApi for Wg4Api {
    fn login(&mut self) -> Result<()> {
        let body = LoginRequest {
            email: &self.username,
            password: &self.password,
            application: APPLICATION_ID,
            confirm: "",
        };
        let res: LoginResponse = self.transport.post(LOGIN_PATH, &[], &body)?;
        self.session_id = Some(login_session(res)?);
        tracing::info!(user = %self.username, "logged in to WG4 API");
        Ok(())
    }

    fn get_thermostats(&self) -> Result<Vec<Thermostat>> {
        let session = self.session()?;
        let res: GroupsResponse = self
            .transport
            .get(THERMOSTATS_PATH, &[("sessionid", session)])?;
        Ok(res.into_thermostats())
    }

    fn set_regulation_mode(
        &self,
        resource: &Thermostat,
        mode: RegulationMode,
        temperature: Option<i32>,
        duration: Option<u32>,
    ) -> Result<()> {
        let now = wire_now();
        let update = ThermostatUpdate::regulation(resource, mode, temperature, duration, now);
        self.update(&resource.serial_number, update)
    }

    fn set_vacation_mode(
        &self,
        resource: &Thermostat,
        temperature: i32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<()> {
        let update = ThermostatUpdate::vacation(temperature, start, end);
        self.update(&resource.serial_number, update)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    application: u32,
    confirm: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SuccessResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct GroupsResponse {
    #[serde(default)]
    groups: Vec<Wg4Group>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct Wg4Group {
    #[serde(default)]
    thermostats: Vec<Wg4Thermostat>,
}

impl GroupsResponse {
    fn into_thermostats(self) -> Vec<Thermostat> {
        self.groups
            .into_iter()
            .flat_map(|g| g.thermostats)
            .map(Thermostat::from)
            .collect()
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase", default)]
struct Wg4Thermostat {
    serial_number: String,
    thermostat_name: String,
    #[serde(rename = "SWVersion")]
    sw_version: String,
    online: bool,
    heating: bool,
    regulation_mode: Option<u8>,
    sensor_appl: Option<u8>,
    temperature: Option<i32>,
    floor_temperature: Option<i32>,
    min_temp: i32,
    max_temp: i32,
    set_point_temp: Option<i32>,
    comfort_setpoint: Option<i32>,
    manual_mode_setpoint: Option<i32>,
    vacation_temperature: Option<i32>,
    comfort_end_time: Option<String>,
    boost_end_time: Option<String>,
    vacation_enabled: bool,
    vacation_begin_day: Option<String>,
    vacation_end_day: Option<String>,
}

impl From<Wg4Thermostat> for Thermostat {
    fn from(raw: Wg4Thermostat) -> Self {
        let mut temperatures = BTreeMap::new();
        let setpoints = [
            (RegulationMode::Schedule, raw.set_point_temp),
            (RegulationMode::Comfort, raw.comfort_setpoint),
            (RegulationMode::Manual, raw.manual_mode_setpoint),
            (RegulationMode::Vacation, raw.vacation_temperature),
        ];
        for (mode, value) in setpoints {
            if let Some(value) = value {
                temperatures.insert(mode, value);
            }
        }

        Thermostat {
            model: "UWG4".to_string(),
            serial_number: raw.serial_number,
            software_version: raw.sw_version,
            name: raw.thermostat_name,
            online: raw.online,
            heating: raw.heating,
            regulation_mode: raw.regulation_mode.map(RegulationMode::from_code),
            supported_regulation_modes: SUPPORTED_MODES.to_vec(),
            temperatures,
            min_temperature: raw.min_temp,
            max_temperature: raw.max_temp,
            temperature_floor: raw.floor_temperature,
            temperature_room: raw.temperature,
            sensor_mode: raw.sensor_appl.map(SensorMode::from_code).unwrap_or_default(),
            comfort_end_time: parse_timestamp(raw.comfort_end_time.as_deref()),
            boost_end_time: parse_timestamp(raw.boost_end_time.as_deref()),
            vacation_mode: raw.vacation_enabled,
            vacation_begin_time: parse_timestamp(raw.vacation_begin_day.as_deref()),
            vacation_end_time: parse_timestamp(raw.vacation_end_day.as_deref()),
            adaptive_mode: None,
            open_window_detection: None,
            energy: Vec::new(),
        }
    }
}
