// Client for the WD5 family (OWD5, MWD5). Login needs an API key and a
// customer id on top of the user credentials; every later call carries the
// session id from login plus the API key.

use super::error::{ApiError, Result};
use super::http::Transport;
use super::thermostat::{parse_timestamp, RegulationMode, SensorMode, Thermostat};
use super::update::{wire_now, ThermostatUpdate};
use super::ThermostatApi;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const WD5_HOST: &str = "ocd5.azurewebsites.net";

const LOGIN_PATH: &str = "/api/UserProfile/SignIn";
const THERMOSTATS_PATH: &str = "/api/Group/GroupContents";
const ENERGY_PATH: &str = "/api/EnergyUsage/GetEnergyUsage";
const UPDATE_PATH: &str = "/api/Thermostat/UpdateThermostat";
const CLIENT_SW_VERSION: u32 = 1060;

const SUPPORTED_MODES: [RegulationMode; 7] = [
    RegulationMode::Schedule,
    RegulationMode::Comfort,
    RegulationMode::Manual,
    RegulationMode::Vacation,
    RegulationMode::FrostProtection,
    RegulationMode::Boost,
    RegulationMode::Eco,
];

pub struct Wd5Api {
    transport: Transport,
    username: String,
    password: String,
    api_key: String,
    customer_id: u32,
    session_id: Option<String>,
}

impl Wd5Api {
    pub fn new(
        username: &str,
        password: &str,
        api_key: &str,
        customer_id: u32,
        host: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Wd5Api {
            transport: Transport::new(host.unwrap_or(WD5_HOST), timeout)?,
            username: username.to_string(),
            password: password.to_string(),
            api_key: api_key.to_string(),
            customer_id,
            session_id: None,
        })
    }

    fn session(&self) -> Result<&str> {
        self.session_id.as_deref().ok_or(ApiError::NotLoggedIn)
    }

    fn energy(&self, session: &str, serial: &str) -> Result<Vec<f64>> {
        let body = EnergyRequest {
            api_key: &self.api_key,
            date_time: wire_now().format("%Y-%m-%d %H:%M:%S").to_string(),
            history: 0,
            thermostat_id: serial,
            view_type: 2,
        };
        let res: EnergyResponse = self
            .transport
            .post(ENERGY_PATH, &[("sessionid", session)], &body)?;
        check_code(res.error_code)?;
        Ok(res.readings())
    }

    fn update(&self, serial: &str, update: ThermostatUpdate) -> Result<()> {
        let session = self.session()?;
        let body = UpdateRequest {
            api_key: &self.api_key,
            thermostat_id: serial,
            set_thermostat: update,
        };
        let res: CodeResponse = self
            .transport
            .post(UPDATE_PATH, &[("sessionid", session)], &body)?;
        check_code(res.error_code)
    }
}

impl ThermostatApi for Wd5Api {
    fn login(&mut self) -> Result<()> {
        let body = LoginRequest {
            api_key: &self.api_key,
            customer_id: self.customer_id,
            client_sw_version: CLIENT_SW_VERSION,
            email: &self.username,
            password: &self.password,
        };
        let res: LoginResponse = self.transport.post(LOGIN_PATH, &[], &body)?;
        self.session_id = Some(login_session(res)?);
        tracing::info!(user = %self.username, "logged in to WD5 API");
        Ok(())
    }

    fn get_thermostats(&self) -> Result<Vec<Thermostat>> {
        let session = self.session()?;
        let res: GroupContentsResponse = self.transport.get(
            THERMOSTATS_PATH,
            &[("sessionid", session), ("APIKEY", self.api_key.as_str())],
        )?;
        check_code(res.error_code)?;

        let mut thermostats = res.into_thermostats();
        for thermostat in &mut thermostats {
            match self.energy(session, &thermostat.serial_number) {
                Ok(readings) => thermostat.energy = readings,
                Err(e) => {
                    tracing::warn!(serial = %thermostat.serial_number, error = %e, "energy usage unavailable")
                }
            }
        }
        Ok(thermostats)
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

fn check_code(code: i64) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(ApiError::ErrorCode(code))
    }
}

/// Shared by both families: error code 1 means rejected credentials.
pub(crate) fn login_session(res: LoginResponse) -> Result<String> {
    match res.error_code {
        0 => res
            .session_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Decode("login response has no session id".into())),
        1 => Err(ApiError::Auth),
        other => Err(ApiError::ErrorCode(other)),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct LoginRequest<'a> {
    #[serde(rename = "APIKEY")]
    api_key: &'a str,
    customer_id: u32,
    #[serde(rename = "ClientSWVersion")]
    client_sw_version: u32,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct CodeResponse {
    #[serde(default)]
    error_code: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateRequest<'a> {
    #[serde(rename = "APIKEY")]
    api_key: &'a str,
    #[serde(rename = "ThermostatID")]
    thermostat_id: &'a str,
    set_thermostat: ThermostatUpdate,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EnergyRequest<'a> {
    #[serde(rename = "APIKEY")]
    api_key: &'a str,
    date_time: String,
    history: u32,
    #[serde(rename = "ThermostatID")]
    thermostat_id: &'a str,
    view_type: u32,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct EnergyResponse {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    energy_usage: Vec<EnergyPeriod>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct EnergyPeriod {
    #[serde(default)]
    usage: Vec<EnergyReading>,
}

#[derive(Deserialize, Debug, Default)]
struct EnergyReading {
    #[serde(rename = "EnergyKWattHour", default)]
    energy_kwh: f64,
}

impl EnergyResponse {
    fn readings(&self) -> Vec<f64> {
        self.energy_usage
            .iter()
            .flat_map(|period| period.usage.iter().map(|r| r.energy_kwh))
            .collect()
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct GroupContentsResponse {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    group_contents: Vec<Wd5Group>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
struct Wd5Group {
    #[serde(default)]
    thermostats: Vec<Wd5Thermostat>,
}

impl GroupContentsResponse {
    fn into_thermostats(self) -> Vec<Thermostat> {
        self.group_contents
            .into_iter()
            .flat_map(|g| g.thermostats)
            .map(Thermostat::from)
            .collect()
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase", default)]
struct Wd5Thermostat {
    serial_number: String,
    thermostat_name: String,
    #[serde(rename = "SWVersion")]
    sw_version: String,
    online: bool,
    heating: bool,
    regulation_mode: Option<u8>,
    sensor_appl: Option<u8>,
    min_setpoint: i32,
    max_setpoint: i32,
    floor_temperature: Option<i32>,
    room_temperature: Option<i32>,
    set_point_temp: Option<i32>,
    comfort_setpoint: Option<i32>,
    manual_mode_setpoint: Option<i32>,
    vacation_temperature: Option<i32>,
    frost_protection_temperature: Option<i32>,
    eco_temperature: Option<i32>,
    comfort_end_time: Option<String>,
    boost_end_time: Option<String>,
    vacation_enabled: bool,
    vacation_begin_day: Option<String>,
    vacation_end_day: Option<String>,
    adaptive: Option<bool>,
    open_window: Option<bool>,
}

impl From<Wd5Thermostat> for Thermostat {
    fn from(raw: Wd5Thermostat) -> Self {
        let mut temperatures = BTreeMap::new();
        let setpoints = [
            (RegulationMode::Schedule, raw.set_point_temp),
            (RegulationMode::Comfort, raw.comfort_setpoint),
            (RegulationMode::Manual, raw.manual_mode_setpoint),
            (RegulationMode::Vacation, raw.vacation_temperature),
            (RegulationMode::FrostProtection, raw.frost_protection_temperature),
            (RegulationMode::Boost, Some(raw.max_setpoint)),
            (RegulationMode::Eco, raw.eco_temperature),
        ];
        for (mode, value) in setpoints {
            if let Some(value) = value {
                temperatures.insert(mode, value);
            }
        }

        Thermostat {
            model: "OWD5".to_string(),
            serial_number: raw.serial_number,
            software_version: raw.sw_version,
            name: raw.thermostat_name,
            online: raw.online,
            heating: raw.heating,
            regulation_mode: raw.regulation_mode.map(RegulationMode::from_code),
            supported_regulation_modes: SUPPORTED_MODES.to_vec(),
            temperatures,
            min_temperature: raw.min_setpoint,
            max_temperature: raw.max_setpoint,
            temperature_floor: raw.floor_temperature,
            temperature_room: raw.room_temperature,
            sensor_mode: raw.sensor_appl.map(SensorMode::from_code).unwrap_or_default(),
            comfort_end_time: parse_timestamp(raw.comfort_end_time.as_deref()),
            boost_end_time: parse_timestamp(raw.boost_end_time.as_deref()),
            vacation_mode: raw.vacation_enabled,
            vacation_begin_time: parse_timestamp(raw.vacation_begin_day.as_deref()),
            vacation_end_time: parse_timestamp(raw.vacation_end_day.as_deref()),
            adaptive_mode: raw.adaptive,
            open_window_detection: raw.open_window,
            energy: Vec::new(),
        }
    }
}
