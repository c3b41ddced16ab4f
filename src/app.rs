// Session state for the interactive loop: the loaded configuration, the
// logged-in API client (if any), and the thermostats from the last
// successful fetch.

use crate::api::{
    ApiError, Model, RegulationMode, Thermostat, ThermostatApi, Wd5Api, Wg4Api,
};
use crate::config::{Config, ConfigError};
use crate::output::celsius;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid model selected")]
    InvalidModel,

    #[error("Missing {0} in configuration")]
    MissingCredential(&'static str),

    #[error("Invalid customer id: {0}")]
    InvalidCustomerId(String),

    #[error("API not initialized. Please configure and connect first.")]
    NotConnected,

    #[error("Thermostat {0} is no longer known. Refresh and try again.")]
    UnknownThermostat(String),

    #[error("Temperature must be between {}°C and {}°C", degrees(.min), degrees(.max))]
    TemperatureOutOfRange { value: i32, min: i32, max: i32 },

    #[error(transparent)]
    Api(#[from] ApiError),
}

fn degrees(value: &i32) -> String {
    celsius(*value)
}

/// One change request for a thermostat.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Regulation {
        mode: RegulationMode,
        temperature: Option<i32>,
        duration: Option<u32>,
    },
    Vacation {
        temperature: i32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Command {
    pub fn temperature(&self) -> Option<i32> {
        match self {
            Command::Regulation { temperature, .. } => *temperature,
            Command::Vacation { temperature, .. } => Some(*temperature),
        }
    }

    pub fn mode(&self) -> RegulationMode {
        match self {
            Command::Regulation { mode, .. } => *mode,
            Command::Vacation { .. } => RegulationMode::Vacation,
        }
    }
}

/// Reject a setpoint outside the band the thermostat reports.
pub fn check_band(thermostat: &Thermostat, temperature: i32) -> Result<(), SessionError> {
    if thermostat.in_band(temperature) {
        Ok(())
    } else {
        Err(SessionError::TemperatureOutOfRange {
            value: temperature,
            min: thermostat.min_temperature,
            max: thermostat.max_temperature,
        })
    }
}

/// Build the client for the configured device family. Does not log in.
pub fn build_api(config: &Config, timeout: Duration) -> Result<Box<dyn ThermostatApi>, SessionError> {
    let model = config
        .model
        .as_deref()
        .and_then(Model::from_label)
        .ok_or(SessionError::InvalidModel)?;
    let username = config
        .username
        .as_deref()
        .ok_or(SessionError::MissingCredential("username"))?;
    let password = config
        .password
        .as_deref()
        .ok_or(SessionError::MissingCredential("password"))?;
    let host = config.host.as_deref();

    let api: Box<dyn ThermostatApi> = match model {
        Model::Wd5 => {
            let api_key = config
                .api_key
                .as_deref()
                .ok_or(SessionError::MissingCredential("api_key"))?;
            let customer_id = match config.customer_id.as_deref() {
                None => crate::api::DEFAULT_CUSTOMER_ID,
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| SessionError::InvalidCustomerId(raw.to_string()))?,
            };
            Box::new(Wd5Api::new(username, password, api_key, customer_id, host, timeout)?)
        }
        Model::Wg4 => Box::new(Wg4Api::new(username, password, host, timeout)?),
    };
    tracing::debug!(%model, host = host.unwrap_or("default"), "API client built");
    Ok(api)
}

pub struct App {
    pub config: Config,
    pub config_path: PathBuf,
    timeout: Duration,
    api: Option<Box<dyn ThermostatApi>>,
    thermostats: BTreeMap<String, Thermostat>,
}

impl App {
    /// Load the configuration from `config_path`; nothing is contacted yet.
    pub fn new(config_path: PathBuf, timeout: Duration) -> Result<Self, ConfigError> {
        let config = Config::load(&config_path)?;
        Ok(App {
            config,
            config_path,
            timeout,
            api: None,
            thermostats: BTreeMap::new(),
        })
    }

    pub fn save_config(&self) -> Result<(), ConfigError> {
        self.config.save(&self.config_path)
    }

    pub fn is_connected(&self) -> bool {
        self.api.is_some()
    }

    /// Build a client from the current configuration and log in. The previous
    /// session, if any, is kept when this fails.
    pub fn connect(&mut self) -> Result<(), SessionError> {
        let api = build_api(&self.config, self.timeout)?;
        self.attach(api)
    }

    /// Log in with an already built client and make it the session's.
    pub fn attach(&mut self, mut api: Box<dyn ThermostatApi>) -> Result<(), SessionError> {
        api.login()?;
        self.api = Some(api);
        Ok(())
    }

    /// Replace the device mapping with a fresh fetch. On error the previous
    /// mapping is left as it was.
    pub fn refresh(&mut self) -> Result<usize, SessionError> {
        let api = self.api.as_ref().ok_or(SessionError::NotConnected)?;
        let fetched = api.get_thermostats()?;
        self.thermostats = fetched
            .into_iter()
            .map(|t| (t.serial_number.clone(), t))
            .collect();
        tracing::info!(count = self.thermostats.len(), "thermostats refreshed");
        Ok(self.thermostats.len())
    }

    pub fn thermostats(&self) -> impl Iterator<Item = &Thermostat> {
        self.thermostats.values()
    }

    pub fn thermostat(&self, serial: &str) -> Option<&Thermostat> {
        self.thermostats.get(serial)
    }

    pub fn has_thermostats(&self) -> bool {
        !self.thermostats.is_empty()
    }

    /// Issue one command. Any temperature it carries is checked against the
    /// device band first; nothing is sent when the check fails.
    pub fn send_command(&self, serial: &str, command: &Command) -> Result<(), SessionError> {
        let api = self.api.as_ref().ok_or(SessionError::NotConnected)?;
        let thermostat = self
            .thermostats
            .get(serial)
            .ok_or_else(|| SessionError::UnknownThermostat(serial.to_string()))?;
        if let Some(temperature) = command.temperature() {
            check_band(thermostat, temperature)?;
        }

        tracing::info!(serial, mode = %command.mode(), "sending command");
        match command {
            Command::Regulation {
                mode,
                temperature,
                duration,
            } => api.set_regulation_mode(thermostat, *mode, *temperature, *duration)?,
            Command::Vacation {
                temperature,
                start,
                end,
            } => api.set_vacation_mode(thermostat, *temperature, *start, *end)?,
        }
        Ok(())
    }
}
