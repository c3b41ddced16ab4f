// Thermostat API client: the two OJ Microline device families behind one
// trait. The rest of the program holds a `Box<dyn ThermostatApi>` and never
// touches HTTP or vendor JSON directly.

pub mod error;
mod http;
#[cfg(test)]
pub(crate) mod mock;
mod thermostat;
mod update;
mod wd5;
mod wg4;

use chrono::NaiveDateTime;
use std::fmt;

pub use error::{ApiError, Result};
pub use thermostat::{RegulationMode, SensorMode, Thermostat};
pub use update::{wire_now, DEFAULT_COMFORT_MINUTES};
pub use wd5::{Wd5Api, WD5_HOST};
pub use wg4::{Wg4Api, WG4_HOST};

/// Customer id used by WD5 accounts that were not given a specific one.
pub const DEFAULT_CUSTOMER_ID: u32 = 99;

/// Operations the menu needs from a logged-in vendor session.
pub trait ThermostatApi {
    fn login(&mut self) -> Result<()>;

    fn get_thermostats(&self) -> Result<Vec<Thermostat>>;

    /// `temperature` is in hundredths of a degree; `duration` in minutes and
    /// only meaningful for comfort mode.
    fn set_regulation_mode(
        &self,
        resource: &Thermostat,
        mode: RegulationMode,
        temperature: Option<i32>,
        duration: Option<u32>,
    ) -> Result<()>;

    fn set_vacation_mode(
        &self,
        resource: &Thermostat,
        temperature: i32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<()>;
}

/// Device family. The label is what gets stored in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Wd5,
    Wg4,
}

impl Model {
    pub const ALL: [Model; 2] = [Model::Wd5, Model::Wg4];

    pub fn label(self) -> &'static str {
        match self {
            Model::Wd5 => "WD5 series",
            Model::Wg4 => "WG4 series",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Model::ALL.into_iter().find(|m| m.label() == label)
    }

    /// Product names covered by the family, for the configuration menu.
    pub fn products(self) -> &'static str {
        match self {
            Model::Wd5 => "OWD5, MWD5",
            Model::Wg4 => "UWG4, AWG4",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
