// Library root
// -----------
// The binary (`main.rs`) wires these modules into the interactive console.
//
// Module responsibilities:
// - `api`: OJ Microline thermostat clients (WD5 and WG4 families) behind the
//   `ThermostatApi` trait, plus the `Thermostat` record they return.
// - `config`: the key=value credentials file.
// - `app`: session state: config, logged-in client, last fetched thermostats.
// - `input` / `output`: parsing what the user types, rendering what they see.
// - `ui`: the menu loop and its handlers, built on the `Prompt` trait.
// - `logging`: tracing subscriber setup.
pub mod api;
pub mod app;
pub mod config;
pub mod input;
pub mod logging;
pub mod output;
pub mod ui;
