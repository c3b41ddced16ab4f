//! In-memory `ThermostatApi` and a canned HTTP server for unit tests.

use super::{ApiError, RegulationMode, Result, Thermostat, ThermostatApi};
use chrono::NaiveDateTime;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Login,
    GetThermostats,
    SetRegulationMode {
        serial: String,
        mode: RegulationMode,
        temperature: Option<i32>,
        duration: Option<u32>,
    },
    SetVacationMode {
        serial: String,
        temperature: i32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// State shared between a test and the boxed mock it handed to the app.
#[derive(Default)]
pub struct MockState {
    pub devices: RefCell<Vec<Thermostat>>,
    pub fail_fetch: Cell<bool>,
    pub fail_login: Cell<bool>,
    pub calls: RefCell<Vec<MockCall>>,
}

impl MockState {
    pub fn commands(&self) -> Vec<MockCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !matches!(c, MockCall::Login | MockCall::GetThermostats))
            .cloned()
            .collect()
    }
}

pub struct MockApi {
    pub state: Rc<MockState>,
}

impl MockApi {
    pub fn new(devices: Vec<Thermostat>) -> (Self, Rc<MockState>) {
        let state = Rc::new(MockState::default());
        *state.devices.borrow_mut() = devices;
        (MockApi { state: Rc::clone(&state) }, state)
    }
}

impl ThermostatApi for MockApi {
    fn login(&mut self) -> Result<()> {
        self.state.calls.borrow_mut().push(MockCall::Login);
        if self.state.fail_login.get() {
            return Err(ApiError::Auth);
        }
        Ok(())
    }

    fn get_thermostats(&self) -> Result<Vec<Thermostat>> {
        self.state.calls.borrow_mut().push(MockCall::GetThermostats);
        if self.state.fail_fetch.get() {
            return Err(ApiError::Timeout);
        }
        Ok(self.state.devices.borrow().clone())
    }

    fn set_regulation_mode(
        &self,
        resource: &Thermostat,
        mode: RegulationMode,
        temperature: Option<i32>,
        duration: Option<u32>,
    ) -> Result<()> {
        self.state.calls.borrow_mut().push(MockCall::SetRegulationMode {
            serial: resource.serial_number.clone(),
            mode,
            temperature,
            duration,
        });
        Ok(())
    }

    fn set_vacation_mode(
        &self,
        resource: &Thermostat,
        temperature: i32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<()> {
        self.state.calls.borrow_mut().push(MockCall::SetVacationMode {
            serial: resource.serial_number.clone(),
            temperature,
            start,
            end,
        });
        Ok(())
    }
}

/// A WD5-like thermostat in manual mode at 21 °C, band 5–35 °C.
pub fn thermostat(serial: &str, name: &str) -> Thermostat {
    let mut temperatures = BTreeMap::new();
    temperatures.insert(RegulationMode::Manual, 2100);
    temperatures.insert(RegulationMode::Comfort, 2300);
    Thermostat {
        model: "OWD5".to_string(),
        serial_number: serial.to_string(),
        software_version: "1072".to_string(),
        name: name.to_string(),
        online: true,
        heating: false,
        regulation_mode: Some(RegulationMode::Manual),
        supported_regulation_modes: vec![
            RegulationMode::Schedule,
            RegulationMode::Comfort,
            RegulationMode::Manual,
            RegulationMode::Vacation,
            RegulationMode::Boost,
        ],
        temperatures,
        min_temperature: 500,
        max_temperature: 3500,
        temperature_room: Some(2050),
        ..Default::default()
    }
}

/// Local HTTP server answering one connection per canned `(status, body)`
/// pair, in order. Returns its base URL and the request lines it has seen.
pub fn serve(replies: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    thread::spawn(move || {
        for (status, body) in replies {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            if let Some(line) = read_request(&mut stream) {
                log.lock().unwrap().push(line);
            }
            let reply = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(reply.as_bytes());
        }
    });
    (base, seen)
}

/// Consume one request (headers and body) and return its request line.
fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;

    let mut length = 0;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).ok()? == 0 {
            break;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0; length];
    reader.read_exact(&mut body).ok()?;
    Some(request_line.trim_end().to_string())
}
