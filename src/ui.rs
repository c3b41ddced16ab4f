// UI layer: the main menu loop and one handler per menu entry. Prompts go
// through the `Prompt` trait; `Terminal` implements it with `dialoguer`, the
// tests implement it with a script of answers.

use crate::api::{self, ApiError, Model, RegulationMode, Thermostat};
use crate::app::{check_band, App, Command, SessionError};
use crate::input::{self, InputError};
use crate::output::{
    celsius, format_details, format_summary, print_error, print_info, print_success,
    print_warning,
};
use anyhow::Result;
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Source of answers for the menu and the handlers.
pub trait Prompt {
    /// Pick one of `items`; `None` when the user backs out.
    fn select(&mut self, title: &str, items: &[String], default: usize) -> io::Result<Option<usize>>;

    /// Free text; empty answers are allowed and mean "default" or "cancel".
    fn input(&mut self, prompt: &str) -> io::Result<String>;

    fn password(&mut self, prompt: &str) -> io::Result<String>;
}

/// Interactive terminal prompts.
///
/// Note: `Select` is keyboard-driven (arrow keys + Enter, Esc to back out).
/// Ctrl-C at any prompt comes back as `io::ErrorKind::Interrupted`.
pub struct Terminal;

impl Prompt for Terminal {
    fn select(&mut self, title: &str, items: &[String], default: usize) -> io::Result<Option<usize>> {
        Select::new()
            .with_prompt(title)
            .items(items)
            .default(default)
            .interact_opt()
    }

    fn input(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
    }

    fn password(&mut self, prompt: &str) -> io::Result<String> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
    }
}

pub struct MenuOptions {
    /// Wait between a successful command and the re-fetch. The vendor gives
    /// no change confirmation, so this is a guess at propagation time.
    pub refresh_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Configure,
    Show,
    Details,
    SetTemperature,
    SetMode,
    Refresh,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 7] = [
        MenuChoice::Configure,
        MenuChoice::Show,
        MenuChoice::Details,
        MenuChoice::SetTemperature,
        MenuChoice::SetMode,
        MenuChoice::Refresh,
        MenuChoice::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Configure => "Configure API Connection",
            MenuChoice::Show => "Show Thermostats",
            MenuChoice::Details => "View Thermostat Details",
            MenuChoice::SetTemperature => "Set Temperature",
            MenuChoice::SetMode => "Set Preset Mode",
            MenuChoice::Refresh => "Refresh Thermostat Data",
            MenuChoice::Exit => "Exit",
        }
    }
}

/// Whether an error bubbling out of the menu is the user pressing Ctrl-C.
pub fn is_interrupt(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .map_or(false, |e| e.kind() == io::ErrorKind::Interrupted)
    })
}

/// Main interactive menu. Runs until the user picks "Exit"; prompt I/O
/// errors (including Ctrl-C) end the loop and are returned to the caller.
pub fn main_menu(app: &mut App, prompt: &mut dyn Prompt, options: &MenuOptions) -> Result<()> {
    let items: Vec<String> = MenuChoice::ALL
        .iter()
        .enumerate()
        .map(|(i, choice)| format!("{}. {}", i + 1, choice.label()))
        .collect();

    loop {
        println!("\n=== Thermostat Test Application ===");
        let Some(index) = prompt.select("Enter choice", &items, 0)? else {
            continue;
        };
        let Some(choice) = MenuChoice::ALL.get(index).copied() else {
            print_error("Invalid choice. Please try again.");
            continue;
        };
        tracing::debug!(?choice, "menu");

        match choice {
            MenuChoice::Configure => configure_api(app, prompt)?,
            MenuChoice::Show => {
                if ensure_thermostats(app) {
                    show_thermostats(app);
                }
            }
            MenuChoice::Details => {
                if ensure_thermostats(app) {
                    if let Some(t) = select_thermostat(app, prompt)? {
                        print!("{}", format_details(&t));
                    }
                }
            }
            MenuChoice::SetTemperature => {
                if ensure_thermostats(app) {
                    if let Some(t) = select_thermostat(app, prompt)? {
                        set_temperature(app, prompt, &t, options)?;
                    }
                }
            }
            MenuChoice::SetMode => {
                if ensure_thermostats(app) {
                    if let Some(t) = select_thermostat(app, prompt)? {
                        set_preset_mode(app, prompt, &t, options)?;
                    }
                }
            }
            MenuChoice::Refresh => {
                if require_connection(app) {
                    print_info("Refreshing thermostat data...");
                    if refresh(app) {
                        print_success("Data refreshed.");
                    }
                }
            }
            MenuChoice::Exit => {
                println!("Exiting application.");
                return Ok(());
            }
        }
    }
}

/// Print a session error the way the user should see it: the four client
/// categories get fixed wording, everything else its own message.
pub fn report_session_error(context: &str, err: &SessionError) {
    tracing::debug!(error = ?err, context, "operation failed");
    match err {
        SessionError::Api(ApiError::Auth) => {
            print_error("Authentication error: Invalid credentials")
        }
        SessionError::Api(ApiError::Connection(_)) => {
            print_error("Connection error: Could not connect to the API")
        }
        SessionError::Api(ApiError::Timeout) => {
            print_error("Timeout error: The API request timed out")
        }
        SessionError::Api(other) => print_error(&format!("{}: {}", context, other)),
        other => print_error(&other.to_string()),
    }
}

/// Log in with the current configuration.
pub fn connect(app: &mut App) -> bool {
    let spinner = spinner("Connecting...");
    let result = app.connect();
    spinner.finish_and_clear();
    match result {
        Ok(()) => {
            print_success("Successfully connected to the API");
            true
        }
        Err(e) => {
            report_session_error("Error initializing API", &e);
            false
        }
    }
}

fn refresh(app: &mut App) -> bool {
    match app.refresh() {
        Ok(_) => true,
        Err(e) => {
            report_session_error("Error fetching thermostats", &e);
            false
        }
    }
}

fn require_connection(app: &App) -> bool {
    if !app.is_connected() {
        print_warning(&SessionError::NotConnected.to_string());
        return false;
    }
    true
}

/// Connected check plus a first fetch when nothing has been fetched yet.
fn ensure_thermostats(app: &mut App) -> bool {
    if !require_connection(app) {
        return false;
    }
    if !app.has_thermostats() {
        refresh(app);
    }
    true
}

fn show_thermostats(app: &App) {
    if !app.has_thermostats() {
        print_warning("No thermostats found. Try fetching them first.");
        return;
    }
    println!("\n=== Thermostats ===");
    for (index, t) in app.thermostats().enumerate() {
        println!("{}", format_summary(index + 1, t));
    }
}

fn configure_api(app: &mut App, prompt: &mut dyn Prompt) -> io::Result<()> {
    println!("\n=== API Configuration ===");
    let items: Vec<String> = Model::ALL
        .iter()
        .map(|m| format!("{} ({})", m.label(), m.products()))
        .collect();
    let model = match prompt.select("Select thermostat model", &items, 0)? {
        Some(index) => Model::ALL.get(index).copied(),
        None => None,
    };
    let Some(model) = model else {
        print_warning("Invalid choice. Configuration cancelled.");
        return Ok(());
    };

    app.config.model = Some(model.label().to_string());
    app.config.username = non_empty(prompt.input("Username")?);
    app.config.password = non_empty(prompt.password("Password")?);

    if model == Model::Wd5 {
        app.config.api_key = non_empty(prompt.input("API Key")?);
        let customer_id = prompt.input("Customer ID (default: 99)")?;
        app.config.customer_id = Some(
            non_empty(customer_id).unwrap_or_else(|| crate::config::DEFAULT_CUSTOMER_ID.to_string()),
        );
    }

    app.config.host = non_empty(prompt.input("Host (optional, leave blank for default)")?);

    match app.save_config() {
        Ok(()) => print_success("Configuration saved."),
        Err(e) => print_error(&e.to_string()),
    }

    println!("Testing connection...");
    if connect(app) {
        refresh(app);
    }
    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pick a thermostat from the current mapping. With exactly one thermostat
/// it is returned without asking.
fn select_thermostat(app: &App, prompt: &mut dyn Prompt) -> io::Result<Option<Thermostat>> {
    if !app.has_thermostats() {
        print_warning("No thermostats found. Try fetching them first.");
        return Ok(None);
    }
    show_thermostats(app);

    let thermostats: Vec<&Thermostat> = app.thermostats().collect();
    if let [only] = thermostats.as_slice() {
        return Ok(Some((*only).clone()));
    }

    let items: Vec<String> = thermostats
        .iter()
        .map(|t| format!("{} ({})", t.name, t.serial_number))
        .collect();
    match prompt.select("Select thermostat", &items, 0)? {
        None => Ok(None),
        Some(index) => match thermostats.get(index) {
            Some(t) => Ok(Some((*t).clone())),
            None => {
                print_error(&InputError::Selection.to_string());
                Ok(None)
            }
        },
    }
}

/// Why a handler stopped before sending anything.
#[derive(Error, Debug)]
enum HandlerError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl HandlerError {
    /// User-facing problems are printed and swallowed; prompt I/O errors go up.
    fn report(self, context: &str) -> io::Result<()> {
        match self {
            HandlerError::Input(e) => print_error(&e.to_string()),
            HandlerError::Session(e) => report_session_error(context, &e),
            HandlerError::Io(e) => return Err(e),
        }
        Ok(())
    }
}

fn set_temperature(
    app: &mut App,
    prompt: &mut dyn Prompt,
    t: &Thermostat,
    options: &MenuOptions,
) -> io::Result<()> {
    const CONTEXT: &str = "Error setting temperature";
    let command = match temperature_command(prompt, t) {
        Ok(Some(command)) => command,
        Ok(None) => {
            println!("Operation cancelled.");
            return Ok(());
        }
        Err(e) => return e.report(CONTEXT),
    };
    let message = format!(
        "Temperature set to {}°C in {} mode",
        celsius(command.temperature().unwrap_or_default()),
        command.mode()
    );
    send_and_refresh(app, &t.serial_number, &command, &message, CONTEXT, options);
    Ok(())
}

fn temperature_command(
    prompt: &mut dyn Prompt,
    t: &Thermostat,
) -> Result<Option<Command>, HandlerError> {
    println!("\nCurrent target temperature: {}°C", celsius(t.target_temperature()));
    println!(
        "Valid range: {}°C - {}°C",
        celsius(t.min_temperature),
        celsius(t.max_temperature)
    );

    let raw = prompt.input("Enter new temperature in °C (or press Enter to cancel)")?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let temperature = input::parse_celsius(&raw)?;
    check_band(t, temperature)?;

    let modes = vec![
        "Manual (permanent)".to_string(),
        "Comfort (temporary)".to_string(),
    ];
    let command = match prompt.select("Select regulation mode", &modes, 0)? {
        None => return Ok(None),
        Some(0) => Command::Regulation {
            mode: RegulationMode::Manual,
            temperature: Some(temperature),
            duration: None,
        },
        Some(1) => {
            let raw = prompt.input("Enter duration in minutes (default: 60)")?;
            Command::Regulation {
                mode: RegulationMode::Comfort,
                temperature: Some(temperature),
                duration: Some(input::duration_or_default(&raw)?),
            }
        }
        Some(_) => return Err(InputError::Selection.into()),
    };
    Ok(Some(command))
}

fn set_preset_mode(
    app: &mut App,
    prompt: &mut dyn Prompt,
    t: &Thermostat,
    options: &MenuOptions,
) -> io::Result<()> {
    const CONTEXT: &str = "Error setting mode";
    let command = match mode_command(prompt, t) {
        Ok(Some(command)) => command,
        Ok(None) => {
            println!("Operation cancelled.");
            return Ok(());
        }
        Err(e) => return e.report(CONTEXT),
    };
    let message = format!("Mode set to {}", command.mode());
    send_and_refresh(app, &t.serial_number, &command, &message, CONTEXT, options);
    Ok(())
}

/// Only the modes the thermostat lists as supported are offered.
fn mode_command(prompt: &mut dyn Prompt, t: &Thermostat) -> Result<Option<Command>, HandlerError> {
    println!("\nAvailable preset modes:");
    let items: Vec<String> = t
        .supported_regulation_modes
        .iter()
        .map(ToString::to_string)
        .collect();
    let Some(index) = prompt.select("Select mode", &items, 0)? else {
        return Ok(None);
    };
    let mode = *t
        .supported_regulation_modes
        .get(index)
        .ok_or(InputError::Selection)?;

    let target_prompt = format!(
        "Enter temperature in °C (default: {}°C)",
        celsius(t.target_temperature())
    );
    let command = match mode {
        RegulationMode::Comfort => {
            let duration = input::duration_or_default(
                &prompt.input("Enter duration in minutes (default: 60)")?,
            )?;
            let temperature =
                input::celsius_or(&prompt.input(&target_prompt)?, t.target_temperature())?;
            Command::Regulation {
                mode,
                temperature: Some(temperature),
                duration: Some(duration),
            }
        }
        RegulationMode::Manual => {
            let temperature =
                input::celsius_or(&prompt.input(&target_prompt)?, t.target_temperature())?;
            Command::Regulation {
                mode,
                temperature: Some(temperature),
                duration: None,
            }
        }
        RegulationMode::Vacation => {
            let raw = prompt.input("Enter vacation start date (YYYY-MM-DD, default: today)")?;
            let start = if raw.trim().is_empty() {
                api::wire_now()
            } else {
                input::parse_date(&raw)?
            };
            let raw = prompt.input("Enter vacation end date (YYYY-MM-DD)")?;
            if raw.trim().is_empty() {
                return Err(InputError::MissingEndDate.into());
            }
            let end = input::parse_date(&raw)?;
            let temperature = input::celsius_or(
                &prompt.input("Enter temperature in °C (default: 15°C)")?,
                input::DEFAULT_VACATION_TEMPERATURE,
            )?;
            Command::Vacation {
                temperature,
                start,
                end,
            }
        }
        _ => Command::Regulation {
            mode,
            temperature: None,
            duration: None,
        },
    };
    Ok(Some(command))
}

fn send_and_refresh(
    app: &mut App,
    serial: &str,
    command: &Command,
    message: &str,
    context: &str,
    options: &MenuOptions,
) {
    if let Err(e) = app.send_command(serial, command) {
        report_session_error(context, &e);
        return;
    }
    print_success(message);
    wait_for_propagation(options.refresh_delay);
    refresh(app);
}

fn wait_for_propagation(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    let spinner = spinner("Waiting for changes to propagate...");
    thread::sleep(delay);
    spinner.finish_and_clear();
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{thermostat, MockCall};
    use crate::app::tests::connected_app;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    enum Answer {
        Choice(Option<usize>),
        Text(&'static str),
    }

    /// Replays answers in order. Running out of answers is an error, so a
    /// test fails if a handler prompts more than expected.
    struct Script(VecDeque<Answer>);

    impl Script {
        fn new(answers: Vec<Answer>) -> Self {
            Script(answers.into())
        }

        fn is_done(&self) -> bool {
            self.0.is_empty()
        }

        fn next(&mut self) -> io::Result<Answer> {
            self.0
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }
    }

    impl Prompt for Script {
        fn select(&mut self, _: &str, _: &[String], _: usize) -> io::Result<Option<usize>> {
            match self.next()? {
                Answer::Choice(choice) => Ok(choice),
                Answer::Text(_) => panic!("expected a choice"),
            }
        }

        fn input(&mut self, _: &str) -> io::Result<String> {
            match self.next()? {
                Answer::Text(text) => Ok(text.to_string()),
                Answer::Choice(_) => panic!("expected text"),
            }
        }

        fn password(&mut self, prompt: &str) -> io::Result<String> {
            self.input(prompt)
        }
    }

    /// Errors on the first prompt as if the user pressed Ctrl-C.
    struct Interrupted;

    impl Prompt for Interrupted {
        fn select(&mut self, _: &str, _: &[String], _: usize) -> io::Result<Option<usize>> {
            Err(io::Error::new(io::ErrorKind::Interrupted, "read interrupted"))
        }

        fn input(&mut self, _: &str) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::Interrupted, "read interrupted"))
        }

        fn password(&mut self, _: &str) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::Interrupted, "read interrupted"))
        }
    }

    fn no_delay() -> MenuOptions {
        MenuOptions {
            refresh_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_single_thermostat_selected_without_prompt() {
        let (app, _state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let mut script = Script::new(vec![]);
        let selected = select_thermostat(&app, &mut script).unwrap();
        assert_eq!(selected.map(|t| t.serial_number), Some("A1".to_string()));
    }

    #[test]
    fn test_select_among_several() {
        let (app, _state, _dir) =
            connected_app(vec![thermostat("A1", "Hall"), thermostat("B2", "Kitchen")]);

        let mut script = Script::new(vec![Answer::Choice(Some(1))]);
        let selected = select_thermostat(&app, &mut script).unwrap();
        assert_eq!(selected.map(|t| t.serial_number), Some("B2".to_string()));

        let mut script = Script::new(vec![Answer::Choice(Some(2))]);
        assert_eq!(select_thermostat(&app, &mut script).unwrap(), None);

        let mut script = Script::new(vec![Answer::Choice(None)]);
        assert_eq!(select_thermostat(&app, &mut script).unwrap(), None);
    }

    #[test]
    fn test_set_temperature_manual() {
        let (mut app, state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let t = app.thermostat("A1").cloned().unwrap();
        let mut script = Script::new(vec![Answer::Text("22.5"), Answer::Choice(Some(0))]);

        set_temperature(&mut app, &mut script, &t, &no_delay()).unwrap();
        assert!(script.is_done());
        assert_eq!(
            state.commands(),
            vec![MockCall::SetRegulationMode {
                serial: "A1".into(),
                mode: RegulationMode::Manual,
                temperature: Some(2250),
                duration: None,
            }]
        );
        // command, then the re-fetch
        assert_eq!(state.calls.borrow().last(), Some(&MockCall::GetThermostats));
    }

    #[test]
    fn test_set_temperature_comfort_default_duration() {
        let (mut app, state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let t = app.thermostat("A1").cloned().unwrap();
        let mut script = Script::new(vec![
            Answer::Text("19"),
            Answer::Choice(Some(1)),
            Answer::Text(""),
        ]);

        set_temperature(&mut app, &mut script, &t, &no_delay()).unwrap();
        assert_eq!(
            state.commands(),
            vec![MockCall::SetRegulationMode {
                serial: "A1".into(),
                mode: RegulationMode::Comfort,
                temperature: Some(1900),
                duration: Some(60),
            }]
        );
    }

    #[test]
    fn test_set_temperature_out_of_band_stops_before_mode_prompt() {
        let (mut app, state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let t = app.thermostat("A1").cloned().unwrap();
        let mut script = Script::new(vec![Answer::Text("40")]);

        set_temperature(&mut app, &mut script, &t, &no_delay()).unwrap();
        assert!(script.is_done());
        assert!(state.commands().is_empty());
    }

    #[test]
    fn test_set_temperature_bad_number_and_cancel() {
        let (mut app, state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let t = app.thermostat("A1").cloned().unwrap();

        let mut script = Script::new(vec![Answer::Text("warm")]);
        set_temperature(&mut app, &mut script, &t, &no_delay()).unwrap();

        let mut script = Script::new(vec![Answer::Text("")]);
        set_temperature(&mut app, &mut script, &t, &no_delay()).unwrap();

        assert!(state.commands().is_empty());
    }

    #[test]
    fn test_mode_menu_rejects_out_of_range_choice() {
        let (mut app, state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let t = app.thermostat("A1").cloned().unwrap();
        let calls_before = state.calls.borrow().len();

        // The mock thermostat supports five modes.
        let mut script = Script::new(vec![Answer::Choice(Some(5))]);
        set_preset_mode(&mut app, &mut script, &t, &no_delay()).unwrap();

        assert!(script.is_done());
        assert_eq!(state.calls.borrow().len(), calls_before);
    }

    #[test]
    fn test_mode_menu_offers_supported_modes_only() {
        let mut t = thermostat("A1", "Hall");
        t.supported_regulation_modes = vec![RegulationMode::Schedule, RegulationMode::Eco];

        let mut script = Script::new(vec![Answer::Choice(Some(1))]);
        let command = mode_command(&mut script, &t).unwrap();
        assert_eq!(
            command,
            Some(Command::Regulation {
                mode: RegulationMode::Eco,
                temperature: None,
                duration: None,
            })
        );

        let mut script = Script::new(vec![Answer::Choice(Some(2))]);
        assert!(matches!(
            mode_command(&mut script, &t),
            Err(HandlerError::Input(InputError::Selection))
        ));
    }

    #[test]
    fn test_comfort_mode_uses_target_as_default() {
        let (mut app, state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let t = app.thermostat("A1").cloned().unwrap();
        // Comfort is the second supported mode.
        let mut script = Script::new(vec![
            Answer::Choice(Some(1)),
            Answer::Text("30"),
            Answer::Text(""),
        ]);

        set_preset_mode(&mut app, &mut script, &t, &no_delay()).unwrap();
        assert_eq!(
            state.commands(),
            vec![MockCall::SetRegulationMode {
                serial: "A1".into(),
                mode: RegulationMode::Comfort,
                temperature: Some(2100),
                duration: Some(30),
            }]
        );
    }

    #[test]
    fn test_vacation_mode() {
        let (mut app, state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let t = app.thermostat("A1").cloned().unwrap();
        let mut script = Script::new(vec![
            Answer::Choice(Some(3)),
            Answer::Text("2024-07-01"),
            Answer::Text("2024-07-14"),
            Answer::Text(""),
        ]);

        set_preset_mode(&mut app, &mut script, &t, &no_delay()).unwrap();
        assert_eq!(
            state.commands(),
            vec![MockCall::SetVacationMode {
                serial: "A1".into(),
                temperature: 1500,
                start: input::parse_date("2024-07-01").unwrap(),
                end: input::parse_date("2024-07-14").unwrap(),
            }]
        );
    }

    #[test]
    fn test_vacation_start_defaults_to_wire_clock() {
        let (mut app, state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let t = app.thermostat("A1").cloned().unwrap();
        let mut script = Script::new(vec![
            Answer::Choice(Some(3)),
            Answer::Text(""),
            Answer::Text("2099-07-14"),
            Answer::Text("16"),
        ]);

        let before = api::wire_now();
        set_preset_mode(&mut app, &mut script, &t, &no_delay()).unwrap();
        let after = api::wire_now();

        match state.commands().as_slice() {
            [MockCall::SetVacationMode {
                start, temperature, ..
            }] => {
                assert!(before <= *start && *start <= after);
                assert_eq!(*temperature, 1600);
            }
            other => panic!("unexpected calls: {:?}", other),
        }
    }

    #[test]
    fn test_vacation_requires_end_date() {
        let (mut app, state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let t = app.thermostat("A1").cloned().unwrap();
        let mut script = Script::new(vec![
            Answer::Choice(Some(3)),
            Answer::Text(""),
            Answer::Text(""),
        ]);

        set_preset_mode(&mut app, &mut script, &t, &no_delay()).unwrap();
        assert!(script.is_done());
        assert!(state.commands().is_empty());
    }

    #[test]
    fn test_menu_requires_connection() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(dir.path().join("config.txt"), Duration::from_secs(1)).unwrap();
        let mut script = Script::new(vec![
            Answer::Choice(Some(1)),
            Answer::Choice(Some(3)),
            Answer::Choice(Some(5)),
            Answer::Choice(Some(6)),
        ]);

        main_menu(&mut app, &mut script, &no_delay()).unwrap();
        assert!(script.is_done());
    }

    #[test]
    fn test_menu_refresh_then_exit() {
        let (mut app, state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        *state.devices.borrow_mut() = vec![thermostat("A1", "Hall"), thermostat("B2", "Kitchen")];
        let mut script = Script::new(vec![
            Answer::Choice(None),
            Answer::Choice(Some(5)),
            Answer::Choice(Some(6)),
        ]);

        main_menu(&mut app, &mut script, &no_delay()).unwrap();
        assert_eq!(app.thermostats().count(), 2);
    }

    #[test]
    fn test_interrupt_ends_menu() {
        let (mut app, _state, _dir) = connected_app(vec![thermostat("A1", "Hall")]);
        let err = main_menu(&mut app, &mut Interrupted, &no_delay()).unwrap_err();
        assert!(is_interrupt(&err));

        let other = anyhow::anyhow!("boom");
        assert!(!is_interrupt(&other));
    }

    #[test]
    fn test_configure_saves_and_reports_connection_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.txt");
        let mut app = App::new(path.clone(), Duration::from_secs(2)).unwrap();
        let mut script = Script::new(vec![
            Answer::Choice(Some(1)),
            Answer::Text("me@example.com"),
            Answer::Text("secret"),
            Answer::Text("http://127.0.0.1:9"),
        ]);

        configure_api(&mut app, &mut script).unwrap();
        assert!(script.is_done());
        assert!(!app.is_connected());

        let saved = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            saved,
            "model=WG4 series\nusername=me@example.com\npassword=secret\ncustomer_id=99\nhost=http://127.0.0.1:9\n"
        );
    }

    #[test]
    fn test_configure_cancelled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.txt");
        let mut app = App::new(path.clone(), Duration::from_secs(1)).unwrap();
        let mut script = Script::new(vec![Answer::Choice(None)]);

        configure_api(&mut app, &mut script).unwrap();
        assert!(!path.exists());
        assert_eq!(app.config.model, None);
    }
}
