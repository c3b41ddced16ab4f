// Entrypoint for the thermostat console.
// - Parses flags, sets up logging, loads the config and hands over to the
//   menu loop in `ui`.
// - An interrupt ends the program normally, whether it arrives as a signal
//   or as Ctrl-C read by a prompt; any other error that reaches here is
//   printed and exits with status 1.

use anyhow::Context;
use clap::Parser;
use ojm_thermostat::app::App;
use ojm_thermostat::config::default_config_path;
use ojm_thermostat::ui::{self, MenuOptions, Terminal};
use ojm_thermostat::{logging, output};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ojm-thermostat")]
#[command(version, about = "Interactive test console for OJ Microline WiFi thermostats")]
struct Cli {
    /// Path to the key=value configuration file
    #[arg(short, long, env = "OJM_THERMOSTAT_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP timeout for API calls, in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Seconds to wait after a command before re-fetching thermostats
    #[arg(long, default_value_t = 2)]
    refresh_delay: u64,

    /// Log in with the saved configuration before showing the menu
    #[arg(long)]
    connect: bool,

    /// Increase log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const TERMINATED: &str = "\nApplication terminated by user.";

/// SIGINT outside a prompt read (during an HTTP call, the propagation wait,
/// or from `kill -INT`) ends the process here with the same message and
/// status as an interrupted prompt.
fn install_interrupt_handler() {
    let installed = ctrlc::set_handler(|| {
        let _ = crossterm::execute!(std::io::stderr(), crossterm::cursor::Show);
        println!("{}", TERMINATED);
        std::process::exit(0);
    });
    if let Err(e) = installed {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    tracing::info!(path = %config_path.display(), "using config file");

    let mut app = App::new(config_path, Duration::from_secs(cli.timeout))
        .context("Failed to load configuration")?;
    if cli.connect {
        ui::connect(&mut app);
    }

    let options = MenuOptions {
        refresh_delay: Duration::from_secs(cli.refresh_delay),
    };
    ui::main_menu(&mut app, &mut Terminal, &options)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    install_interrupt_handler();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if ui::is_interrupt(&e) => {
            println!("{}", TERMINATED);
            ExitCode::SUCCESS
        }
        Err(e) => {
            output::print_error(&format!("Unexpected error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}
