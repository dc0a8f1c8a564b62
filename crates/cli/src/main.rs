// mousespeed - view and adjust the desktop pointer speed
// Interactive panel by default; get/set/reset for scripts

mod exit_codes;
mod logging;
mod tui;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::debug;
use serde::Serialize;

use mousespeed_config::Settings;
use mousespeed_core::{
    CommandFailure, GsettingsStore, PreferenceKey, PreferenceValue, SpeedController, StoreError,
};

use exit_codes::{store_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "mousespeed")]
#[command(about = "View and adjust the desktop pointer speed")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides for the settings file.
#[derive(Args)]
struct StoreArgs {
    /// Program used to read and write the preference
    #[arg(long, global = true, env = "MOUSESPEED_PROGRAM", value_name = "PATH")]
    program: Option<String>,

    /// GSettings schema holding the pointer speed
    #[arg(long, global = true, env = "MOUSESPEED_SCHEMA")]
    schema: Option<String>,

    /// GSettings key of the pointer speed
    #[arg(long, global = true, env = "MOUSESPEED_KEY")]
    key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive control panel (default)
    Panel,

    /// Print the current pointer speed
    #[command(after_help = "\
Examples:
  mousespeed get
  mousespeed get --json | jq .value")]
    Get {
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Set the pointer speed (clamped to -1.0..1.0, rounded to 0.1)
    #[command(after_help = "\
Examples:
  mousespeed set 0.4
  mousespeed set -0.25      # applies -0.3
  mousespeed set 3          # applies 1.0")]
    Set {
        /// New speed, -1.0 (slowest) to 1.0 (fastest)
        #[arg(allow_negative_numbers = true)]
        value: f32,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Set the pointer speed back to 0.0
    Reset {
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::load();
    let interactive = matches!(cli.command, None | Some(Commands::Panel));
    logging::init(&settings.log_level, interactive);
    debug!("settings from {}", Settings::config_path().display());

    let store = build_store(&cli.store, &settings);
    debug!("store program {}, key {}", store.program(), store.key());
    let mut controller = SpeedController::new(store);

    let result = match cli.command {
        None | Some(Commands::Panel) => cmd_panel(&mut controller),
        Some(Commands::Get { json }) => cmd_get(&mut controller, json),
        Some(Commands::Set { value, json }) => cmd_set(&mut controller, value, json),
        Some(Commands::Reset { json }) => cmd_reset(&mut controller, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Flags and env vars win over the settings file.
fn build_store(args: &StoreArgs, settings: &Settings) -> GsettingsStore {
    let program = args.program.clone().unwrap_or_else(|| settings.program.clone());
    let schema = args.schema.clone().unwrap_or_else(|| settings.schema.clone());
    let key = args.key.clone().unwrap_or_else(|| settings.key.clone());
    GsettingsStore::new(program, PreferenceKey::new(schema, key))
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from a store failure with its exit code and a hint.
    pub fn store(err: &StoreError, store: &GsettingsStore) -> Self {
        let hint = match err {
            StoreError::CommandFailed(CommandFailure::NotFound) => Some(format!(
                "\"{}\" is not installed or not on PATH; set --program or store.program",
                store.program()
            )),
            StoreError::CommandFailed(CommandFailure::Exit { .. }) => Some(format!(
                "check that schema \"{}\" with key \"{}\" exists (gsettings list-keys {})",
                store.key().schema,
                store.key().key,
                store.key().schema
            )),
            _ => None,
        };
        Self { code: store_exit_code(err), message: err.to_string(), hint }
    }
}

/// Outcome of a headless command.
#[derive(Debug, Serialize)]
struct Report {
    schema_version: u32,
    schema: String,
    key: String,
    value: f64,
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Report {
    fn from_controller(controller: &SpeedController<GsettingsStore>) -> Self {
        let status = controller.status();
        let key = controller.store().key();
        Self {
            schema_version: 1,
            schema: key.schema.clone(),
            key: key.key.clone(),
            value: json_value(controller.pending()),
            status: status.as_str(),
            message: status.message(),
            error: status.error().map(|e| e.to_string()),
        }
    }

    fn print(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(output) => println!("{}", output),
            Err(e) => eprintln!("error: failed to encode report: {}", e),
        }
    }
}

/// The value as displayed, so JSON shows `0.3` rather than the f32 expansion.
fn json_value(value: PreferenceValue) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

/// Turn a failed status into an error after the report has been printed.
fn check_status(controller: &SpeedController<GsettingsStore>) -> Result<(), CliError> {
    match controller.status().error() {
        Some(err) => Err(CliError::store(err, controller.store())),
        None => Ok(()),
    }
}

fn cmd_panel(controller: &mut SpeedController<GsettingsStore>) -> Result<(), CliError> {
    controller.initialize();
    tui::run(controller).map_err(CliError::general)
}

fn cmd_get(controller: &mut SpeedController<GsettingsStore>, json: bool) -> Result<(), CliError> {
    controller.initialize();

    if json {
        Report::from_controller(controller).print();
    } else if controller.status().error().is_some() {
        println!("{}", controller.status().message());
    } else {
        println!("{}", controller.pending());
    }

    check_status(controller)
}

fn cmd_set(
    controller: &mut SpeedController<GsettingsStore>,
    value: f32,
    json: bool,
) -> Result<(), CliError> {
    if value.is_nan() {
        return Err(CliError::args("speed must be a number between -1.0 and 1.0"));
    }

    // A failed load is not fatal here: the new value does not depend on it
    controller.initialize();
    controller.edit(value);
    controller.apply();

    print_outcome(controller, json);
    check_status(controller)
}

fn cmd_reset(controller: &mut SpeedController<GsettingsStore>, json: bool) -> Result<(), CliError> {
    controller.initialize();
    controller.reset();

    print_outcome(controller, json);
    check_status(controller)
}

fn print_outcome(controller: &SpeedController<GsettingsStore>, json: bool) {
    if json {
        Report::from_controller(controller).print();
    } else {
        println!("{}", controller.status().message());
    }
}
