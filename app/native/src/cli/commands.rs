//! CLI command definitions using Clap.

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};
use colored::Colorize;
use serde_json::{Value, json};
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::output;
use crate::config::{self, ConfigError, TetherConfig};
use crate::constants::APP_NAME;
use crate::error::TetherError;
use crate::modules::bridge::event_log::read_recent;
use crate::modules::bridge::server::{self, IpcError};
use crate::modules::bridge::{Request, Response};
use crate::schema;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of records shown by `tether events`.
const DEFAULT_EVENTS_COUNT: usize = 10;

/// Tether CLI - policy-gated bridge between agents and the window manager.
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the bridge on its Unix socket.
    ///
    /// Serves the in-memory window host until Ctrl-C.
    Serve {
        /// Map a few demo windows before serving.
        #[arg(long = "virtual")]
        seed_virtual: bool,
    },

    /// Send one JSON-RPC request to a running bridge.
    ///
    /// Usage:
    ///   tether call get_windows
    ///   tether call create_slot '{"name": "left", "w": 0.5, "h": 1.0}'
    Call {
        /// Method name.
        method: String,

        /// Parameters as JSON, usually an object.
        params: Option<String>,

        /// Request id.
        #[arg(long, default_value_t = 1)]
        id: u64,
    },

    /// List windows known to the bridge.
    Windows {
        /// Print the raw JSON result instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the most recent records of the event store.
    Events {
        /// Number of records.
        #[arg(short = 'n', long = "count", default_value_t = DEFAULT_EVENTS_COUNT)]
        count: usize,

        /// Print the records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the bridge socket path.
    SocketPath,

    /// Output the configuration JSON Schema.
    ///
    /// Can be redirected to a file for editors that support JSON Schema
    /// validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(tether completions --shell zsh)"
    ///   tether completions --shell fish > ~/.config/fish/completions/tether.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the bridge cannot be
    /// reached, or the bridge answers with an error.
    pub fn execute(&self) -> Result<(), TetherError> {
        if let Some(path) = self.config_path() {
            if !path.exists() {
                return Err(TetherError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            config::set_custom_config_path(path);
        }

        match &self.command {
            Commands::Serve { seed_virtual } => crate::run_bridge(&load_config()?, *seed_virtual),
            Commands::Call { method, params, id } => execute_call(method, params.as_deref(), *id),
            Commands::Windows { json } => execute_windows(*json),
            Commands::Events { count, json } => {
                execute_events(*count, *json);
                Ok(())
            }
            Commands::SocketPath => {
                println!("{}", config::get_config().bridge.socket_path().display());
                Ok(())
            }
            Commands::Schema => {
                println!("{}", schema::print_schema());
                Ok(())
            }
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, APP_NAME, &mut io::stdout());
    }
}

/// Loads the configuration strictly: a broken file is an error here, while
/// a missing one means defaults.
fn load_config() -> Result<TetherConfig, TetherError> {
    match config::try_load() {
        Ok((config, path)) => {
            tracing::info!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        Err(ConfigError::NotFound) => Ok(TetherConfig::default()),
        Err(err) => Err(TetherError::ConfigError(err.to_string())),
    }
}

/// Parses the `params` argument; absent means `{}`.
///
/// Any JSON value is sent as-is; each method validates its own params.
fn parse_params(params: Option<&str>) -> Result<Value, TetherError> {
    let Some(raw) = params else {
        return Ok(json!({}));
    };
    serde_json::from_str(raw)
        .map_err(|e| TetherError::InvalidArguments(format!("params must be valid JSON: {e}")))
}

/// Sends one request on a throwaway current-thread runtime.
fn send(request: &Request) -> Result<Response, TetherError> {
    let socket_path = config::get_config().bridge.socket_path();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(server::call(&socket_path, request)).map_err(|err| match &err {
        IpcError::NotRunning(_) => {
            TetherError::IpcError(format!("{err}. Start it with `tether serve`."))
        }
        _ => TetherError::IpcError(err.to_string()),
    })
}

fn execute_call(method: &str, params: Option<&str>, id: u64) -> Result<(), TetherError> {
    let request = Request::new(method, parse_params(params)?, id);
    let response = send(&request)?;

    output::print_highlighted_json(&serde_json::to_value(&response)?);
    match response.error() {
        Some(error) => Err(TetherError::BridgeError(error.to_string())),
        None => Ok(()),
    }
}

#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Redacted")]
    redacted: String,
}

impl WindowRow {
    fn from_info(info: &Value) -> Self {
        let slot = info
            .get("agent_metadata")
            .and_then(|metadata| metadata.get("slot"))
            .and_then(Value::as_str);

        Self {
            id: info.get("id").map_or_else(String::new, ToString::to_string),
            name: output::truncate(info.get("name").and_then(Value::as_str).unwrap_or(""), 40),
            group: output::format_optional(info.get("group").and_then(Value::as_str)),
            slot: output::format_optional(slot),
            redacted: output::format_bool(
                info.get("redacted").and_then(Value::as_bool).unwrap_or(false),
            ),
        }
    }
}

fn execute_windows(json: bool) -> Result<(), TetherError> {
    let response = send(&Request::new("get_windows", json!({}), 1))?;
    let windows = response.into_result().map_err(|e| TetherError::BridgeError(e.to_string()))?;

    if json {
        output::print_highlighted_json(&windows);
        return Ok(());
    }

    let rows: Vec<WindowRow> =
        windows.as_array().map(|list| list.iter().map(WindowRow::from_info).collect()).unwrap_or_default();
    let count = rows.len();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::last()).with(Alignment::center()))
        .to_string();

    println!("{}", format!("Windows ({count})").bold());
    println!("{table}");
    Ok(())
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Time")]
    timestamp: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Payload")]
    payload: String,
}

fn execute_events(count: usize, json: bool) {
    let path = config::get_config().bridge.event_log_path();
    let records = read_recent(&path, count);

    if json {
        output::print_highlighted_json(&serde_json::to_value(&records).unwrap_or_default());
        return;
    }

    if records.is_empty() {
        println!("No events recorded in {}", path.display());
        return;
    }

    let rows: Vec<EventRow> = records
        .iter()
        .map(|record| EventRow {
            timestamp: format!("{:.3}", record.timestamp),
            event: record.event.clone(),
            payload: output::truncate(&record.payload.to_string(), 60),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
}
