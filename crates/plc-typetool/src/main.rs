//! PLC type tool entry point.
//!
//! Command-line front end over `plc-datatypes` for engineering work:
//! castability queries, literal casts, type limits and the compact wire
//! encoding.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plc_common::config::DatatypeConfig;
use plc_common::iec_types::DataTypeId;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::commands::{parse_type_arg, Report};

/// PLC type tool command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "plc-typetool",
    about = "Inspect and convert IEC 61131-3 elementary data types",
    version,
    long_about = None
)]
struct Args {
    /// Path to a data type configuration file (TOML).
    #[arg(long, short = 'c', value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Print reports as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether FROM converts to TO.
    Castable {
        /// Source type.
        #[arg(value_parser = parse_type_arg)]
        from: DataTypeId,
        /// Destination type.
        #[arg(value_parser = parse_type_arg)]
        to: DataTypeId,
    },
    /// Convert a typed literal such as `INT#5` to another type.
    Cast {
        /// Source literal.
        literal: String,
        /// Destination type.
        #[arg(value_parser = parse_type_arg)]
        to: DataTypeId,
        /// Allow down-casts regardless of the configured policy.
        #[arg(long)]
        explicit: bool,
    },
    /// Show size, class and numeric limits of a type.
    #[command(alias = "limits")]
    Info {
        /// Type name.
        #[arg(value_parser = parse_type_arg)]
        type_id: DataTypeId,
    },
    /// Encode a typed literal in the compact wire format.
    Encode {
        /// Literal to encode.
        literal: String,
    },
    /// Decode hex bytes of the compact wire format.
    Decode {
        /// Hex bytes, optionally separated by whitespace.
        hex: String,
    },
    /// Split a (possibly qualified) type name.
    Name {
        /// Name such as `ns::Motor`, `pkg.Motor` or `INT#5`.
        text: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    let config = load_config(&args)?;
    info!(policy = ?config.connections.cast_policy, max_string_length = config.wire.max_string_length, "Configuration loaded");

    match &args.command {
        Command::Castable { from, to } => emit(&commands::castable(*from, *to, &config), args.json),
        Command::Cast {
            literal,
            to,
            explicit,
        } => emit(&commands::cast(literal, *to, *explicit, &config)?, args.json),
        Command::Info { type_id } => emit(&commands::type_info(*type_id), args.json),
        Command::Encode { literal } => emit(&commands::encode(literal, &config)?, args.json),
        Command::Decode { hex } => emit(&commands::decode(hex, &config)?, args.json),
        Command::Name { text } => emit(&commands::type_name(text)?, args.json),
    }
}

fn emit(report: &impl Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report).context("Failed to serialize report")?);
    } else {
        println!("{report}");
    }
    Ok(())
}

/// Initialize logging with the specified log level.
fn init_logging(level: &str) {
    let filter = format!("plc_typetool={level},plc_datatypes={level},plc_common={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `PLC_TYPES_CONFIG` environment variable
/// 3. `config/datatypes.toml` (local development)
/// 4. Built-in defaults
fn load_config(args: &Args) -> Result<DatatypeConfig> {
    if let Some(config_path) = &args.config {
        info!(?config_path, "Loading config from command-line argument");
        return DatatypeConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"));
    }

    if let Ok(env_path) = std::env::var("PLC_TYPES_CONFIG") {
        let config_path = PathBuf::from(&env_path);
        if config_path.exists() {
            info!(?config_path, "Loading config from PLC_TYPES_CONFIG");
            return DatatypeConfig::from_file(&config_path)
                .with_context(|| format!("Failed to load config from PLC_TYPES_CONFIG={env_path:?}"));
        }
        warn!(
            path = %env_path,
            "PLC_TYPES_CONFIG set but file does not exist, checking other locations"
        );
    }

    let local_path = PathBuf::from("config/datatypes.toml");
    if local_path.exists() {
        info!(?local_path, "Loading config from local path");
        return DatatypeConfig::from_file(&local_path)
            .with_context(|| format!("Failed to load config from {local_path:?}"));
    }

    info!("No config file found, using built-in defaults");
    Ok(DatatypeConfig::default())
}
