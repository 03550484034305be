pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reorder_core::config::{ConfigOverrides, LoadOptions, LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "reorder",
    about = "Reorder feature pipeline CLI",
    long_about = "Build the per (user, item) reorder feature table from the interim order store.",
    after_help = "Examples:\n  reorder seed\n  reorder check --json\n  reorder build --output features.csv"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Read configuration from this TOML file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run every feature stage and export the final table as CSV")]
    Build {
        #[arg(long, help = "Override database.url")]
        database_url: Option<String>,
        #[arg(long, value_name = "PATH", help = "Override pipeline.output_path")]
        output: Option<PathBuf>,
    },
    #[command(about = "Validate config, database connectivity, and the input schema")]
    Check {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Load the bundled sample order history into the configured store")]
    Seed,
}

impl Cli {
    fn load_options(&self, overrides: ConfigOverrides) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides,
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Build { database_url, output } => {
            let overrides = ConfigOverrides {
                database_url: database_url.clone(),
                output_path: output.clone(),
                ..ConfigOverrides::default()
            };
            commands::build::run(cli.load_options(overrides))
        }
        Command::Check { json } => {
            commands::check::run(cli.load_options(ConfigOverrides::default()), *json)
        }
        Command::Config => commands::config::run(cli.load_options(ConfigOverrides::default())),
        Command::Seed => commands::seed::run(cli.load_options(ConfigOverrides::default())),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber once; later calls are no-ops. Logs go to
/// stderr so stdout carries only command output. `RUST_LOG` wins over the
/// configured level.
pub fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.trim().to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
