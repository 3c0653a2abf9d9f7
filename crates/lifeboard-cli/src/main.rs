use anyhow::Result;
use clap::Parser;
use lifeboard_core::db;
use lifeboard_core::error::CoreError;
use lifeboard_core::repository::SqliteRepository;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod server;
mod util;
mod views;

use cli::Commands;
use commands::Context;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let default_level = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    init_tracing(config.log_level.as_deref().unwrap_or(default_level));

    if let Err(e) = run(cli, config).await {
        handle_error(e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output on stdout stays clean.
/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: cli::Cli, config: config::Config) -> Result<()> {
    let timezone = config.tz()?;
    let owner = config.owner();
    if owner.as_str().is_empty() {
        return Err(CoreError::InvalidInput("user_id must not be empty".to_string()).into());
    }

    let pool = db::establish_connection(&config.database_path).await?;
    let repository = SqliteRepository::new(pool);
    let ctx = Context { owner, timezone };

    match cli.command {
        Commands::Serve(command) => {
            commands::serve::serve(repository, &ctx, &config.server, command).await
        }
        Commands::Habit(command) => commands::habit::run(&repository, &ctx, command.command).await,
        Commands::Task(command) => commands::task::run(&repository, &ctx, command.command).await,
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(candidates) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, name) in candidates {
                    eprintln!("  {} ({})", id.yellow(), name);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidTimezone(tz) => {
                eprintln!(
                    "{} Invalid timezone: '{}'. Use IANA names like 'America/New_York'",
                    "Error:".style(error_style),
                    tz.yellow()
                );
            }
            _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
