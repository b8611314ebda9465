use clap::Parser;
use duo_core::db;
use duo_core::engine::{EngineConfig, OccurrenceEngine};
use duo_core::error::CoreError;
use duo_core::repository::SqliteRepository;
use owo_colors::{OwoColorize, Style};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod views;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    debug!(database = %config.database_path, "Database ready");

    let repository = SqliteRepository::new(db_pool);
    let ctx = commands::Context {
        engine: OccurrenceEngine::with_config(repository, EngineConfig::from(config.engine)),
        couple: cli.couple.or(config.default_couple),
        json: cli.json,
    };

    let result = match cli.command {
        cli::Commands::Couple(command) => commands::couple::couple_command(&ctx, command).await,
        cli::Commands::Member(command) => commands::member::member_command(&ctx, command).await,
        cli::Commands::Task(command) => commands::task::task_command(&ctx, command).await,
        cli::Commands::Event(command) => commands::event::event_command(&ctx, command).await,
        cli::Commands::Day(command) => commands::day::show_day(&ctx, command).await,
        cli::Commands::Calendar(command) => commands::calendar::show_calendar(&ctx, command).await,
        cli::Commands::Summary(command) => commands::summary::show_summary(&ctx, command).await,
        cli::Commands::Stats => commands::summary::show_stats(&ctx).await,
        cli::Commands::Done(command) => commands::overlay::done(&ctx, command).await,
        cli::Commands::Undo(command) => commands::overlay::undo(&ctx, command).await,
        cli::Commands::Skip(command) => commands::overlay::skip(&ctx, command).await,
        cli::Commands::Unskip(command) => commands::overlay::unskip(&ctx, command).await,
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        let code = core_error.kind().code();
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {} [{}]", "Error:".style(error_style), s, code.dimmed());
            }
            CoreError::TaskAlreadyCompleted(s) => {
                eprintln!(
                    "{} Already done: {} [{}]",
                    "Error:".style(error_style),
                    s.yellow(),
                    code.dimmed()
                );
            }
            CoreError::AlreadyExists(s) => {
                eprintln!(
                    "{} Already skipped: {} [{}]",
                    "Error:".style(error_style),
                    s.yellow(),
                    code.dimmed()
                );
            }
            CoreError::InvalidRRule(s) => {
                eprintln!("{} Invalid recurrence: {} [{}]", "Error:".style(error_style), s, code.dimmed());
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {} [{}]", "Error:".style(error_style), s, code.dimmed());
            }
            _ => eprintln!("{} {} [{}]", "Error:".style(error_style), core_error, code.dimmed()),
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
