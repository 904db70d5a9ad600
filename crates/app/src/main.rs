use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use services::logging::{LogConfig, init_logging};
use services::{AppServices, Clock, SessionScope, StudyConfig};

mod cli;
mod commands;

use crate::cli::{Cli, Command};

async fn run(cli: Cli) -> Result<()> {
    let mut config = StudyConfig::from_env().context("read STUDY_* environment")?;
    if let Some(db) = cli.db {
        config = config.with_db_url(db)?;
    }

    prepare_sqlite_dir(&config.db_url)?;
    let boot = AppServices::new_sqlite(&config, Clock::default_clock())
        .await
        .with_context(|| format!("open study database {}", config.db_url))?;
    if boot.report.discarded_corrupt {
        tracing::warn!(db = %config.db_url, "stored progress was unreadable and has been reset");
        eprintln!("warning: stored progress was unreadable and has been reset");
    }
    tracing::debug!(
        session_size = config.session_size,
        policy = %config.streak_policy,
        "configuration loaded"
    );
    let services = boot.services;
    let mut state = boot.state;
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Status => commands::run_status(&services, &state, &mut out),
        Command::List { subject } => commands::run_list(&state, &subject, &mut out),
        Command::Study { subject } => {
            let scope = subject.map_or(SessionScope::All, SessionScope::Subject);
            commands::run_study(&services, &mut state, scope, &mut io::stdin().lock(), &mut out)
                .await
        }
        Command::Goal { goal } => commands::run_goal(&services, &mut state, goal, &mut out).await,
        Command::AddNote {
            subject,
            title,
            body,
        } => commands::run_add_note(&services, &mut state, &subject, title, body, &mut out).await,
        Command::AddQuestion(args) => {
            commands::run_add_question(&services, &mut state, args, &mut out).await
        }
        Command::Seed => commands::run_seed(&services, &mut state, &mut out).await,
    }
}

/// `SQLite` creates a missing file with `mode=rwc` but not its directory.
fn prepare_sqlite_dir(db_url: &str) -> Result<()> {
    let Some(path) = sqlite_file_path(db_url) else {
        return Ok(());
    };
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(path)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format.into())
        .with_ansi(io::stderr().is_terminal());
    if let Err(err) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {err}");
        std::process::exit(1);
    }

    if let Err(err) = run(cli).await {
        tracing::error!(error = %format!("{err:#}"), "command failed");
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}
