//! Session Desk
//!
//! Terminal front-end for the multi-account trading backend.

mod cli;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use desk_core::api::DeskClient;
use desk_core::config::Config;
use desk_core::form::{CloseForm, ModifyForm, TradeForm};
use desk_core::{Form, Submission, SubmissionOutcome};
use render::ResultPanel;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(json: bool) {
    // Logs go to stderr so stdout stays clean for --json output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "desk=info,desk_core=warn".into()),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    // Loads .env first, so RUST_LOG set there reaches the filter
    let config = Config::from_env(cli.config.as_deref()).context("loading configuration");
    init_logging(cli.json_logs);

    let mut config = config?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_base_url(url)?;
    }
    debug!(base_url = %config.api.base_url, "Configuration loaded");

    let client = DeskClient::new(&config.api)?;
    let json = cli.json;
    let now = chrono::Local::now().naive_local();

    match cli.command {
        Command::Trade(args) => {
            let form = TradeForm::with_draft(args.into_draft());
            submit(&form, &client, json).await
        }
        Command::Modify(args) => {
            let form = ModifyForm::with_draft(args.into_draft());
            submit(&form, &client, json).await
        }
        Command::Close { session_id } => {
            let form = CloseForm::with_draft(cli::close_draft(session_id));
            submit(&form, &client, json).await
        }
        Command::Sessions => {
            let dashboard = client.dashboard().await?;
            info!(active = dashboard.sessions.len(), "Dashboard refreshed");
            if json {
                print_json(&serde_json::json!({
                    "stats": dashboard.stats,
                    "sessions": dashboard.sessions.sessions,
                }))?;
            } else {
                print!("{}", render::dashboard(&dashboard, now));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::History => {
            let history = client.trade_history().await?;
            show(&history, json, render::history)
        }
        Command::Stats => {
            let stats = client.dashboard_stats().await?;
            show(&stats, json, render::stats)
        }
        Command::Session { session_id } => {
            let detail = client.session(&session_id).await?;
            show(&detail, json, |d| render::session_detail(d, now))
        }
        Command::Position { ticket, account } => {
            let details = client.position_details(ticket, account).await?;
            show(&details, json, render::position)?;
            Ok(if details.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Health => {
            let status = client.health().await?;
            show(&status, json, render::health)?;
            Ok(if status.is_healthy() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Pairs => {
            print!("{}", render::pairs());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn submit<S>(form: &Form<S>, client: &DeskClient, json: bool) -> Result<ExitCode>
where
    S: Submission,
    S::Response: ResultPanel + Serialize,
{
    let outcome = form.submit(client).await?;
    info!(form = S::NAME, outcome = outcome.kind(), "Submit finished");

    if json {
        print_json(&outcome_json(&outcome))?;
    } else {
        print!("{}", render::outcome(&outcome));
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn outcome_json<T: Serialize>(outcome: &SubmissionOutcome<T>) -> serde_json::Value {
    match outcome {
        SubmissionOutcome::Success { data } => serde_json::json!({
            "outcome": outcome.kind(),
            "data": data,
        }),
        SubmissionOutcome::ValidationError { messages } => serde_json::json!({
            "outcome": outcome.kind(),
            "messages": messages,
        }),
        SubmissionOutcome::ApiError { message } | SubmissionOutcome::NetworkError { message } => {
            serde_json::json!({
                "outcome": outcome.kind(),
                "message": message,
            })
        }
    }
}

fn show<T: Serialize>(value: &T, json: bool, text: impl FnOnce(&T) -> String) -> Result<ExitCode> {
    if json {
        print_json(value)?;
    } else {
        print!("{}", text(value));
    }
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
