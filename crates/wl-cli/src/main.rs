//! wl-jql
//!
//! Compile saved filter conditions to JQL, recover conditions from JQL, and
//! start a collection run on the remote collector.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wl_core::config::AppConfig;
use wl_queries::compiler::compile;
use wl_queries::conditions::Condition;
use wl_queries::filter::FilterConfig;
use wl_queries::importer::import_or_fallback;
use wl_services::{FilterService, HttpExecutor, MemoryFilterStore};

#[derive(Parser)]
#[command(name = "wl-jql", version, about = "Worklog filter JQL tools")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "WL_LOG_JSON")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a condition list (config_json or a bare array) to JQL
    Compile {
        /// Read from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Recover conditions from a JQL query
    Import {
        query: String,

        #[arg(long)]
        pretty: bool,
    },
    /// Compile a condition list and start a collection run
    Trigger {
        #[arg(long)]
        file: Option<PathBuf>,

        /// Filter title reported to the collector
        #[arg(long)]
        title: Option<String>,
    },
}

/// Either a stored `config_json` document or a bare condition array
#[derive(Deserialize)]
#[serde(untagged)]
enum ConditionsInput {
    Config(FilterConfig),
    Bare(Vec<Condition>),
}

impl From<ConditionsInput> for Vec<Condition> {
    fn from(input: ConditionsInput) -> Self {
        match input {
            ConditionsInput::Config(config) => config.conditions,
            ConditionsInput::Bare(conditions) => conditions,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        warn!("Failed to load config from env: {}, using defaults", e);
        AppConfig::default()
    });

    match cli.command {
        Command::Compile { file } => {
            let conditions = read_conditions(file.as_deref())?;
            println!("{}", compile(&conditions));
        }
        Command::Import { query, pretty } => {
            let conditions = import_or_fallback(&query);
            let output = if pretty {
                serde_json::to_string_pretty(&conditions)?
            } else {
                serde_json::to_string(&conditions)?
            };
            println!("{output}");
        }
        Command::Trigger { file, title } => {
            let conditions = read_conditions(file.as_deref())?;
            let executor = HttpExecutor::new(&config.collector)?;
            info!(url = %executor.rpc_url(), "Sending collection request");

            let service = FilterService::new(Arc::new(MemoryFilterStore::new()), Arc::new(executor))
                .with_config(config.builder.clone());
            let reply = service
                .trigger_collection(title.as_deref(), &conditions)
                .await
                .inspect_err(|e| error!(code = e.error_code(), "Collection request failed"))?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,wl_jql=info,wl_services=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn read_conditions(file: Option<&Path>) -> anyhow::Result<Vec<Condition>> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read stdin")?;
            raw
        }
    };
    parse_conditions(&raw)
}

fn parse_conditions(raw: &str) -> anyhow::Result<Vec<Condition>> {
    let input: ConditionsInput =
        serde_json::from_str(raw).context("expected a filter config or a condition array")?;
    Ok(input.into())
}
