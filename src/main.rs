use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use kidsenglish::{
    config::{self, app::DEFAULT_CONFIG_PATH},
    core::{access, backup, backup::ImportMode, stats, user},
    errors::{Error, Result},
    storage::{Backend, StorageAdapter},
};
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Operator tools for the KidsEnglish content store")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, env = "KIDSENGLISH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the full snapshot as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Restore a snapshot from a JSON backup
    Import {
        file: PathBuf,
        /// replace or upsert (defaults to the configured mode)
        #[arg(long)]
        mode: Option<ImportMode>,
    },
    /// Overwrite everything with the seed data
    Reset,
    /// Show signup counts
    Stats,
    /// List the modules a student sees right now
    Preview {
        #[arg(long)]
        phone: String,
        /// Skip the drip delay, as the admin preview does
        #[arg(long)]
        admin: bool,
    },
}

async fn run(cli: Cli) -> Result<String> {
    let app_config = config::load_config(&cli.config)?;
    let store = config::open_store(&app_config.storage).await?;
    let store: &dyn Backend = store.as_ref();

    match cli.command {
        Commands::Export { out } => {
            let doc = backup::export_snapshot(store).await?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, doc).await?;
                    Ok(format!("Backup written to {}", path.display()))
                }
                None => Ok(doc),
            }
        }
        Commands::Import { file, mode } => {
            let doc = tokio::fs::read_to_string(&file).await?;
            let mode = mode.unwrap_or(app_config.import.mode);
            let summary = backup::import_snapshot(store, &doc, mode).await?;
            Ok(format!("Imported {}: {summary}", file.display()))
        }
        Commands::Reset => {
            backup::reset_to_seed(store, Utc::now()).await?;
            Ok("Store reset to seed data".to_string())
        }
        Commands::Stats => {
            let users = store.load().await?.users;
            let counts = stats::signup_stats(&users, &Local::now());
            Ok(format!(
                "Signups: {} today, {} yesterday, {} in 7 days, {} this month, {} total",
                counts.today, counts.yesterday, counts.last7, counts.month, counts.total
            ))
        }
        Commands::Preview { phone, admin } => {
            let student = user::lookup_user(store, &phone)
                .await?
                .ok_or_else(|| Error::UnknownUser {
                    phone: phone.clone(),
                })?;
            let snapshot = store.load().await?;
            let visible = access::visible_modules(&snapshot.modules, &student, Utc::now(), admin);
            let titles = |modules: &[kidsenglish::models::Module]| {
                modules
                    .iter()
                    .map(|m| format!("{}. {}", m.order, m.title))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            Ok(format!(
                "Vertical: [{}]\nHorizontal: [{}]",
                titles(&visible.vertical),
                titles(&visible.horizontal)
            ))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing as early as possible
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Non-fatal, env vars can be set externally
    dotenv().ok();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(message) => {
            info!("Done");
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
