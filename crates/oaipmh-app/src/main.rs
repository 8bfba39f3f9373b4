//! oaipmh binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML (defaults if absent)
//! 2. Initialize tracing
//! 3. Open the SQLite database (running migrations)
//! 4. Run the requested command: import, sync or show

mod cli;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use oaipmh_core::config::OaiConfig;
use oaipmh_core::error::OaiError;
use oaipmh_core::types::{MetadataFormat, Record};
use oaipmh_matterhorn::{ensure_matterhorn_record, header, sync_all};
use oaipmh_storage::{Database, MatterhornRecordRepository, RecordRepository};

use cli::{CliArgs, Command};

/// Stderr subscriber used only while the config file is read, so warnings
/// from `load_or_default` are not lost before `init_tracing` runs.
fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish()
}

/// Load config (defaults on a missing or invalid file), then apply the
/// `--data-dir` override.
fn load_config(args: &CliArgs) -> OaiConfig {
    let config_file = args.resolve_config_path();
    let mut config = tracing::subscriber::with_default(bootstrap_subscriber(), || {
        OaiConfig::load_or_default(&config_file)
    });
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    config
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn import(
    db: Arc<Database>,
    file: &Path,
    identifier: String,
    metadata_format: MetadataFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let xml = std::fs::read_to_string(file).map_err(OaiError::from)?;
    let datestamp = match header::datestamp(&xml) {
        Some(datestamp) => datestamp,
        None => {
            tracing::warn!(
                identifier = %identifier,
                "No usable header datestamp, using import time"
            );
            chrono::Utc::now()
        }
    };
    let record = Record {
        identifier,
        metadata_format,
        datestamp,
        xml,
    };

    RecordRepository::new(db).save(&record)?;
    tracing::info!(
        identifier = %record.identifier,
        prefix = %record.metadata_format.prefix,
        file = %file.display(),
        "Record imported"
    );
    Ok(())
}

fn sync(db: Arc<Database>, identifier: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let records = RecordRepository::new(Arc::clone(&db));
    let store = MatterhornRecordRepository::new(db);

    if let Some(identifier) = identifier {
        let record = records
            .find_by_identifier(&identifier)?
            .ok_or_else(|| OaiError::NotFound(format!("record {}", identifier)))?;

        match ensure_matterhorn_record(&store, &record)? {
            Some(outcome) => println!(
                "{}: created={} updated={}",
                identifier, outcome.created, outcome.updated
            ),
            None => println!("{}: skipped (not a matterhorn record)", identifier),
        }
        return Ok(());
    }

    let all = records.list()?;
    let summary = sync_all(&store, &all);
    println!(
        "processed={} skipped={} created={} updated={} unchanged={} failed={}",
        summary.processed,
        summary.skipped,
        summary.created,
        summary.updated,
        summary.unchanged,
        summary.failed.len()
    );

    if !summary.failed.is_empty() {
        return Err(format!("{} record(s) failed to sync", summary.failed.len()).into());
    }
    Ok(())
}

fn show(db: Arc<Database>, identifier: &str) -> Result<(), Box<dyn std::error::Error>> {
    let record = MatterhornRecordRepository::new(db)
        .find_by_record(identifier)?
        .ok_or_else(|| OaiError::NotFound(format!("matterhorn record for {}", identifier)))?;
    println!("{}", serde_json::to_string_pretty(&record).map_err(OaiError::from)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config = load_config(&args);
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.general.log_level.clone());
    init_tracing(&level);

    let db_path = config.database_path();
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    match args.command {
        Command::Import {
            file,
            identifier,
            prefix,
            namespace,
            schema,
        } => import(
            db,
            &file,
            identifier,
            MetadataFormat {
                prefix,
                namespace,
                schema,
            },
        ),
        Command::Sync { identifier } => sync(db, identifier),
        Command::Show { identifier } => show(db, &identifier),
    }
}
