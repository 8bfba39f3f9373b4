//! CLI argument definitions for the oaipmh binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use oaipmh_core::namespaces::{MATTERHORN_NAMESPACE, MATTERHORN_PREFIX, MATTERHORN_SCHEMA};

/// Store harvested OAI-PMH records and derive Matterhorn metadata from them.
#[derive(Parser, Debug)]
#[command(name = "oaipmh", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the SQLite database.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store an OAI-PMH record read from an XML file.
    Import {
        /// File containing the `record` element.
        file: PathBuf,

        /// OAI identifier of the record.
        #[arg(short = 'i', long)]
        identifier: String,

        /// Metadata prefix the record was harvested with.
        #[arg(long, default_value = MATTERHORN_PREFIX)]
        prefix: String,

        /// Namespace URI of the metadata format.
        #[arg(long, default_value = MATTERHORN_NAMESPACE)]
        namespace: String,

        /// Schema location of the metadata format.
        #[arg(long, default_value = MATTERHORN_SCHEMA)]
        schema: String,
    },

    /// Derive Matterhorn records from stored records.
    Sync {
        /// Only synchronise this record.
        #[arg(short = 'i', long)]
        identifier: Option<String>,
    },

    /// Print the Matterhorn record derived from a record as JSON.
    Show {
        /// OAI identifier of the record.
        identifier: String,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > OAIPMH_CONFIG env var > ~/.oaipmh/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("OAIPMH_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory override, if any.
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".oaipmh").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".oaipmh").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_defaults() {
        let args = CliArgs::parse_from(["oaipmh", "import", "record.xml", "-i", "oai:mh:1"]);
        match args.command {
            Command::Import {
                file,
                identifier,
                prefix,
                namespace,
                schema,
            } => {
                assert_eq!(file, PathBuf::from("record.xml"));
                assert_eq!(identifier, "oai:mh:1");
                assert_eq!(prefix, MATTERHORN_PREFIX);
                assert_eq!(namespace, MATTERHORN_NAMESPACE);
                assert_eq!(schema, MATTERHORN_SCHEMA);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_sync_with_global_flags() {
        let args = CliArgs::parse_from([
            "oaipmh",
            "sync",
            "--config",
            "/etc/oaipmh.toml",
            "--log-level",
            "debug",
        ]);
        assert!(matches!(args.command, Command::Sync { identifier: None }));
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/oaipmh.toml"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_resolve_data_dir() {
        let args = CliArgs::parse_from(["oaipmh", "-d", "/tmp/oai", "show", "oai:mh:1"]);
        assert_eq!(args.resolve_data_dir().as_deref(), Some("/tmp/oai"));
        assert!(matches!(args.command, Command::Show { ref identifier } if identifier == "oai:mh:1"));
    }
}
