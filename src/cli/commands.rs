//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generic client for resource-oriented JSON APIs
#[derive(Parser, Debug)]
#[command(name = "resource-dispatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL, overriding the config file
    #[arg(short, long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one resource
    Get {
        /// Collection path, e.g. /api/v1/vm.json
        path: String,
        /// Resource identifier
        id: String,
    },

    /// Create a resource from JSON attributes
    Create {
        /// Collection path
        path: String,
        /// Attributes as a JSON object
        #[arg(short, long)]
        data: String,
    },

    /// Replace a resource's attributes
    Update {
        /// Collection path
        path: String,
        /// Resource identifier
        id: String,
        /// Attributes as a JSON object
        #[arg(short, long)]
        data: String,
    },

    /// Delete a resource
    Destroy {
        /// Collection path
        path: String,
        /// Resource identifier
        id: String,
        /// Succeed if the resource does not exist
        #[arg(long)]
        ignore_missing: bool,
    },

    /// List resources of a collection
    List {
        /// Collection path
        path: String,

        /// First page to fetch (enables paging)
        #[arg(long, conflicts_with = "stream")]
        page: Option<u64>,

        /// Items per page (enables paging)
        #[arg(long, conflicts_with = "stream")]
        limit: Option<u64>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u64>,

        /// Stream objects from a background task
        #[arg(long)]
        stream: bool,

        /// Fetch every listed object individually
        #[arg(long)]
        full: bool,

        /// Collection does not support paging
        #[arg(long)]
        unpaged: bool,

        /// Filter as key=value (repeatable)
        #[arg(long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one object per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse a `key=value` filter
pub(crate) fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}
