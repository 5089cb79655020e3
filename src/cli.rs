//! CLI argument parsing, validation, and startup helpers.

use clap::Parser;
use tracing::{error, info};
use url::Url;

use crate::commands::Command;
use crate::store::SqliteStore;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug)]
#[command(
    name = "contentdesk",
    about = "Terminal admin console for multilingual site content"
)]
pub struct Args {
    /// Origin of the content-admin API (full URL)
    #[arg(
        long,
        env = "CONTENTDESK_API_ORIGIN",
        default_value = "http://localhost:4000"
    )]
    pub api_origin: String,

    /// Path to the SQLite session store
    #[arg(short, long, default_value = "contentdesk.db")]
    pub database: String,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Parse and validate the api-origin URL. Bearer tokens travel on every
/// request, so anything off localhost must be HTTPS.
/// Returns None and logs an error if validation fails.
pub fn validate_api_origin(origin: &str) -> Option<Url> {
    let url = match Url::parse(origin) {
        Ok(url) => url,
        Err(e) => {
            error!(origin = %origin, error = %e, "Invalid api-origin URL");
            return None;
        }
    };

    let is_https = url.scheme() == "https";
    let is_localhost = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"));

    if !is_https && !is_localhost {
        error!("api-origin must use HTTPS for non-localhost deployments");
        return None;
    }

    Some(url)
}

/// Open the session store, logging errors if it fails.
pub async fn open_store(path: &str) -> Option<SqliteStore> {
    match SqliteStore::open(path).await {
        Ok(store) => {
            info!(path = %path, "Session store opened");
            Some(store)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open session store");
            None
        }
    }
}
