//! Command-line interface.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::config::ServerConfig;
use crate::entities::medicine::MedicineLookup;
use crate::entities::suggestion::{self, Suggestions};
use crate::error::OpenClinicError;
use crate::sources::openfda::OpenFdaClient;

#[derive(Parser, Debug)]
#[command(
    name = "openclinic",
    version,
    about = "Medicine information lookup backed by openFDA drug labels"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    /// Look up one medicine and print the normalized record as JSON
    Search {
        /// Brand or generic medicine name
        name: String,
    },
    /// Print autocomplete suggestions for a partial name
    Suggest {
        /// Partial medicine name (at least 2 characters)
        query: String,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Address to bind [env: HOST]
    #[arg(long)]
    pub host: Option<String>,
    /// Port to listen on [env: PORT]
    #[arg(long)]
    pub port: Option<u16>,
    /// Directory with the landing page and static assets [env: OPENCLINIC_PUBLIC_DIR]
    #[arg(long)]
    pub public_dir: Option<PathBuf>,
    /// Upstream request timeout in seconds [env: OPENCLINIC_UPSTREAM_TIMEOUT_SECS]
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl ServeArgs {
    /// Layers explicit flags over an environment-derived config.
    pub fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.public_dir {
            config.public_dir = dir;
        }
        if let Some(secs) = self.timeout_secs.filter(|secs| *secs > 0) {
            config.upstream_timeout = std::time::Duration::from_secs(secs);
        }
        config
    }
}

fn not_found_report(query: &str, suggestions: &[String]) -> String {
    let mut out = format!("No information found for \"{query}\".\n");
    for hint in suggestions {
        out.push_str(&format!("  - {hint}\n"));
    }
    out
}

async fn search(name: &str) -> anyhow::Result<String> {
    let config = ServerConfig::from_env();
    let client = OpenFdaClient::new(config.upstream_timeout)?;
    let lookup = MedicineLookup::with_source(Arc::new(client));

    match lookup.search(Some(name)).await {
        Ok(info) => Ok(crate::render::json::to_pretty(&info)?),
        Err(OpenClinicError::NotFound { query, suggestions }) => {
            anyhow::bail!(not_found_report(&query, &suggestions))
        }
        Err(err) => Err(err.into()),
    }
}

/// Runs a one-shot command and returns its stdout text.
///
/// # Errors
///
/// Returns an error when the lookup fails or output cannot be rendered.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    match cli.command {
        Some(Commands::Search { name }) => search(&name).await,
        Some(Commands::Suggest { query }) => Ok(crate::render::json::to_pretty(&Suggestions {
            suggestions: suggestion::suggest(Some(&query)),
        })?),
        Some(Commands::Serve(_)) | None => {
            anyhow::bail!("serve is handled by server::run, not as a one-shot command")
        }
    }
}
