//! Runtime configuration, resolved from CLI flags and environment.

use anyhow::{bail, Result};
use clap::Parser;

/// Command line configuration for ragdesk.
///
/// The backend base URL is deliberately configuration rather than a
/// compile-time constant so the same binary can point at local and
/// deployed backends.
#[derive(Debug, Clone, Parser)]
#[command(name = "ragdesk", version, about = "Desktop client for a RAG knowledge base")]
pub struct Config {
    /// Base URL of the RAG backend service
    #[arg(long, env = "RAGDESK_BACKEND_URL", default_value = "http://localhost:8080")]
    pub backend_url: String,

    /// Tracing filter, e.g. "info" or "ragdesk=debug"
    #[arg(long, env = "RAGDESK_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<()> {
        let url = match reqwest::Url::parse(&self.backend_url) {
            Ok(url) => url,
            Err(err) => bail!("invalid backend URL {:?}: {err}", self.backend_url),
        };
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "backend URL must use http or https, got {:?}",
                self.backend_url
            );
        }
        Ok(())
    }
}
