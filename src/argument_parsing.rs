use std::time::Duration;

use clap::Parser;

use crate::config::{ConfigError, RemoteConfig};
use crate::service::{DEFAULT_SUBQUERY_TIMEOUT, DEFAULT_WEEK_CONCURRENCY, QuerySettings};

/// Aggregate deal counts from the Vista CRM over trailing weeks and months
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Remote store base URL
    #[arg(short, long, env = "VISTAHOST_BASE_URL")]
    pub base_url: Option<String>,

    /// Remote store access key
    #[arg(short, long, env = "VISTAHOST_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Address to listen on
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "127.0.0.1:3000")]
    pub listen: String,

    /// Per sub-query timeout in seconds
    #[arg(
        short,
        long,
        env = "SUBQUERY_TIMEOUT_SECS",
        default_value_t = DEFAULT_SUBQUERY_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Daily sub-queries in flight at once in week mode
    #[arg(short, long, env = "WEEK_CONCURRENCY", default_value_t = DEFAULT_WEEK_CONCURRENCY)]
    pub concurrency: usize,
}

impl Args {
    pub fn remote_config(&self) -> Result<RemoteConfig, ConfigError> {
        RemoteConfig::new(
            self.base_url.as_deref(),
            self.key.as_deref(),
            Duration::from_secs(self.timeout_secs),
        )
    }

    pub fn query_settings(&self) -> QuerySettings {
        QuerySettings {
            per_query_timeout: Duration::from_secs(self.timeout_secs),
            week_concurrency: self.concurrency,
        }
    }
}
