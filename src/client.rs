//! Client for the remote record store's `negocios/listar` endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::{Deserializer, Error as _};
use tracing::debug;

use crate::config::RemoteConfig;
use crate::date_window::DateRange;
use crate::query::RemoteQuery;

/// Pipeline the aggregate queries run against.
pub const PIPELINE_CODE: &str = "1";

const BODY_SNIPPET_CHARS: usize = 200;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RemoteError {
    #[error("request to the remote store failed: {0}")]
    Transport(String),

    #[error("remote store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("remote store responded with status {status}")]
    UpstreamStatus { status: u16 },

    #[error("could not decode remote store response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::UpstreamStatus { .. } => "upstream_status",
            Self::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Aggregate fields reported by the store alongside a listing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RemoteTotals {
    /// Number of matching records. Absent or null counts as 0.
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: u64,

    /// Monetary total, forwarded as the store sent it.
    #[serde(default, rename = "valorTotal", deserialize_with = "present_value")]
    pub value: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Integer(u64),
    Float(f64),
    Text(String),
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<Numeric>::deserialize(deserializer)? {
        None => return Ok(0),
        Some(raw) => raw,
    };
    let count = match raw {
        Numeric::Integer(n) => Some(n),
        Numeric::Float(f) => whole_count(f),
        Numeric::Text(ref s) if s.trim().is_empty() => Some(0),
        Numeric::Text(ref s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_count))
        }
    };
    count.ok_or_else(|| D::Error::custom("`total` is not a non-negative whole number"))
}

fn whole_count(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok((!value.is_null()).then_some(value))
}

/// Decode a `negocios/listar` response body.
pub fn decode_totals(body: &str) -> Result<RemoteTotals, RemoteError> {
    serde_json::from_str(body).map_err(|e| {
        let snippet: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
        RemoteError::Decode(format!("{e}; body starts with {snippet:?}"))
    })
}

/// Anything that can count records by stage, status and start-date window.
///
/// Implementations neither retry nor swallow failures.
pub trait RecordStore: Send + Sync {
    fn query(
        &self,
        stage: &str,
        status: &str,
        range: DateRange,
    ) -> impl Future<Output = Result<RemoteTotals, RemoteError>> + Send;
}

/// HTTP client for the Vista CRM API.
#[derive(Clone, Debug)]
pub struct VistaClient {
    http: reqwest::Client,
    endpoint: Url,
    access_key: String,
}

impl VistaClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let endpoint = Url::parse(&format!("{}/negocios/listar", config.base_url()))
            .map_err(|e| RemoteError::Transport(format!("invalid endpoint: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            endpoint,
            access_key: config.access_key().to_owned(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full request URL, access key included.
    pub fn request_url(&self, query: &RemoteQuery) -> Result<Url, RemoteError> {
        let pesquisa = query
            .to_json()
            .map_err(|e| RemoteError::Transport(format!("could not encode query: {e}")))?;

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.access_key)
            .append_pair("codigo_pipe", PIPELINE_CODE)
            .append_pair("showtotal", "1")
            .append_pair("pesquisa", &pesquisa);
        Ok(url)
    }
}

impl RecordStore for VistaClient {
    async fn query(
        &self,
        stage: &str,
        status: &str,
        range: DateRange,
    ) -> Result<RemoteTotals, RemoteError> {
        let query = RemoteQuery::new(stage, status, range);
        let url = self.request_url(&query)?;
        debug!(stage, status, window = %range, "querying remote store");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status_code = response.status();
        if !status_code.is_success() {
            return Err(RemoteError::UpstreamStatus {
                status: status_code.as_u16(),
            });
        }

        let body = response.text().await?;
        decode_totals(&body)
    }
}
