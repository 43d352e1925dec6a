//! Existence probes against the file host.

use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{CONTENT_LENGTH, LAST_MODIFIED};
use reqwest::Url;

/// Metadata read from a successful probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeHit {
    pub content_length: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Result of probing one candidate. A network error and a 404 are both
/// `Missing`; callers cannot and need not tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Found(ProbeHit),
    Missing { reason: String },
}

impl ProbeOutcome {
    pub fn missing(reason: impl Into<String>) -> Self {
        ProbeOutcome::Missing {
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &Url) -> ProbeOutcome;
}

/// HEAD-request prober.
#[derive(Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &Url) -> ProbeOutcome {
        let response = match self.client.head(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::missing(e.to_string()),
        };
        let status = response.status();
        if !status.is_success() {
            return ProbeOutcome::missing(format!("status {}", status));
        }

        // Read the header itself: for HEAD responses the body length is 0.
        let headers = response.headers();
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let last_modified = headers
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date);

        ProbeOutcome::Found(ProbeHit {
            content_length,
            last_modified,
        })
    }
}

/// Parse an HTTP date.
///
/// Accepts the IMF-fixdate form (`Wed, 01 Jan 2025 00:00:00 GMT`) plus the
/// two obsolete forms recipients must still read: RFC 850
/// (`Wednesday, 01-Jan-25 00:00:00 GMT`) and asctime
/// (`Wed Jan  1 00:00:00 2025`).
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%A, %d-%b-%y %H:%M:%S GMT") {
        return Some(naive.and_utc());
    }
    // asctime pads single-digit days with a space
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&collapsed, "%a %b %d %H:%M:%S %Y")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `base` with `filename` appended as a single percent-encoded path segment.
pub fn resolve_candidate_url(base: &Url, filename: &str) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::ConfigError(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .push(filename);
    Ok(url)
}
