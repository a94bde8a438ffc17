//! HTTP client for the APM API

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

use crate::error::{MswywError, Result};
use crate::observability::RunMetrics;

/// Requests that take longer than this are abandoned
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(4);

/// Path prefix of the APM API below the Kibana base URL
const API_SEGMENTS: [&str; 4] = ["s", "apm", "api", "apm"];

/// Connection parameters for the monitoring backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Kibana base URL (e.g., "https://kibana.internal:5601")
    pub base_url: String,
    pub user: String,
    pub password: String,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(
        base_url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            user: user.into(),
            password: password.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Pipeline stage a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Containers,
    Services,
    Charts,
    TransactionGroups,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Containers => "containers",
            Stage::Services => "services",
            Stage::Charts => "charts",
            Stage::TransactionGroups => "transaction_groups",
        }
    }
}

/// Basic-auth GET client for the APM API
pub struct ApmClient {
    client: Client,
    base_url: Url,
    user: String,
    password: String,
    metrics: RunMetrics,
}

impl ApmClient {
    pub fn new(config: BackendConfig, metrics: RunMetrics) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MswywError::backend(&config.base_url, e))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| MswywError::backend(&config.base_url, format!("invalid base URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            user: config.user,
            password: config.password,
            metrics,
        })
    }

    /// Build an API URL from path segments below the APM prefix
    ///
    /// Segments and query values are percent-encoded by `url`.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MswywError::backend(self.base_url.as_str(), "base URL cannot hold a path"))?
            .pop_if_empty()
            .extend(API_SEGMENTS)
            .extend(segments);

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// GET a URL and decode its JSON body
    ///
    /// Transport failures and non-success statuses become
    /// `BackendUnavailable`; an unexpected body shape is `MalformedData`.
    pub async fn get_json<T: DeserializeOwned>(&self, stage: Stage, url: &Url) -> Result<T> {
        let started = Instant::now();
        let outcome = self.fetch(url).await;
        self.metrics.observe_request(
            stage.as_str(),
            outcome.is_ok(),
            started.elapsed().as_secs_f64(),
        );

        let body = outcome.map_err(|e| {
            warn!(stage = stage.as_str(), url = %url, error = %e, "Backend request failed");
            e
        })?;

        serde_json::from_slice(&body).map_err(|e| MswywError::malformed(url.as_str(), e))
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .await
            .map_err(|e| MswywError::backend(url.as_str(), describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MswywError::backend(
                url.as_str(),
                format!("response error {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MswywError::backend(url.as_str(), describe_transport_error(&e)))?;
        Ok(body.to_vec())
    }
}

/// Keep the flavour of a transport failure in the message only
fn describe_transport_error(e: &reqwest::Error) -> String {
    let kind = if e.is_timeout() {
        "read timeout"
    } else if e.is_connect() {
        "connection error"
    } else if e.is_body() || e.is_decode() {
        "encoding error"
    } else {
        "transport error"
    };
    format!("{kind}: {e}")
}
