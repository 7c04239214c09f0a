use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::{
    decode::decode_json,
    options::DEFAULT_BASE_URL,
    request::build_url,
    retry::RetryPolicy,
    sleeper::{Sleeper, TokioSleeper},
    ApiResponse, ClientOptions, QiibraryError, RequestDescriptor, Result,
};

#[derive(Clone)]
/// HTTP client for the Qiibrary ranking API.
///
/// Configuration is fixed at construction; clones share the underlying
/// connection pool and can be used from any number of tasks.
pub struct QiibraryClient {
    http: reqwest::Client,
    base_url: String,
    options: ClientOptions,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for QiibraryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QiibraryClient")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .field("sleeper", &self.sleeper)
            .finish()
    }
}

impl Default for QiibraryClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl QiibraryClient {
    /// Creates a client for the API at `base_url` with default options.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            options: ClientOptions::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `API_BASE_URL` — API host, defaults to `http://localhost:8000`
    /// - `API_TIMEOUT_MS` — optional per-request timeout in milliseconds
    ///
    /// Returns an error if a variable is set but empty or malformed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use qiibrary_http::QiibraryClient;
    ///
    /// let api = QiibraryClient::from_env().expect("invalid API_* env vars");
    /// ```
    pub fn from_env() -> Result<Self> {
        let base_url = match std::env::var("API_BASE_URL") {
            Ok(url) if url.trim().is_empty() => {
                return Err(QiibraryError::Config(
                    "API_BASE_URL is set but empty".to_owned(),
                ))
            }
            Ok(url) => url.trim().to_owned(),
            Err(_) => DEFAULT_BASE_URL.to_owned(),
        };

        let mut options = ClientOptions::default();
        if let Ok(raw) = std::env::var("API_TIMEOUT_MS") {
            options.timeout_ms = parse_timeout_ms(&raw)?;
        }

        Ok(Self::new(base_url).with_options(options))
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Replaces the sleeper that applies retry backoff.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Retry policy derived from the current options.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.options.max_retries,
            Duration::from_millis(self.options.retry_backoff_ms),
        )
        .with_sleeper(Arc::clone(&self.sleeper))
    }

    /// Performs exactly one attempt, without retries.
    ///
    /// A 2xx status yields the raw response; any other status becomes
    /// [`QiibraryError::Http`], and a missing response becomes
    /// [`QiibraryError::Transport`].
    pub async fn request(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse> {
        let url = build_url(&self.base_url, descriptor)?;

        let timeout = descriptor
            .timeout
            .unwrap_or_else(|| Duration::from_millis(self.options.timeout_ms));

        let caller_content_type = descriptor
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str()));

        #[cfg(feature = "tracing")]
        tracing::debug!(method = %descriptor.method, url = %url, "sending request");

        let mut builder = self
            .http
            .request(descriptor.method.clone(), url)
            .timeout(timeout);
        if !caller_content_type {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if !descriptor.query.is_empty() {
            builder = builder.query(&descriptor.query);
        }
        for (name, value) in &descriptor.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &descriptor.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(QiibraryError::Transport)?;
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            // The status line already arrived, so the status decides retryability.
            Err(err) if !status.is_success() => {
                return Err(QiibraryError::Http {
                    status: status.as_u16(),
                    body: format!("<unreadable body: {err}>"),
                })
            }
            Err(err) => return Err(QiibraryError::Transport(err)),
        };

        if !status.is_success() {
            return Err(QiibraryError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// Performs a request with bounded exponential-backoff retries.
    ///
    /// Only use this for requests that are safe to repeat.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse> {
        self.retry_policy()
            .run(|| self.request(descriptor), None)
            .await
    }

    /// Like [`QiibraryClient::send`], but gives up with
    /// [`QiibraryError::Cancelled`] once `cancel` fires.
    pub async fn send_with_cancel(
        &self,
        descriptor: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        self.retry_policy()
            .run(|| self.request(descriptor), Some(cancel))
            .await
    }

    /// Sends `descriptor` with retries and decodes the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T> {
        let response = self.send(descriptor).await?;
        decode_json(&response, &descriptor.path)
    }
}

fn parse_timeout_ms(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(QiibraryError::Config(format!(
            "API_TIMEOUT_MS must be a positive integer, got '{raw}'"
        ))),
        Ok(value) => Ok(value),
    }
}
