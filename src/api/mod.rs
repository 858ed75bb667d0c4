//! HTTP access to the practice-test backend.
//!
//! [`ApiClient`] wraps a shared [`reqwest::Client`] with the base URL and
//! default headers. The typed services in the submodules build on it:
//!
//! - `assistant`: chat assistant (streamed) and stored conversations.
//! - `sessions`: session creation (streamed) and lookup.
//! - `grading`: session, question, and free-response (streamed) grading.
//! - `questions`: question lookup and answer saving.
//! - `users`: sign-up, login, and user lookup.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::stream::framing::{Framer, Framing};
use crate::{AppError, Result};

pub mod assistant;
pub mod grading;
pub mod questions;
pub mod sessions;
pub mod users;

pub use assistant::AssistantService;
pub use grading::GradingService;
pub use questions::QuestionService;
pub use sessions::SessionService;
pub use users::UserService;

/// Header the backend's tunnel requires to skip its browser interstitial.
pub const TUNNEL_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

/// Shared HTTP client for all backend services.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    framing: Framing,
    max_line_bytes: usize,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a configured header is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(TUNNEL_SKIP_HEADER, HeaderValue::from_static("true"));
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| AppError::Config(format!("invalid header name {name:?}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| AppError::Config(format!("invalid header value for {name}: {err}")))?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            framing: config.stream.framing,
            max_line_bytes: config.stream.max_line_bytes,
        })
    }

    /// Backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `/sessions/abc`.
    #[must_use]
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// Fresh line framer for one streamed body.
    #[must_use]
    pub fn framer(&self) -> Framer {
        Framer::new(self.framing, self.max_line_bytes)
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<(), T>(Method::GET, endpoint, None).await
    }

    /// `POST` with an optional JSON body and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<B, T>(&self, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, endpoint, body).await
    }

    /// `PUT` with an optional JSON body and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn put<B, T>(&self, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, endpoint, body).await
    }

    /// `DELETE` a resource and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<(), T>(Method::DELETE, endpoint, None).await
    }

    /// Single-shot JSON request.
    ///
    /// An empty 2xx body decodes as `{}`.
    ///
    /// # Errors
    ///
    /// - `AppError::Transport` on network failure.
    /// - `AppError::Http` on a non-2xx status, carrying the body's `detail`
    ///   field, the status reason, or `HTTP error! status: N`.
    /// - `AppError::Decode` if the body does not match `T`.
    pub async fn request<B, T>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!(%method, url = url.as_str(), "api request");

        let mut builder = self.http.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), url = url.as_str(), "api request failed");
            return Err(AppError::Http {
                status: status.as_u16(),
                message: detail_message(status, &text),
            });
        }

        if text.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Object(serde_json::Map::new()))?);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// `POST` and return the response for streamed consumption.
    ///
    /// # Errors
    ///
    /// - `AppError::Transport` on network failure.
    /// - `AppError::Http` on a non-2xx status, carrying the body text or,
    ///   when the body is empty, the status line.
    pub async fn post_stream<B>(&self, endpoint: &str, body: Option<&B>) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(endpoint);
        debug!(url = url.as_str(), "streamed api request");

        let mut builder = self.http.post(&url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), url = url.as_str(), "streamed request failed");
        let message = if text.trim().is_empty() {
            format!("HTTP error! status: {status}")
        } else {
            text
        };
        Err(AppError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

/// Adapt a response body into the byte stream the decoders consume.
pub fn body_stream(response: Response) -> impl Stream<Item = Result<Bytes>> {
    response
        .bytes_stream()
        .map(|chunk| chunk.map_err(AppError::from))
}

/// Whether a response carries a single JSON document rather than a stream.
#[must_use]
pub fn is_buffered(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("application/json"))
}

fn detail_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());
    match detail {
        Some(Value::String(detail)) if !detail.is_empty() => detail,
        Some(Value::String(_) | Value::Null) | None => status.canonical_reason().map_or_else(
            || format!("HTTP error! status: {}", status.as_u16()),
            str::to_owned,
        ),
        Some(other) => other.to_string(),
    }
}
