//! Remote store collaborator: the four-operation contract and its blocking
//! HTTP implementation.
//!
//! The transport is deliberately thin. Values crossing this boundary are
//! already encrypted on write paths and still encrypted on read paths; the
//! facade runs the tree transform on either side.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::protocol::{ApiBody, DestroyRequest, Outcome, StoreRequest, UpdateRequest};

/// Environment variable holding the API bearer token.
pub const API_TOKEN_ENV: &str = "PORTADATA_API_TOKEN";

/// Errors raised inside the HTTP transport before an [`Outcome`] exists.
///
/// These never escape the crate: every trait method folds them into a
/// `code: 0` failure outcome.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The API token source is absent or empty.
    #[error("{API_TOKEN_ENV} environment variable not set")]
    TokenMissing,

    /// The configured base URL cannot address the requested endpoint.
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// The request could not be sent or the response body could not be read.
    #[error("request failed: {0}")]
    Transport(String),
}

impl From<RemoteError> for Outcome {
    fn from(e: RemoteError) -> Self {
        Outcome::failure(0, e.to_string())
    }
}

/// The remote store's four operations.
///
/// Each returns the uniform [`Outcome`] record; transport failures surface as
/// `code: 0` failures rather than errors.
#[cfg_attr(test, mockall::automock)]
pub trait RemoteStore {
    /// Fetch a record (or one attribute of it).
    fn show<'a>(&self, key: &str, attribute: Option<&'a str>) -> Outcome;

    /// Store a new record with an already-encrypted value tree.
    fn store(&self, key: &str, value: &Value) -> Outcome;

    /// Replace a record (`partial = false`) or merge an attribute map into it
    /// (`partial = true`). `value` is already encrypted.
    fn update(&self, key: &str, value: &Value, partial: bool) -> Outcome;

    /// Destroy a record, or only the named attributes when given.
    fn destroy<'a>(&self, key: &str, attributes: Option<&'a [String]>) -> Outcome;
}

/// Blocking HTTP implementation of [`RemoteStore`].
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    base_url: Url,
    http: Client,
}

impl HttpRemoteStore {
    /// Build the HTTP transport from a validated [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL does not parse or the underlying
    /// HTTP client cannot be constructed.
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        use anyhow::Context;

        let base_url = Url::parse(cfg.api_url.trim_end_matches('/'))
            .with_context(|| format!("invalid API URL: {}", cfg.api_url))?;
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.request_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(cfg.connect_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base_url, http })
    }

    /// Join path segments onto the base URL. Segments are percent-encoded,
    /// so record keys are safe to embed in paths.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| RemoteError::InvalidUrl(self.base_url.to_string()))?;
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Attach the bearer token and JSON accept header.
    fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder, RemoteError> {
        let token = load_token()?;
        Ok(req.bearer_auth(token).header(ACCEPT, "application/json"))
    }

    /// Send a request and fold the response into an [`Outcome`].
    fn dispatch(&self, op: &'static str, req: RequestBuilder) -> Result<Outcome, RemoteError> {
        debug!(op, "remote request");
        let resp = self
            .authed(req)?
            .send()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(outcome_from_parts(status, &body))
    }

    fn try_show(&self, key: &str, attribute: Option<&str>) -> Result<Outcome, RemoteError> {
        let mut url = self.endpoint(&["show", key])?;
        if let Some(attribute) = attribute {
            url.query_pairs_mut().append_pair("attribute", attribute);
        }
        self.dispatch("show", self.http.get(url))
    }

    fn try_store(&self, key: &str, value: &Value) -> Result<Outcome, RemoteError> {
        let url = self.endpoint(&["store"])?;
        let body = StoreRequest {
            key: key.to_owned(),
            value: value.clone(),
        };
        self.dispatch("store", self.http.post(url).json(&body))
    }

    fn try_update(&self, key: &str, value: &Value, partial: bool) -> Result<Outcome, RemoteError> {
        let url = self.endpoint(&["update"])?;
        let body = if partial {
            UpdateRequest {
                key: key.to_owned(),
                value: None,
                attributes: Some(value.clone()),
            }
        } else {
            UpdateRequest {
                key: key.to_owned(),
                value: Some(value.clone()),
                attributes: None,
            }
        };
        self.dispatch("update", self.http.put(url).json(&body))
    }

    fn try_destroy(&self, key: &str, attributes: Option<&[String]>) -> Result<Outcome, RemoteError> {
        let url = self.endpoint(&["destroy"])?;
        let body = DestroyRequest {
            key: key.to_owned(),
            attributes: attributes.map(<[String]>::to_vec),
        };
        self.dispatch("destroy", self.http.delete(url).json(&body))
    }
}

impl RemoteStore for HttpRemoteStore {
    fn show(&self, key: &str, attribute: Option<&str>) -> Outcome {
        self.try_show(key, attribute).unwrap_or_else(fold_error)
    }

    fn store(&self, key: &str, value: &Value) -> Outcome {
        self.try_store(key, value).unwrap_or_else(fold_error)
    }

    fn update(&self, key: &str, value: &Value, partial: bool) -> Outcome {
        self.try_update(key, value, partial).unwrap_or_else(fold_error)
    }

    fn destroy(&self, key: &str, attributes: Option<&[String]>) -> Outcome {
        self.try_destroy(key, attributes).unwrap_or_else(fold_error)
    }
}

fn fold_error(e: RemoteError) -> Outcome {
    warn!(error = %e, "remote operation failed before a response was read");
    e.into()
}

/// Read the bearer token, checked per call like the encryption key.
fn load_token() -> Result<String, RemoteError> {
    match std::env::var(API_TOKEN_ENV) {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => Err(RemoteError::TokenMissing),
    }
}

/// Map an HTTP status and response body to the uniform outcome record.
///
/// `200` is the only success status; its body may carry a `value`. Any other
/// status is a failure whose `error` text comes from the body when present.
fn outcome_from_parts(status: u16, body: &str) -> Outcome {
    let parsed: ApiBody = serde_json::from_str(body).unwrap_or_default();
    if status == 200 {
        Outcome::success(status, parsed.value.unwrap_or(Value::Null))
    } else {
        let error = parsed
            .error
            .unwrap_or_else(|| "API request failed".to_owned());
        Outcome::failure(status, error)
    }
}
