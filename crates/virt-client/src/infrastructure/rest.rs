//! JSON-over-HTTP plumbing for the resource verbs.
//!
//! [`RestClient`] owns one pooled `reqwest::Client` and knows how to turn an
//! API path into a URL below the configured server, attach the bearer token,
//! and map responses:
//!
//! | Response             | Result                                   |
//! |----------------------|------------------------------------------|
//! | 2xx + JSON body      | decoded value (`ApiError::Decode` if not) |
//! | non-2xx + `Status`   | `ApiError::Status` from the body         |
//! | non-2xx + other body | `ApiError::Status`, reason from the code |
//! | no response          | `ApiError::Transport`                    |

use std::fmt;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use virt_core::domain::status::{reason_for_code, REASON_NOT_FOUND};
use virt_core::{ResourceRefError, Status};

use crate::domain::ClientConfig;

/// Why a resource verb failed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The namespace or name cannot be used in a request path.
    #[error("invalid resource target: {0}")]
    InvalidTarget(#[from] ResourceRefError),

    /// The configured server URL does not parse.
    #[error("invalid server URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("API request failed with HTTP {code} ({reason}): {message}")]
    Status {
        code: u16,
        reason: String,
        message: String,
    },

    /// The request never produced a response (connect, TLS, timeout, reset).
    #[error("API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body is not the expected JSON.
    #[error("API response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// True when the server reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::Status { code, reason, .. } => *code == 404 || reason == REASON_NOT_FOUND,
            _ => false,
        }
    }

    /// The HTTP status code, for `Status` errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Thin wrapper around `reqwest::Client` bound to one API server.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

// Hand-written so the token never reaches a log line.
impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base", &self.base.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Builds a client using the server, token and timeouts of `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.server).map_err(|e| ApiError::InvalidUrl {
            url: config.server.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl {
                url: config.server.clone(),
                reason: format!("unsupported scheme {:?}", base.scheme()),
            });
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            http,
            base,
            token: config.token.clone(),
        })
    }

    /// `path` joined below the server URL, keeping any base path.
    pub fn url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{path}"));
        url
    }

    /// Starts a request for `path` with authentication attached.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends `builder` and decodes a JSON body of type `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.execute(builder).await?;
        let body = response.bytes().await.map_err(ApiError::Transport)?;
        serde_json::from_slice(&body).map_err(ApiError::Decode)
    }

    /// Sends `builder` and discards the body of a successful response.
    pub async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.execute(builder).await.map(|_| ())
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        debug!("{} -> {status}", response.url().path());
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let body = response.bytes().await.map_err(ApiError::Transport)?;
        Err(status_error(code, &body))
    }
}

/// Maps an error response to [`ApiError::Status`].
///
/// A Kubernetes `Status` body supplies reason and message; anything else
/// becomes the message verbatim and the reason is derived from `code`.
pub fn status_error(code: u16, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<Status>(body) {
        Ok(status) if status.kind == "Status" || !status.reason.is_empty() => {
            let reason = if status.reason.is_empty() {
                reason_for_code(code).to_string()
            } else {
                status.reason
            };
            ApiError::Status {
                code,
                reason,
                message: status.message,
            }
        }
        _ => ApiError::Status {
            code,
            reason: reason_for_code(code).to_string(),
            message: String::from_utf8_lossy(body).trim().to_string(),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_body_supplies_reason_and_message() {
        // Arrange
        let body = serde_json::to_vec(&Status::not_found("virtualmachines", "testvm")).unwrap();

        // Act
        let err = status_error(404, &body);

        // Assert
        assert!(err.is_not_found());
        match err {
            ApiError::Status { code, reason, message } => {
                assert_eq!(code, 404);
                assert_eq!(reason, "NotFound");
                assert_eq!(message, "virtualmachines \"testvm\" not found");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_body_falls_back_to_code_reason() {
        let err = status_error(409, b"already exists\n");

        match err {
            ApiError::Status { code, reason, message } => {
                assert_eq!(code, 409);
                assert_eq!(reason, "Conflict");
                assert_eq!(message, "already exists");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn test_unrelated_json_is_not_mistaken_for_status() {
        let err = status_error(500, br#"{"error":"boom"}"#);

        assert_eq!(err.status_code(), Some(500));
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("InternalError"));
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = RestClient::new(&ClientConfig::new("http://gateway.local/k8s/")).unwrap();

        let url = client.url("/apis/kubevirt.io/v1alpha1/namespaces/default/virtualmachines");

        assert_eq!(
            url.as_str(),
            "http://gateway.local/k8s/apis/kubevirt.io/v1alpha1/namespaces/default/virtualmachines"
        );
    }

    #[test]
    fn test_new_rejects_websocket_scheme() {
        let result = RestClient::new(&ClientConfig::new("ws://127.0.0.1:8001"));
        assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));
    }

    #[test]
    fn test_debug_output_redacts_token() {
        let client = RestClient::new(&ClientConfig::default().with_token("s3cr3t-token")).unwrap();

        let printed = format!("{client:?}");

        assert!(!printed.contains("s3cr3t-token"), "token leaked: {printed}");
    }

    #[test]
    fn test_invalid_target_is_not_not_found() {
        let err = ApiError::from(ResourceRefError::EmptyName);
        assert!(!err.is_not_found());
        assert_eq!(err.status_code(), None);
    }
}
