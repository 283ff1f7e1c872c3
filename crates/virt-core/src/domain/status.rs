//! Kubernetes `Status` objects, the body the API server sends with errors.

use serde::{Deserialize, Serialize};

/// Reason string the API server uses for missing objects.
pub const REASON_NOT_FOUND: &str = "NotFound";

/// An API `Status` body, e.g.
///
/// ```json
/// {"kind":"Status","apiVersion":"v1","status":"Failure",
///  "message":"virtualmachines \"testvm\" not found","reason":"NotFound","code":404}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub api_version: String,
    /// `"Success"` or `"Failure"`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub code: u16,
}

impl Status {
    /// Builds the failure body the API server returns for a missing object.
    pub fn not_found(plural: &str, name: &str) -> Self {
        Self {
            kind: "Status".to_string(),
            api_version: "v1".to_string(),
            status: "Failure".to_string(),
            message: format!("{plural} \"{name}\" not found"),
            reason: REASON_NOT_FOUND.to_string(),
            code: 404,
        }
    }

    /// True when the body describes a missing object.
    pub fn is_not_found(&self) -> bool {
        self.code == 404 || self.reason == REASON_NOT_FOUND
    }
}

/// Reason the API server would attach to a bare HTTP status code.
///
/// Used when an error response carries no decodable `Status` body.
pub fn reason_for_code(code: u16) -> &'static str {
    match code {
        400 => "BadRequest",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => REASON_NOT_FOUND,
        405 => "MethodNotAllowed",
        409 => "Conflict",
        410 => "Gone",
        422 => "Invalid",
        429 => "TooManyRequests",
        500 => "InternalError",
        503 => "ServiceUnavailable",
        504 => "Timeout",
        _ => "Unknown",
    }
}
