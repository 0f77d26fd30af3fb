//! Operator identity and the login exchange.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name used when the operator does not provide one.
pub const DEFAULT_OPERATOR: &str = "operador";

/// Display name of the human using the client.
///
/// Never empty: blank input falls back to [`DEFAULT_OPERATOR`].
///
/// # Examples
///
/// ```
/// use starlaunch_models::OperatorName;
///
/// assert_eq!(OperatorName::new("  ana ").as_str(), "ana");
/// assert_eq!(OperatorName::new("").as_str(), "operador");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperatorName(String);

impl OperatorName {
    /// Normalise a raw name.
    pub fn new(name: &str) -> Self {
        match name.trim() {
            "" => Self(DEFAULT_OPERATOR.to_string()),
            trimmed => Self(trimmed.to_string()),
        }
    }

    /// Normalise an optional raw name.
    pub fn or_default(name: Option<&str>) -> Self {
        Self::new(name.unwrap_or_default())
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OperatorName {
    fn default() -> Self {
        Self(DEFAULT_OPERATOR.to_string())
    }
}

impl fmt::Display for OperatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /login`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Requested operator name.
    pub username: String,
}

/// Response of `POST /login`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// Operator name confirmed by the server.
    pub operator: String,
    /// Opaque session token; carried but not enforced by the client.
    #[serde(default)]
    pub token: Option<String>,
}
