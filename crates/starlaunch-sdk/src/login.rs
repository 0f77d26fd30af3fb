//! Operator login against the control API.

use starlaunch_models::{LoginRequest, LoginResponse, OperatorName};
use tracing::info;

use crate::api::{failure_reason, ApiClient};
use crate::error::SdkError;

/// Outcome of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    /// Name confirmed by the server.
    pub name: OperatorName,
    /// Opaque token; kept for display, not enforced.
    pub token: Option<String>,
}

/// Maps a username to an operator identity via `POST /login`.
#[derive(Debug, Clone)]
pub struct OperatorLogin {
    api: ApiClient,
}

impl OperatorLogin {
    /// Wrap an API client.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Log in as `username`; a blank name logs in as the default operator.
    pub async fn login(&self, username: &str) -> Result<Operator, SdkError> {
        let requested = OperatorName::new(username);
        let res = self
            .api
            .http()
            .post(self.api.url("/login"))
            .json(&LoginRequest {
                username: requested.to_string(),
            })
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(SdkError::ServerRejection(failure_reason(res).await));
        }
        let body: LoginResponse = res.json().await?;
        let operator = Operator {
            name: OperatorName::new(&body.operator),
            token: body.token,
        };
        info!(operator = %operator.name, "operator logged in");
        Ok(operator)
    }
}
