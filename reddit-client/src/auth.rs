use crate::{endpoint_url, transport_error, RedditClient, AUTH_TIMEOUT_SECS};
use digest_core::{CoreError, RedditApiError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info};

const ACCESS_TOKEN_PATH: &str = "/api/v1/access_token";

/// Body of the token endpoint. Reddit answers a bad password with a 200 and
/// an `error` field instead of a token, so both are optional here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditAuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub token_type: String,
    /// Informational only; the token is used once, right after issue.
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    fn from_response(response: RedditAuthResponse, issued_at: SystemTime) -> Result<Self, CoreError> {
        let access_token = match (response.access_token, response.error) {
            (Some(token), _) if !token.is_empty() => token,
            (_, Some(reason)) => {
                return Err(RedditApiError::AuthenticationFailed { reason }.into());
            }
            _ => {
                return Err(RedditApiError::InvalidResponse {
                    details: "Token response has no access_token".to_string(),
                }
                .into());
            }
        };

        Ok(Self {
            access_token,
            token_type: response.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at: issued_at + Duration::from_secs(response.expires_in.unwrap_or(0)),
            scope: response
                .scope
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        })
    }
}

impl RedditClient {
    /// Exchanges the account's username and password for a bearer token.
    ///
    /// Any status other than 200 is an authentication failure carrying the
    /// status text. There is no retry and no caching across runs.
    pub async fn get_access_token(&self) -> Result<RedditToken, CoreError> {
        let url = endpoint_url(&self.endpoints.auth_base_url, ACCESS_TOKEN_PATH)?;
        let credentials = &self.credentials;

        info!("Requesting Reddit access token for /u/{}", credentials.username);
        let response = self
            .http_client
            .post(url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header("User-Agent", &self.user_agent)
            .form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .timeout(Duration::from_secs(AUTH_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                error!("Network error requesting access token: {}", e);
                transport_error(e, AUTH_TIMEOUT_SECS)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("Token request failed with status: {}", status);
            return Err(RedditApiError::AuthenticationFailed {
                reason: status.to_string(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, AUTH_TIMEOUT_SECS))?;
        let parsed: RedditAuthResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse token response: {}", e);
            RedditApiError::InvalidResponse {
                details: format!("Failed to parse token response: {}", e),
            }
        })?;

        let token = RedditToken::from_response(parsed, SystemTime::now())?;
        debug!(
            "Token type {} with scope {:?}, expires at {:?}",
            token.token_type, token.scope, token.expires_at
        );
        Ok(token)
    }
}
