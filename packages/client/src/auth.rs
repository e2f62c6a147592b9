//! HTTP calls for registration and login.

use hiroba_server::infrastructure::dto::http::{ErrorDto, RegisterRequest, TokenResponse};
use reqwest::StatusCode;

use crate::error::ClientError;

pub struct AuthClient {
    http: reqwest::Client,
    api_url: String,
}

impl AuthClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Register a new account. An existing account with the same name is not an error.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/auth/register", self.api_url))
            .json(&RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

        match response.status() {
            StatusCode::CREATED => {
                tracing::info!("Registered '{}'", username);
                Ok(())
            }
            StatusCode::CONFLICT => {
                tracing::info!("'{}' is already registered", username);
                Ok(())
            }
            status => Err(ClientError::RegistrationFailed(
                error_detail(response, status).await,
            )),
        }
    }

    /// Exchange username and password for an access token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(format!("{}/auth/token", self.api_url))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let token: TokenResponse = response
                    .json()
                    .await
                    .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
                Ok(token.access_token)
            }
            StatusCode::UNAUTHORIZED => Err(ClientError::LoginFailed(
                "incorrect username or password".to_string(),
            )),
            status if status.is_server_error() => Err(ClientError::ConnectionError(
                error_detail(response, status).await,
            )),
            status => Err(ClientError::LoginFailed(error_detail(response, status).await)),
        }
    }
}

async fn error_detail(response: reqwest::Response, status: StatusCode) -> String {
    match response.json::<ErrorDto>().await {
        Ok(body) => body.detail,
        Err(_) => status.to_string(),
    }
}
