use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::ApiError;
use crate::config::ApiConfig;
use crate::models::{Identity, Role};
use crate::session::SessionStore;
use crate::utils::http_helpers::{error_detail, log_failed_response, log_transport_failure};

const LOGIN_PATH: &str = "/users/login";
const ME_PATH: &str = "/users/me";

/// The profile the backend returns for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub employee_id: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// HTTP client that attaches the session's bearer token to every call.
///
/// Tokens are read from the [`SessionStore`]; the client never touches the
/// persisted slot itself.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, store: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()
            .map_err(ApiError::Client)?;
        info!("Using backend at {}", config.base_url);
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchanges credentials for a token and installs it in the session store.
    pub async fn login(&self, employee_id: &str, password: &str) -> Result<Identity, ApiError> {
        debug!("Logging in employee '{}'", employee_id);
        let request = self.http.post(self.url(LOGIN_PATH)).form(&[
            ("username", employee_id),
            ("password", password),
            ("grant_type", "password"),
        ]);
        let response = self.send(Method::POST, LOGIN_PATH, request, None).await?;
        let body: LoginResponse = response.json().await?;

        let state = self.store.set_token(Some(body.access_token));
        match state.user {
            Some(identity) => {
                info!(
                    event_name = "session.login",
                    event_domain = "session",
                    username = identity.username.as_str(),
                    "login succeeded"
                );
                Ok(identity)
            }
            None => {
                warn!("Backend issued a token that could not be used for a session");
                Err(ApiError::InvalidToken)
            }
        }
    }

    /// Fetches the backend's profile of the signed-in user.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.get_json(ME_PATH).await
    }

    /// Authenticated GET returning JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (request, sent_token) = self.authorize(self.http.get(self.url(path)));
        let response = self
            .send(Method::GET, path, request, sent_token.as_deref())
            .await?;
        Ok(response.json().await?)
    }

    /// Attaches the live token, returning the one that was sent.
    fn authorize(&self, request: RequestBuilder) -> (RequestBuilder, Option<String>) {
        match self.store.token() {
            Some(token) => (request.bearer_auth(&token), Some(token)),
            None => (request, None),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
        sent_token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                log_transport_failure(method.as_str(), path, &e);
                return Err(e.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log_failed_response(method.as_str(), path, status, &body);
        if status == StatusCode::UNAUTHORIZED {
            if let Some(sent) = sent_token {
                // Only the token that was rejected may end the session.
                if self.store.token().as_deref() == Some(sent) {
                    warn!("Backend rejected the session token; logging out");
                    self.store.logout();
                } else {
                    debug!("Backend rejected a token that is no longer live; ignoring");
                }
            }
        }
        Err(ApiError::Status {
            status,
            detail: error_detail(status, &body),
        })
    }
}
