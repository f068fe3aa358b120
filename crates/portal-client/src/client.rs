//! HTTP client for the remote auth API.

use std::sync::{OnceLock, Weak};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use portal_core::config::ApiConfig;
use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::traits::{AccessTokenSource, PermissionLookup, RenewalEndpoint};
use portal_core::types::{TokenPair, UserRole};

use crate::wire::{ErrorBody, PermissionCheckRequest, PermissionCheckResponse, RefreshRequest};

/// Calls the renewal, logout and permission endpoints over HTTP.
///
/// Requests carry `Authorization: Bearer <access>` once a token source is
/// bound and has a token.
pub struct HttpAuthClient {
    http: reqwest::Client,
    config: ApiConfig,
    token_source: OnceLock<Weak<dyn AccessTokenSource>>,
}

impl std::fmt::Debug for HttpAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAuthClient")
            .field("base_url", &self.config.base_url)
            .field("timeout_seconds", &self.config.timeout_seconds)
            .finish()
    }
}

impl HttpAuthClient {
    /// Builds a client with the configured request timeout.
    pub fn new(config: ApiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;
        Ok(Self {
            http,
            config,
            token_source: OnceLock::new(),
        })
    }

    /// Binds the source of the bearer token. Only the first bind takes
    /// effect. The source is held weakly so it may own this client.
    pub fn bind_token_source(&self, source: Weak<dyn AccessTokenSource>) {
        if self.token_source.set(source).is_err() {
            warn!("Token source already bound, ignoring");
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(path, body).await?;
        let url = response.url().to_string();
        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Invalid response payload from {url}: {e}"),
                e,
            )
        })
    }

    async fn send<B>(&self, path: &str, body: &B) -> AppResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.url(path);
        let request = self.authorize(self.http.post(&url).json(body)).await;

        debug!(url = %url, "POST");
        let response = request.send().await.map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(&url, status, &body))
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let source = self.token_source.get().and_then(Weak::upgrade);
        match source {
            Some(source) => match source.access_token().await {
                Some(token) => request.bearer_auth(token),
                None => request,
            },
            None => request,
        }
    }
}

#[async_trait]
impl RenewalEndpoint for HttpAuthClient {
    async fn renew(&self, refresh_token: &str) -> AppResult<TokenPair> {
        if refresh_token.is_empty() {
            return Err(AppError::missing_credential("No refresh token available"));
        }
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.post(&self.config.refresh_path, &body).await
    }

    async fn revoke(&self, refresh_token: &str) -> AppResult<()> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.send(&self.config.logout_path, &body).await.map(|_| ())
    }
}

#[async_trait]
impl PermissionLookup for HttpAuthClient {
    async fn check(&self, route_path: &str, role: UserRole) -> AppResult<bool> {
        let body = PermissionCheckRequest {
            route_path: route_path.to_string(),
            role: role.as_str().to_string(),
        };
        let answer: PermissionCheckResponse =
            self.post(&self.config.permission_path, &body).await?;
        Ok(answer.has_access)
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::with_source(ErrorKind::Timeout, format!("Request to {url} timed out"), e)
    } else {
        AppError::with_source(
            ErrorKind::ExternalService,
            format!("Request to {url} failed: {e}"),
            e,
        )
    }
}

fn status_error(url: &str, status: StatusCode, body: &str) -> AppError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Authentication,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ErrorKind::Timeout,
        _ => ErrorKind::ExternalService,
    };
    AppError::new(
        kind,
        format!("{url} returned {status}: {}", ErrorBody::describe(body)),
    )
}
