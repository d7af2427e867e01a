//! Login shim for the external identity provider.
//!
//! # Design
//! Three handlers (`/login`, `/callback`, `/logout`) plus an opt-in bearer
//! guard. None of them keep session state: login `state` values are signed
//! rather than stored, and the callback hands the provider's token JSON
//! straight back to the caller. `IdentityService` executes the plain-data
//! requests built by [`IdentityClient`] over a shared reqwest client.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use todo_core::{
    HttpMethod, HttpRequest, HttpResponse, IdentityClient, StateSigner, TokenSet, UserInfo,
};

use crate::{error::AppError, AppState};

pub struct IdentityService {
    client: IdentityClient,
    signer: StateSigner,
    http: reqwest::Client,
}

impl IdentityService {
    pub fn new(client: IdentityClient, signer: StateSigner) -> Self {
        Self {
            client,
            signer,
            http: reqwest::Client::new(),
        }
    }

    /// Provider login URL carrying a freshly signed `state`.
    pub fn login_url(&self) -> Result<String, AppError> {
        let state = self.signer.issue(&rand::random::<[u8; 16]>());
        Ok(self.client.authorization_url(&state)?)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, AppError> {
        let request = self.client.build_token_request(code)?;
        let response = self.execute(request).await?;
        Ok(self.client.parse_token_response(response)?)
    }

    pub async fn user_info(&self, access_token: &str) -> Result<UserInfo, AppError> {
        let request = self.client.build_userinfo_request(access_token);
        let response = self.execute(request).await?;
        Ok(self.client.parse_userinfo_response(response)?)
    }

    /// Perform the round-trip. Any HTTP status comes back as data; only
    /// transport failures become errors here.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, AppError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&request.url),
            HttpMethod::Post => self.http.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;
        tracing::debug!(url = %request.url, status, "identity provider replied");
        Ok(HttpResponse { status, body })
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", get(logout))
}

async fn login(State(identity): State<Arc<IdentityService>>) -> Result<Response, AppError> {
    let url = identity.login_url()?;
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// Exchange the code, look the user up once, and return the raw token JSON.
/// Nothing is persisted.
async fn callback(
    State(identity): State<Arc<IdentityService>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<Value>, AppError> {
    let state = params
        .state
        .ok_or_else(|| AppError::Validation("missing `state` query parameter".to_string()))?;
    identity.signer.verify(&state)?;
    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::Validation("missing `code` query parameter".to_string()))?;

    let token = identity.exchange_code(&code).await?;
    let user = identity.user_info(&token.access_token).await?;
    tracing::info!(sub = %user.sub, username = ?user.preferred_username, "login completed");
    Ok(Json(token.raw))
}

async fn logout() -> &'static str {
    "Logged out successfully"
}

/// Reject mutating requests that lack a bearer token the provider accepts.
/// Reads pass through untouched.
pub async fn require_bearer(
    State(identity): State<Arc<IdentityService>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

    match identity.user_info(&token).await {
        Ok(user) => {
            tracing::debug!(sub = %user.sub, "bearer token accepted");
            Ok(next.run(request).await)
        }
        Err(AppError::UpstreamRejected(_)) => {
            Err(AppError::Unauthorized("invalid bearer token".to_string()))
        }
        Err(err) => Err(err),
    }
}
