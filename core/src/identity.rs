//! Stateless request builder and response parser for the identity provider.
//!
//! # Design
//! `IdentityClient` holds only the provider coordinates and carries no
//! mutable state between calls. The two provider round-trips of the login
//! callback (code exchange, userinfo) are each split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The server executes the round-trip in between.
//!
//! Endpoints follow the Keycloak layout:
//! `{base}/realms/{realm}/protocol/openid-connect/{auth,token,userinfo}`.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::IdentityError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Static coordinates of the OAuth2 client registered with the provider.
#[derive(Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("base_url", &self.base_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Token endpoint reply. `raw` is the provider's JSON exactly as received.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub raw: Value,
}

/// Subset of the OpenID Connect userinfo claims the service reads.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub sub: String,
    pub preferred_username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdentityClient {
    config: IdentityConfig,
    endpoint_base: String,
}

impl IdentityClient {
    /// Validate the configured URLs and derive the realm's endpoint prefix.
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| IdentityError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(IdentityError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                config.base_url
            )));
        }
        Url::parse(&config.redirect_uri)
            .map_err(|e| IdentityError::InvalidUrl(format!("{}: {e}", config.redirect_uri)))?;

        let endpoint_base = format!(
            "{}/realms/{}/protocol/openid-connect",
            config.base_url.trim_end_matches('/'),
            config.realm
        );
        Ok(Self {
            config,
            endpoint_base,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    /// URL of the provider's login page for this client.
    pub fn authorization_url(&self, state: &str) -> Result<String, IdentityError> {
        let url = Url::parse_with_params(
            &format!("{}/auth", self.endpoint_base),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", "openid"),
                ("state", state),
            ],
        )
        .map_err(|e| IdentityError::InvalidUrl(e.to_string()))?;
        Ok(url.into())
    }

    pub fn build_token_request(&self, code: &str) -> Result<HttpRequest, IdentityError> {
        let body = serde_urlencoded::to_string([
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ])
        .map_err(|e| IdentityError::Serialization(e.to_string()))?;

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/token", self.endpoint_base),
            headers: vec![
                (
                    "content-type".to_string(),
                    "application/x-www-form-urlencoded".to_string(),
                ),
                ("accept".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }

    pub fn parse_token_response(&self, response: HttpResponse) -> Result<TokenSet, IdentityError> {
        check_status(&response)?;
        let raw: Value = serde_json::from_str(&response.body)
            .map_err(|e| IdentityError::Deserialization(e.to_string()))?;
        let access_token = raw
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| IdentityError::Deserialization("missing access_token".to_string()))?
            .to_string();
        Ok(TokenSet { access_token, raw })
    }

    pub fn build_userinfo_request(&self, access_token: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/userinfo", self.endpoint_base),
            headers: vec![
                ("authorization".to_string(), format!("Bearer {access_token}")),
                ("accept".to_string(), "application/json".to_string()),
            ],
            body: None,
        }
    }

    pub fn parse_userinfo_response(&self, response: HttpResponse) -> Result<UserInfo, IdentityError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| IdentityError::Deserialization(e.to_string()))
    }
}

fn check_status(response: &HttpResponse) -> Result<(), IdentityError> {
    if response.is_success() {
        return Ok(());
    }
    Err(IdentityError::Rejected {
        status: response.status,
        body: response.body.clone(),
    })
}
