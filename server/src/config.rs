//! Process-wide configuration.
//!
//! Everything is supplied from the command line or the environment; nothing
//! secret is compiled in. `Args` is the raw clap surface and
//! [`Config::from_args`] validates it once at startup.

use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use todo_core::{IdentityClient, IdentityConfig, IdentityError, StateSigner};

/// Shortest signing secret accepted, in bytes.
pub const MIN_SECRET_LEN: usize = 16;

/// todo-server - todo list backend with REST and GraphQL endpoints
#[derive(Parser)]
#[command(name = "todo-server")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "BIND_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://todo.db?mode=rwc")]
    pub database_url: String,

    /// Size of the database connection pool
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Identity provider base URL, e.g. https://sso.example.com
    #[arg(long, env = "IDP_BASE_URL")]
    pub idp_base_url: String,

    /// Identity provider realm
    #[arg(long, env = "IDP_REALM")]
    pub idp_realm: String,

    /// OAuth2 client id registered with the identity provider
    #[arg(long, env = "IDP_CLIENT_ID")]
    pub idp_client_id: String,

    /// OAuth2 client secret
    #[arg(long, env = "IDP_CLIENT_SECRET", hide_env_values = true)]
    pub idp_client_secret: String,

    /// Callback URL the identity provider redirects back to
    #[arg(
        long,
        env = "IDP_REDIRECT_URI",
        default_value = "http://127.0.0.1:3000/callback"
    )]
    pub idp_redirect_uri: String,

    /// Secret used to sign login state
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Require a provider-accepted bearer token on mutating requests
    #[arg(long, env = "REQUIRE_AUTH")]
    pub require_auth: bool,

    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("database pool needs at least one connection")]
    NoConnections,

    #[error("signing secret must be at least {} bytes", MIN_SECRET_LEN)]
    ShortSecret,

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Validated configuration. Secrets stay wrapped and are redacted from
/// `Debug` output.
#[derive(Debug)]
pub struct Config {
    pub bind: SocketAddr,
    pub database_url: String,
    pub max_connections: u32,
    pub identity: IdentityClient,
    pub secret_key: SecretString,
    pub require_auth: bool,
    pub log_level: String,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.database_url.trim().is_empty() {
            return Err(ConfigError::Empty("database url"));
        }
        if args.max_connections == 0 {
            return Err(ConfigError::NoConnections);
        }
        for (name, value) in [
            ("identity provider realm", &args.idp_realm),
            ("identity provider client id", &args.idp_client_id),
            ("identity provider client secret", &args.idp_client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }
        if args.secret_key.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ShortSecret);
        }

        let identity = IdentityClient::new(IdentityConfig {
            base_url: args.idp_base_url,
            realm: args.idp_realm,
            client_id: args.idp_client_id,
            client_secret: args.idp_client_secret,
            redirect_uri: args.idp_redirect_uri,
        })?;

        Ok(Self {
            bind: SocketAddr::new(args.host, args.port),
            database_url: args.database_url,
            max_connections: args.max_connections,
            identity,
            secret_key: SecretString::from(args.secret_key),
            require_auth: args.require_auth,
            log_level: args.log_level,
        })
    }

    pub fn state_signer(&self) -> Result<StateSigner, ConfigError> {
        Ok(StateSigner::new(self.secret_key.expose_secret().as_bytes())?)
    }
}
