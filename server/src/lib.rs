//! Todo list backend.
//!
//! # Overview
//! One SQLite table of todos served through a REST surface (`/todos`) and a
//! GraphQL surface (`/graphql`), plus a login shim for an external OAuth2
//! identity provider (`/login`, `/callback`, `/logout`).
//!
//! # Design
//! - Both API surfaces call [`store::TodoStore`]; neither builds SQL itself.
//! - Handlers are stateless. The store's connection pool and a shared
//!   reqwest client are the only resources held across requests.
//! - No route consults authentication unless [`AppState::require_auth`] is
//!   set, in which case mutating requests pass through
//!   [`auth::require_bearer`] first.

pub mod auth;
pub mod config;
pub mod error;
pub mod graphql;
pub mod rest;
pub mod store;

use std::sync::Arc;

use axum::{extract::FromRef, middleware, Router};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::IdentityService;
use crate::graphql::TodoSchema;
use crate::store::TodoStore;

#[derive(Clone)]
pub struct AppState {
    pub store: TodoStore,
    pub schema: TodoSchema,
    pub identity: Arc<IdentityService>,
    pub require_auth: bool,
}

impl AppState {
    pub fn new(store: TodoStore, identity: IdentityService) -> Self {
        Self {
            schema: graphql::build_schema(store.clone()),
            store,
            identity: Arc::new(identity),
            require_auth: false,
        }
    }

    pub fn require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }
}

impl FromRef<AppState> for TodoStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for TodoSchema {
    fn from_ref(state: &AppState) -> Self {
        state.schema.clone()
    }
}

impl FromRef<AppState> for Arc<IdentityService> {
    fn from_ref(state: &AppState) -> Self {
        state.identity.clone()
    }
}

pub fn app(state: AppState) -> Router {
    let mut api = rest::routes().merge(graphql::routes());
    if state.require_auth {
        api = api.route_layer(middleware::from_fn_with_state(
            state.identity.clone(),
            auth::require_bearer,
        ));
    }
    api.merge(auth::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}
