//! I/O-free core of the todo service.
//!
//! # Overview
//! Holds the `Todo` DTOs and their partial-update rules, the error types the
//! server maps onto HTTP statuses, and a stateless client for the external
//! identity provider that builds `HttpRequest` values and parses
//! `HttpResponse` values without touching the network (host-does-IO).
//!
//! # Design
//! - Nothing here performs I/O, so every rule is covered by plain unit tests.
//! - The identity client is split into `build_*` / `parse_*` per provider
//!   call; the server owns the HTTP client that executes them.
//! - Login `state` values are signed rather than stored, keeping the server
//!   free of session state.

pub mod error;
pub mod http;
pub mod identity;
pub mod login_state;
pub mod types;

pub use error::{IdentityError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use identity::{IdentityClient, IdentityConfig, TokenSet, UserInfo};
pub use login_state::StateSigner;
pub use types::{NewTodo, Todo, TodoPatch};
