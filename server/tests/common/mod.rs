#![allow(dead_code)]

use axum::http::{self, Request};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use todo_core::{IdentityClient, IdentityConfig, StateSigner};
use todo_server::{auth::IdentityService, store::TodoStore, AppState};
use tower::ServiceExt;

pub const SECRET: &[u8] = b"integration-test-signing-secret";
pub const CLIENT_SECRET: &str = "client-secret";

pub async fn store() -> TodoStore {
    let store = TodoStore::connect("sqlite::memory:", 1).await.unwrap();
    store.ensure_schema().await.unwrap();
    store
}

pub fn identity(base_url: &str) -> IdentityService {
    let client = IdentityClient::new(IdentityConfig {
        base_url: base_url.to_string(),
        realm: "todo".to_string(),
        client_id: "todo-api".to_string(),
        client_secret: CLIENT_SECRET.to_string(),
        redirect_uri: "http://localhost:3000/callback".to_string(),
    })
    .unwrap();
    IdentityService::new(client, StateSigner::new(SECRET).unwrap())
}

/// App state whose identity provider is never reached.
pub async fn state() -> AppState {
    AppState::new(store().await, identity("http://127.0.0.1:9"))
}

pub async fn send(state: &AppState, request: Request<String>) -> Response {
    todo_server::app(state.clone()).oneshot(request).await.unwrap()
}

pub async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

/// POST a GraphQL document and return the decoded response.
pub async fn graphql(state: &AppState, query: &str, variables: Value) -> Value {
    let body = json!({ "query": query, "variables": variables }).to_string();
    let response = send(state, json_request("POST", "/graphql", &body)).await;
    assert_eq!(response.status(), http::StatusCode::OK);
    body_json(response).await
}
