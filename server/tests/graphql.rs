mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use todo_core::Todo;

use common::{body_json, body_text, empty_request, graphql, json_request, send, state};

const CREATE: &str = r#"
    mutation Create($title: String!, $description: String, $time: NaiveDateTime) {
        createTodo(title: $title, description: $description, time: $time) {
            id title description time images
        }
    }
"#;

const PAGE: &str = r#"
    query Page($first: Int, $after: String) {
        todos(first: $first, after: $after) {
            edges { cursor node { id title images } }
            pageInfo { hasNextPage hasPreviousPage endCursor }
        }
    }
"#;

#[tokio::test]
async fn graphiql_is_served_on_get() {
    let state = state().await;
    let resp = send(&state, empty_request("GET", "/graphql")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await.to_lowercase();
    assert!(html.contains("graphiql"));
}

#[tokio::test]
async fn create_todo_returns_created_object() {
    let state = state().await;
    let resp = graphql(
        &state,
        CREATE,
        json!({ "title": "Buy milk", "description": "2%", "time": "2024-05-01T09:30:00" }),
    )
    .await;

    assert!(resp.get("errors").is_none(), "{resp}");
    let todo = &resp["data"]["createTodo"];
    assert!(todo["id"].is_i64());
    assert_eq!(todo["title"], "Buy milk");
    assert_eq!(todo["description"], "2%");
    let time = todo["time"].as_str().unwrap();
    assert!(time.starts_with("2024-05-01") && time.contains("09:30:00"), "{time}");
    assert!(todo["images"].is_null());

    // REST renders the same record in its own JSON shape
    let id = todo["id"].as_i64().unwrap();
    let stored: Todo = body_json(send(&state, empty_request("GET", &format!("/todos/{id}"))).await).await;
    assert_eq!(
        stored.time.map(|t| t.to_string()).as_deref(),
        Some("2024-05-01 09:30:00")
    );
}

#[tokio::test]
async fn graphql_and_rest_share_storage() {
    let state = state().await;

    graphql(&state, CREATE, json!({ "title": "From GraphQL" })).await;
    let resp = send(
        &state,
        json_request(
            "POST",
            "/todos",
            r#"{"title":"From REST","description":null,"time":null,"images":"rest.png"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // REST sees both
    let todos: Vec<Todo> = body_json(send(&state, empty_request("GET", "/todos")).await).await;
    let titles: Vec<&str> = todos.iter().map(|todo| todo.title.as_str()).collect();
    assert!(titles.contains(&"From GraphQL"));
    assert!(titles.contains(&"From REST"));
    let from_graphql = todos.iter().find(|todo| todo.title == "From GraphQL").unwrap();
    assert!(from_graphql.images.is_none());

    // GraphQL sees both, images included
    let resp = graphql(&state, PAGE, json!({})).await;
    let edges = resp["data"]["todos"]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 2);
    let rest_node = edges
        .iter()
        .map(|edge| &edge["node"])
        .find(|node| node["title"] == "From REST")
        .unwrap();
    assert_eq!(rest_node["images"], "rest.png");
}

#[tokio::test]
async fn connection_pages_with_cursors() {
    let state = state().await;
    for title in ["one", "two", "three"] {
        graphql(&state, CREATE, json!({ "title": title })).await;
    }

    let first = graphql(&state, PAGE, json!({ "first": 2 })).await;
    let page = &first["data"]["todos"];
    assert_eq!(page["edges"].as_array().unwrap().len(), 2);
    assert_eq!(page["pageInfo"]["hasNextPage"], true);
    assert_eq!(page["pageInfo"]["hasPreviousPage"], false);
    let cursor = page["pageInfo"]["endCursor"].as_str().unwrap().to_string();

    let second = graphql(&state, PAGE, json!({ "first": 2, "after": cursor })).await;
    let page = &second["data"]["todos"];
    let edges = page["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["node"]["title"], "three");
    assert_eq!(page["pageInfo"]["hasNextPage"], false);
    assert_eq!(page["pageInfo"]["hasPreviousPage"], true);
}

#[tokio::test]
async fn todo_query_returns_null_for_unknown_id() {
    let state = state().await;
    let resp = graphql(&state, "{ todo(id: 12345) { id } }", json!({})).await;
    assert!(resp.get("errors").is_none(), "{resp}");
    assert!(resp["data"]["todo"].is_null());
}

#[tokio::test]
async fn update_todo_is_partial() {
    let state = state().await;
    let created = graphql(
        &state,
        CREATE,
        json!({ "title": "Draft", "description": "keep me", "time": "2024-05-01T09:30:00" }),
    )
    .await;
    let id = created["data"]["createTodo"]["id"].as_i64().unwrap();

    let resp = graphql(
        &state,
        "mutation($id: Int!) { updateTodo(id: $id, title: \"Final\") { title description time } }",
        json!({ "id": id }),
    )
    .await;
    assert!(resp.get("errors").is_none(), "{resp}");
    let todo = &resp["data"]["updateTodo"];
    assert_eq!(todo["title"], "Final");
    assert_eq!(todo["description"], "keep me");
    assert!(!todo["time"].is_null());

    let resp = graphql(
        &state,
        "mutation($id: Int!) { updateTodo(id: $id, description: null) { title description } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(resp["data"]["updateTodo"]["title"], "Final");
    assert!(resp["data"]["updateTodo"]["description"].is_null());
}

#[tokio::test]
async fn update_unknown_todo_reports_not_found() {
    let state = state().await;
    let resp = graphql(
        &state,
        "mutation { updateTodo(id: 999, title: \"X\") { id } }",
        json!({}),
    )
    .await;
    let errors = resp["errors"].as_array().unwrap();
    assert_eq!(errors[0]["message"], "Todo not found");
}

#[tokio::test]
async fn delete_todo_removes_record() {
    let state = state().await;
    let created = graphql(&state, CREATE, json!({ "title": "Temporary" })).await;
    let id = created["data"]["createTodo"]["id"].as_i64().unwrap();

    let resp = graphql(
        &state,
        "mutation($id: Int!) { deleteTodo(id: $id) }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(resp["data"]["deleteTodo"], true);

    let resp = send(&state, empty_request("GET", &format!("/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = graphql(
        &state,
        "mutation($id: Int!) { deleteTodo(id: $id) }",
        json!({ "id": id }),
    )
    .await;
    let errors: &Value = &resp["errors"];
    assert_eq!(errors[0]["message"], "Todo not found");
}
