//! GraphQL surface over the todo store.
//!
//! `POST /graphql` executes a request document, `GET /graphql` serves the
//! GraphiQL explorer pointed at the same path. Resolvers go through
//! [`TodoStore`] exactly like the REST handlers do. `images` is readable here
//! but only the REST surface writes it.

use async_graphql::connection::{query, Connection, Edge};
use async_graphql::http::GraphiQLSource;
use async_graphql::{
    Context, EmptySubscription, MaybeUndefined, Object, Result, Schema, SimpleObject,
};
use axum::{extract::State, response::Html, routing::get, Json, Router};
use chrono::NaiveDateTime;
use todo_core::{NewTodo, Todo, TodoPatch};

use crate::store::{StoreError, TodoStore};
use crate::AppState;

pub type TodoSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

const ENDPOINT: &str = "/graphql";

pub fn build_schema(store: TodoStore) -> TodoSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .finish()
}

pub fn routes() -> Router<AppState> {
    Router::new().route(ENDPOINT, get(graphiql).post(graphql_handler))
}

async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(ENDPOINT).finish())
}

async fn graphql_handler(
    State(schema): State<TodoSchema>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(schema.execute(request).await)
}

#[derive(SimpleObject)]
#[graphql(name = "Todo")]
pub struct TodoObject {
    id: i64,
    title: String,
    description: Option<String>,
    time: Option<NaiveDateTime>,
    images: Option<String>,
}

impl From<Todo> for TodoObject {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            time: todo.time,
            images: todo.images,
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All todos as a cursor connection. Cursors are list offsets.
    async fn todos(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<Connection<usize, TodoObject>> {
        let todos = ctx.data::<TodoStore>()?.list().await.map_err(store_error)?;
        query(after, before, first, last, |after, before, first, last| async move {
            let total = todos.len();
            let (start, end) = page_bounds(total, after, before, first, last);
            let mut connection = Connection::new(start > 0, end < total);
            connection.edges.extend(
                todos
                    .into_iter()
                    .enumerate()
                    .skip(start)
                    .take(end - start)
                    .map(|(offset, todo)| Edge::new(offset, TodoObject::from(todo))),
            );
            Ok::<_, async_graphql::Error>(connection)
        })
        .await
    }

    /// A single todo, or null when the id is unknown.
    async fn todo(&self, ctx: &Context<'_>, id: i64) -> Result<Option<TodoObject>> {
        match ctx.data::<TodoStore>()?.get(id).await {
            Ok(todo) => Ok(Some(todo.into())),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(err) => Err(store_error(err)),
        }
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_todo(
        &self,
        ctx: &Context<'_>,
        title: String,
        description: Option<String>,
        time: Option<NaiveDateTime>,
    ) -> Result<TodoObject> {
        let store = ctx.data::<TodoStore>()?;
        let todo = store
            .create(NewTodo {
                title,
                description,
                time,
                images: None,
            })
            .await
            .map_err(store_error)?;
        tracing::info!(id = todo.id, "todo created via graphql");
        Ok(todo.into())
    }

    /// Partial update: omitted arguments keep their stored values, explicit
    /// nulls clear them.
    async fn update_todo(
        &self,
        ctx: &Context<'_>,
        id: i64,
        title: MaybeUndefined<String>,
        description: MaybeUndefined<String>,
        time: MaybeUndefined<NaiveDateTime>,
    ) -> Result<TodoObject> {
        let patch = TodoPatch {
            title: tri_state(title),
            description: tri_state(description),
            time: tri_state(time),
            images: None,
        };
        let todo = ctx
            .data::<TodoStore>()?
            .update(id, patch)
            .await
            .map_err(store_error)?;
        tracing::info!(id, "todo updated via graphql");
        Ok(todo.into())
    }

    async fn delete_todo(&self, ctx: &Context<'_>, id: i64) -> Result<bool> {
        ctx.data::<TodoStore>()?
            .delete(id)
            .await
            .map_err(store_error)?;
        tracing::info!(id, "todo deleted via graphql");
        Ok(true)
    }
}

/// Resolver error for a store failure. Database faults are logged and
/// reported without driver detail, as the REST surface does.
fn store_error(err: StoreError) -> async_graphql::Error {
    match err {
        StoreError::Database(err) => {
            tracing::error!(error = %err, "storage fault");
            async_graphql::Error::new("internal server error")
        }
        err => async_graphql::Error::new(err.to_string()),
    }
}

fn tri_state<T>(value: MaybeUndefined<T>) -> Option<Option<T>> {
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(value) => Some(Some(value)),
    }
}

/// Half-open `[start, end)` window into a list of `total` items for the
/// Relay arguments, clamped so it never leaves the list.
fn page_bounds(
    total: usize,
    after: Option<usize>,
    before: Option<usize>,
    first: Option<usize>,
    last: Option<usize>,
) -> (usize, usize) {
    let mut start = after.map_or(0, |after| after.saturating_add(1)).min(total);
    let mut end = before.unwrap_or(total).min(total).max(start);
    if let Some(first) = first {
        end = end.min(start.saturating_add(first));
    }
    if let Some(last) = last {
        start = start.max(end.saturating_sub(last));
    }
    (start, end)
}
