//! SQLite-backed store for todo records.
//!
//! # Design
//! `TodoStore` is the one service interface both the REST and the GraphQL
//! surface call; neither builds SQL of its own. Every operation is a single
//! statement on a single row of the `todos` table. `update` only writes the
//! columns its patch names, so concurrent patches to different fields of one
//! record both land; patches to the same field are last-writer-wins.

use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use todo_core::{NewTodo, Todo, TodoPatch, ValidationError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR(100) NOT NULL,
    description VARCHAR(200),
    time TIMESTAMP,
    images VARCHAR(100)
)";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Todo not found")]
    NotFound(i64),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    description: Option<String>,
    time: Option<NaiveDateTime>,
    images: Option<String>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            title: row.title,
            description: row.description,
            time: row.time,
            images: row.images,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TodoStore {
    pool: SqlitePool,
}

impl TodoStore {
    /// Open a pool for `url`.
    ///
    /// An in-memory database lives only as long as its connection, so those
    /// URLs get exactly one connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        let pool = pool.connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Create the `todos` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn create(&self, new: NewTodo) -> Result<Todo, StoreError> {
        let row = sqlx::query_as::<_, TodoRow>(
            "INSERT INTO todos (title, description, time, images) VALUES (?, ?, ?, ?) \
             RETURNING id, title, description, time, images",
        )
        .bind(new.title)
        .bind(new.description)
        .bind(new.time)
        .bind(new.images)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    pub async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        sqlx::query_as::<_, TodoRow>(
            "SELECT id, title, description, time, images FROM todos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Todo::from)
        .ok_or(StoreError::NotFound(id))
    }

    /// Every record. Rows come back by ascending id so that offset-based
    /// GraphQL cursors stay stable between pages.
    pub async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            "SELECT id, title, description, time, images FROM todos ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    /// Apply `patch` to the record; fields the patch leaves out keep their
    /// stored values.
    ///
    /// A single `UPDATE ... RETURNING`: the write lock is taken before any
    /// read, so concurrent updates queue on the busy timeout.
    pub async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, StoreError> {
        patch.validate()?;
        if patch.is_empty() {
            return self.get(id).await;
        }

        let TodoPatch {
            title,
            description,
            time,
            images,
        } = patch;
        sqlx::query_as::<_, TodoRow>(
            "UPDATE todos SET \
                 title = COALESCE(?, title), \
                 description = CASE WHEN ? THEN ? ELSE description END, \
                 time = CASE WHEN ? THEN ? ELSE time END, \
                 images = CASE WHEN ? THEN ? ELSE images END \
             WHERE id = ? \
             RETURNING id, title, description, time, images",
        )
        .bind(title.flatten())
        .bind(description.is_some())
        .bind(description.flatten())
        .bind(time.is_some())
        .bind(time.flatten())
        .bind(images.is_some())
        .bind(images.flatten())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Todo::from)
        .ok_or(StoreError::NotFound(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
