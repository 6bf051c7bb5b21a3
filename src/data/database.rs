//! SQLite database operations
//!
//! All database access goes through this module.
//! Uses SQLx with migrations run at connect time.

use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

use super::models::{EntityId, Todo};
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    /// List every todo in the store
    ///
    /// No filtering or explicit ordering; rows come back in store order.
    ///
    /// # Errors
    /// A failing read surfaces as an error rather than an empty list,
    /// so callers can tell "no todos" apart from "store unavailable".
    pub async fn list_todos(&self) -> Result<Vec<Todo>, AppError> {
        let todos = sqlx::query_as::<_, Todo>("SELECT * FROM todos")
            .fetch_all(&self.pool)
            .await?;

        Ok(todos)
    }

    /// Insert a new todo and return it
    ///
    /// The rendered page never writes; this exists for seeding
    /// and for test fixtures.
    pub async fn insert_todo(&self, content: &str) -> Result<Todo, AppError> {
        let todo = Todo {
            id: EntityId::new().0,
            content: content.to_string(),
            created_at: chrono::Utc::now(),
        };

        sqlx::query("INSERT INTO todos (id, content, created_at) VALUES (?, ?, ?)")
            .bind(&todo.id)
            .bind(&todo.content)
            .bind(todo.created_at)
            .execute(&self.pool)
            .await?;

        Ok(todo)
    }

    /// Delete every todo
    pub async fn clear_todos(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM todos").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::connect(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        (db, temp_dir)
    }

    #[tokio::test]
    async fn list_todos_empty_store_returns_empty_vec() {
        let (db, _guard) = test_db().await;

        let todos = db.list_todos().await.unwrap();
        assert!(todos.is_empty());
    }

    #[tokio::test]
    async fn insert_then_list_preserves_insertion_order() {
        let (db, _guard) = test_db().await;

        let first = db.insert_todo("Buy milk").await.unwrap();
        let second = db.insert_todo("Walk the dog").await.unwrap();

        let todos = db.list_todos().await.unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].id, first.id);
        assert_eq!(todos[0].content, "Buy milk");
        assert_eq!(todos[1].id, second.id);
        assert_eq!(todos[1].content, "Walk the dog");
    }

    #[tokio::test]
    async fn clear_todos_removes_all_rows() {
        let (db, _guard) = test_db().await;

        db.insert_todo("Buy milk").await.unwrap();
        db.clear_todos().await.unwrap();

        assert!(db.list_todos().await.unwrap().is_empty());
    }
}
