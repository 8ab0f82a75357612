//! Todo repository for async database operations.
//!
//! Maps rows of the `todos` table to [`Todo`] using diesel_async. Every
//! call runs inside the caller's [`Context`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::context::Context;
use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::Todo;
use crate::schema::todos;

/// Persistence operations for todo items.
///
/// Implementations do no validation; that is the service layer's job.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All todos ordered by id ascending.
    async fn list_all(&self, ctx: &Context) -> AppResult<Vec<Todo>>;

    async fn get_by_id(&self, ctx: &Context, id: i64) -> AppResult<Todo>;

    /// Inserts a new, not yet completed todo.
    async fn create(&self, ctx: &Context, title: &str) -> AppResult<Todo>;

    async fn update_title(&self, ctx: &Context, id: i64, title: &str) -> AppResult<Todo>;

    async fn update_completed(&self, ctx: &Context, id: i64, completed: bool) -> AppResult<Todo>;

    /// Removes the row if present. Deleting a missing id is not an error.
    async fn delete(&self, ctx: &Context, id: i64) -> AppResult<()>;
}

/// Row as stored in the `todos` table.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = todos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct TodoRow {
    id: i64,
    title: String,
    completed: bool,
    created_at: jiff_diesel::Timestamp,
    updated_at: jiff_diesel::Timestamp,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            completed: row.completed,
            created_at: row.created_at.to_jiff(),
            updated_at: row.updated_at.to_jiff(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = todos)]
struct NewTodo<'a> {
    title: &'a str,
    completed: bool,
}

/// PostgreSQL-backed [`TodoRepository`].
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap.
#[derive(Clone)]
pub struct PgTodoRepository {
    pool: AsyncDbPool,
}

impl PgTodoRepository {
    /// Creates a new PgTodoRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Inserts every title in one transaction and returns the created rows
    /// in input order. Either all rows are written or none are.
    pub async fn create_batch(&self, ctx: &Context, titles: &[&str]) -> AppResult<Vec<Todo>> {
        ctx.run(async {
            let mut conn = self.pool.get().await?;

            let rows = conn
                .transaction::<Vec<TodoRow>, AppError, _>(|conn| {
                    async move {
                        let mut rows = Vec::with_capacity(titles.len());
                        for title in titles.iter().copied() {
                            let row = diesel::insert_into(todos::table)
                                .values(NewTodo {
                                    title,
                                    completed: false,
                                })
                                .returning(TodoRow::as_returning())
                                .get_result(conn)
                                .await
                                .map_err(|e| {
                                    DatabaseErrorConverter::convert_diesel_error(e, "seed todos")
                                })?;
                            rows.push(row);
                        }
                        Ok(rows)
                    }
                    .scope_boxed()
                })
                .await
                .inspect_err(|e| tracing::error!(error = %e, "Seed transaction rolled back"))?;

            Ok(rows.into_iter().map(Todo::from).collect())
        })
        .await
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn list_all(&self, ctx: &Context) -> AppResult<Vec<Todo>> {
        ctx.run(async {
            let mut conn = self.pool.get().await?;

            let rows = todos::table
                .order(todos::id.asc())
                .select(TodoRow::as_select())
                .load(&mut conn)
                .await
                .map_err(|e| store_error(e, "list todos"))?;

            Ok(rows.into_iter().map(Todo::from).collect())
        })
        .await
    }

    async fn get_by_id(&self, ctx: &Context, id: i64) -> AppResult<Todo> {
        ctx.run(async {
            let mut conn = self.pool.get().await?;

            todos::table
                .find(id)
                .select(TodoRow::as_select())
                .first(&mut conn)
                .await
                .map(Todo::from)
                .map_err(|e| todo_error(e, "get todo", id))
        })
        .await
    }

    async fn create(&self, ctx: &Context, title: &str) -> AppResult<Todo> {
        ctx.run(async {
            let mut conn = self.pool.get().await?;

            diesel::insert_into(todos::table)
                .values(NewTodo {
                    title,
                    completed: false,
                })
                .returning(TodoRow::as_returning())
                .get_result(&mut conn)
                .await
                .map(Todo::from)
                .map_err(|e| store_error(e, "create todo"))
        })
        .await
    }

    async fn update_title(&self, ctx: &Context, id: i64, title: &str) -> AppResult<Todo> {
        ctx.run(async {
            let mut conn = self.pool.get().await?;

            diesel::update(todos::table.find(id))
                .set((todos::title.eq(title), todos::updated_at.eq(diesel::dsl::now)))
                .returning(TodoRow::as_returning())
                .get_result(&mut conn)
                .await
                .map(Todo::from)
                .map_err(|e| todo_error(e, "update todo title", id))
        })
        .await
    }

    async fn update_completed(&self, ctx: &Context, id: i64, completed: bool) -> AppResult<Todo> {
        ctx.run(async {
            let mut conn = self.pool.get().await?;

            diesel::update(todos::table.find(id))
                .set((
                    todos::completed.eq(completed),
                    todos::updated_at.eq(diesel::dsl::now),
                ))
                .returning(TodoRow::as_returning())
                .get_result(&mut conn)
                .await
                .map(Todo::from)
                .map_err(|e| todo_error(e, "update todo completed", id))
        })
        .await
    }

    async fn delete(&self, ctx: &Context, id: i64) -> AppResult<()> {
        ctx.run(async {
            let mut conn = self.pool.get().await?;

            let affected = diesel::delete(todos::table.find(id))
                .execute(&mut conn)
                .await
                .map_err(|e| store_error(e, "delete todo"))?;

            tracing::debug!(id, affected, "Todo delete executed");
            Ok(())
        })
        .await
    }
}

fn store_error(error: diesel::result::Error, operation: &str) -> AppError {
    let error = DatabaseErrorConverter::convert_diesel_error(error, operation);
    tracing::error!(operation, error = %error, "Todo store call failed");
    error
}

fn todo_error(error: diesel::result::Error, operation: &str, id: i64) -> AppError {
    let error = DatabaseErrorConverter::convert_todo_error(error, operation, id);
    if !matches!(error, AppError::NotFound { .. }) {
        tracing::error!(operation, id, error = %error, "Todo store call failed");
    }
    error
}

#[cfg(test)]
mod tests {
    //! These tests need a PostgreSQL database with the `todos` migration
    //! applied. Point `TEST_DATABASE_URL` at it and run with `--ignored`.

    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::establish_async_connection_pool;

    fn test_repo() -> PgTodoRepository {
        let url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set for database tests");
        let config = DatabaseConfig {
            url,
            ..DatabaseConfig::default()
        };
        PgTodoRepository::new(establish_async_connection_pool(&config).unwrap())
    }

    #[tokio::test]
    #[ignore]
    async fn test_create_then_get() {
        let repo = test_repo();
        let ctx = Context::background();

        let created = repo.create(&ctx, "buy milk").await.unwrap();
        assert!(created.id > 0);
        assert!(!created.completed);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = repo.get_by_id(&ctx, created.id).await.unwrap();
        assert_eq!(fetched, created);

        repo.delete(&ctx, created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_update_completed_refreshes_updated_at() {
        let repo = test_repo();
        let ctx = Context::background();

        let created = repo.create(&ctx, "clean room").await.unwrap();
        let updated = repo.update_completed(&ctx, created.id, true).await.unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        repo.delete(&ctx, created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_missing_row_maps_to_not_found() {
        let repo = test_repo();
        let ctx = Context::background();

        let result = repo.get_by_id(&ctx, i64::MAX).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));

        let result = repo.update_title(&ctx, i64::MAX, "x").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    #[ignore]
    async fn test_delete_is_idempotent() {
        let repo = test_repo();
        let ctx = Context::background();

        let created = repo.create(&ctx, "learn rust").await.unwrap();
        repo.delete(&ctx, created.id).await.unwrap();
        repo.delete(&ctx, created.id).await.unwrap();

        let result = repo.get_by_id(&ctx, created.id).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    #[ignore]
    async fn test_create_batch_returns_rows_in_order() {
        let repo = test_repo();
        let ctx = Context::background();

        let created = repo.create_batch(&ctx, &["a", "b", "c"]).await.unwrap();
        let titles: Vec<_> = created.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
        assert!(created.windows(2).all(|w| w[0].id < w[1].id));

        for todo in created {
            repo.delete(&ctx, todo.id).await.unwrap();
        }
    }
}
