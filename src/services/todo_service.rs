//! Todo service for business logic operations.
//!
//! Validates identifiers and titles before anything reaches the repository.
//! Everything else is delegated unchanged.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::{AppError, AppResult};
use crate::models::Todo;
use crate::repositories::TodoRepository;

#[async_trait]
pub trait TodoService: Send + Sync {
    async fn list_todos(&self, ctx: &Context) -> AppResult<Vec<Todo>>;

    async fn get_todo(&self, ctx: &Context, id: i64) -> AppResult<Todo>;

    async fn create_todo(&self, ctx: &Context, title: &str) -> AppResult<Todo>;

    async fn update_title(&self, ctx: &Context, id: i64, title: &str) -> AppResult<Todo>;

    async fn update_completed(&self, ctx: &Context, id: i64, completed: bool) -> AppResult<Todo>;

    async fn delete_todo(&self, ctx: &Context, id: i64) -> AppResult<()>;
}

/// Default [`TodoService`] over any [`TodoRepository`].
#[derive(Clone)]
pub struct TodoServiceImpl {
    repo: Arc<dyn TodoRepository>,
}

impl TodoServiceImpl {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self { repo }
    }
}

fn validate_id(id: i64) -> AppResult<()> {
    if id <= 0 {
        return Err(AppError::invalid_argument("id", "invalid id"));
    }
    Ok(())
}

// Only the empty string is rejected; whitespace counts as a title.
fn validate_title(title: &str) -> AppResult<()> {
    if title.is_empty() {
        return Err(AppError::invalid_argument("title", "title is required"));
    }
    Ok(())
}

#[async_trait]
impl TodoService for TodoServiceImpl {
    #[tracing::instrument(skip(self, ctx), level = "debug")]
    async fn list_todos(&self, ctx: &Context) -> AppResult<Vec<Todo>> {
        self.repo.list_all(ctx).await
    }

    #[tracing::instrument(skip(self, ctx), level = "debug")]
    async fn get_todo(&self, ctx: &Context, id: i64) -> AppResult<Todo> {
        validate_id(id)?;
        self.repo.get_by_id(ctx, id).await
    }

    #[tracing::instrument(skip(self, ctx), level = "debug")]
    async fn create_todo(&self, ctx: &Context, title: &str) -> AppResult<Todo> {
        validate_title(title)?;
        self.repo.create(ctx, title).await
    }

    #[tracing::instrument(skip(self, ctx), level = "debug")]
    async fn update_title(&self, ctx: &Context, id: i64, title: &str) -> AppResult<Todo> {
        validate_id(id)?;
        validate_title(title)?;
        self.repo.update_title(ctx, id, title).await
    }

    #[tracing::instrument(skip(self, ctx), level = "debug")]
    async fn update_completed(&self, ctx: &Context, id: i64, completed: bool) -> AppResult<Todo> {
        validate_id(id)?;
        self.repo.update_completed(ctx, id, completed).await
    }

    #[tracing::instrument(skip(self, ctx), level = "debug")]
    async fn delete_todo(&self, ctx: &Context, id: i64) -> AppResult<()> {
        validate_id(id)?;
        self.repo.delete(ctx, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use jiff::{SignedDuration, Timestamp};
    use proptest::prelude::*;

    /// In-memory repository that counts every call it receives.
    #[derive(Default)]
    struct MockRepo {
        rows: Mutex<BTreeMap<i64, Todo>>,
        next_id: AtomicUsize,
        calls: AtomicUsize,
    }

    impl MockRepo {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn mutate(&self, id: i64, f: impl FnOnce(&mut Todo)) -> AppResult<Todo> {
            let mut rows = self.rows.lock().unwrap();
            let todo = rows.get_mut(&id).ok_or_else(|| AppError::todo_not_found(id))?;
            f(todo);
            todo.updated_at = todo.updated_at + SignedDuration::from_micros(1);
            Ok(todo.clone())
        }
    }

    #[async_trait]
    impl TodoRepository for MockRepo {
        async fn list_all(&self, _ctx: &Context) -> AppResult<Vec<Todo>> {
            self.touch();
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn get_by_id(&self, _ctx: &Context, id: i64) -> AppResult<Todo> {
            self.touch();
            self.rows
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| AppError::todo_not_found(id))
        }

        async fn create(&self, _ctx: &Context, title: &str) -> AppResult<Todo> {
            self.touch();
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
            let now = Timestamp::now();
            let todo = Todo {
                id,
                title: title.to_string(),
                completed: false,
                created_at: now,
                updated_at: now,
            };
            self.rows.lock().unwrap().insert(id, todo.clone());
            Ok(todo)
        }

        async fn update_title(&self, _ctx: &Context, id: i64, title: &str) -> AppResult<Todo> {
            self.touch();
            self.mutate(id, |todo| todo.title = title.to_string())
        }

        async fn update_completed(
            &self,
            _ctx: &Context,
            id: i64,
            completed: bool,
        ) -> AppResult<Todo> {
            self.touch();
            self.mutate(id, |todo| todo.completed = completed)
        }

        async fn delete(&self, _ctx: &Context, id: i64) -> AppResult<()> {
            self.touch();
            self.rows.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    fn service() -> (Arc<MockRepo>, TodoServiceImpl) {
        let repo = Arc::new(MockRepo::default());
        let service = TodoServiceImpl::new(repo.clone());
        (repo, service)
    }

    fn assert_invalid_argument<T: std::fmt::Debug>(result: AppResult<T>, message: &str) {
        match result {
            Err(AppError::InvalidArgument { message: m, .. }) => assert_eq!(m, message),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_todo_starts_incomplete() {
        let (_, service) = service();
        let ctx = Context::background();

        let todo = service.create_todo(&ctx, "buy milk").await.unwrap();
        assert!(todo.id > 0);
        assert_eq!(todo.title, "buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected_before_repository() {
        let (repo, service) = service();
        let ctx = Context::background();

        assert_invalid_argument(service.create_todo(&ctx, "").await, "title is required");
        assert_invalid_argument(service.update_title(&ctx, 1, "").await, "title is required");
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_title_is_accepted() {
        let (_, service) = service();
        let ctx = Context::background();

        let todo = service.create_todo(&ctx, "   ").await.unwrap();
        assert_eq!(todo.title, "   ");
    }

    #[tokio::test]
    async fn test_id_is_checked_before_title() {
        let (repo, service) = service();
        let ctx = Context::background();

        assert_invalid_argument(service.update_title(&ctx, 0, "").await, "invalid id");
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_update_completed_changes_only_completed_and_updated_at() {
        let (_, service) = service();
        let ctx = Context::background();

        let created = service.create_todo(&ctx, "clean room").await.unwrap();
        let updated = service.update_completed(&ctx, created.id, true).await.unwrap();

        assert!(updated.completed);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (_, service) = service();
        let ctx = Context::background();

        let created = service.create_todo(&ctx, "learn rust").await.unwrap();
        service.delete_todo(&ctx, created.id).await.unwrap();

        let result = service.get_todo(&ctx, created.id).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_id_succeeds() {
        let (_, service) = service();
        let ctx = Context::background();

        service.delete_todo(&ctx, 999).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_todos_on_empty_store() {
        let (_, service) = service();
        let ctx = Context::background();

        assert!(service.list_todos(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_passes_through_unchanged() {
        let (_, service) = service();
        let ctx = Context::background();

        let result = service.update_title(&ctx, 42, "new").await;
        match result {
            Err(error @ AppError::NotFound { .. }) => {
                assert_eq!(error.to_string(), "todo with id=42 not found")
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_non_positive_id_never_reaches_repository(id in i64::MIN..=0) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let (repo, service) = service();
            let ctx = Context::background();

            runtime.block_on(async {
                prop_assert!(matches!(
                    service.get_todo(&ctx, id).await,
                    Err(AppError::InvalidArgument { .. })
                ), "expected InvalidArgument");
                prop_assert!(matches!(
                    service.update_title(&ctx, id, "title").await,
                    Err(AppError::InvalidArgument { .. })
                ), "expected InvalidArgument");
                prop_assert!(matches!(
                    service.update_completed(&ctx, id, true).await,
                    Err(AppError::InvalidArgument { .. })
                ), "expected InvalidArgument");
                prop_assert!(matches!(
                    service.delete_todo(&ctx, id).await,
                    Err(AppError::InvalidArgument { .. })
                ), "expected InvalidArgument");
                Ok(())
            })?;

            prop_assert_eq!(repo.calls(), 0);
        }

        #[test]
        fn prop_positive_id_with_title_reaches_repository(id in 1i64.., title in "[a-z ]{1,16}") {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let (repo, service) = service();
            let ctx = Context::background();

            let result = runtime.block_on(service.update_title(&ctx, id, &title));

            prop_assert!(matches!(result, Err(AppError::NotFound { .. })), "expected NotFound");
            prop_assert_eq!(repo.calls(), 1);
        }
    }
}
