//! Seed command handler
//!
//! Inserts a fixed set of sample todos in one transaction.

use std::time::Duration;

use anyhow::Context as _;

use crate::config::settings::Settings;
use crate::context::Context;
use crate::db::establish_async_connection_pool;
use crate::repositories::PgTodoRepository;

/// Titles inserted by `todo-service seed`.
pub const SAMPLE_TITLES: [&str; 3] = ["牛乳を買う", "部屋の掃除をする", "Rust の勉強をする"];

pub struct SeedCommandHandler {
    config: Settings,
}

impl SeedCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(&self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            println!("Would insert {} todos:", SAMPLE_TITLES.len());
            for title in SAMPLE_TITLES {
                println!("  - {}", title);
            }
            return Ok(());
        }

        let pool = establish_async_connection_pool(&self.config.database)
            .context("Failed to create database connection pool")?;
        let repo = PgTodoRepository::new(pool);
        let ctx = Context::background()
            .with_timeout(Duration::from_secs(self.config.server.request_timeout));

        let created = repo
            .create_batch(&ctx, &SAMPLE_TITLES)
            .await
            .context("Failed to insert sample todos")?;

        tracing::info!(count = created.len(), "Sample todos inserted");
        for todo in &created {
            println!("{}\t{}", todo.id, todo.title);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_dry_run_does_not_need_database() {
        let handler = SeedCommandHandler::new(Settings::default());
        assert!(handler.execute(true).await.is_ok());
    }
}
