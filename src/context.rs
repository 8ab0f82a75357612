//! Per-request execution context.
//!
//! A [`Context`] carries an optional deadline and a cancellation token.
//! Store calls run through [`Context::run`], which races them against both.

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Context {
    /// A context that never expires and is only cancelled explicitly.
    pub fn background() -> Self {
        Self::from_token(CancellationToken::new())
    }

    pub fn from_token(cancel: CancellationToken) -> Self {
        Self {
            deadline: None,
            cancel,
        }
    }

    /// Derive a child context that expires after `timeout`.
    ///
    /// An earlier deadline inherited from `self` is kept. Cancelling the
    /// parent cancels the child, not the other way round.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        };
        Self {
            deadline: Some(deadline),
            cancel: self.cancel.child_token(),
        }
    }


    /// Drive `fut` to completion unless the context is cancelled or its
    /// deadline passes first.
    ///
    /// Cancellation wins over an elapsed deadline, which wins over a ready
    /// result.
    pub async fn run<T, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(AppError::Cancelled),
                    _ = tokio::time::sleep_until(deadline) => Err(AppError::DeadlineExceeded),
                    result = fut => result,
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(AppError::Cancelled),
                    result = fut => result,
                }
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl FromRequestParts<AppState> for Context {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.request_context())
    }
}
