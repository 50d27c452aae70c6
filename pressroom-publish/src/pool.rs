//! Semaphore-gated fan-out of blocking work.
//!
//! Each item becomes one task; a task holds one of `window` permits while its
//! blocking body runs on tokio's blocking pool. A panicking body becomes an
//! `Err` for that item only.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::PublishError;

/// Run `work` over `items` with at most `window` bodies in flight.
///
/// Results come back in input order.
pub async fn run_bounded<T, R, F>(
    items: Vec<T>,
    window: usize,
    work: F,
) -> Vec<Result<R, PublishError>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(window.max(1)));
    let work = Arc::new(work);

    let handles: Vec<_> = items
        .into_iter()
        .map(|item| {
            let semaphore = Arc::clone(&semaphore);
            let work = Arc::clone(&work);
            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| PublishError::Task(e.to_string()))?;
                tokio::task::spawn_blocking(move || work(item))
                    .await
                    .map_err(|e| PublishError::Task(e.to_string()))
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(match handle.await {
            Ok(result) => result,
            Err(e) => Err(PublishError::Task(e.to_string())),
        });
    }
    results
}
