use std::future::Future;
use std::sync::Arc;
use testsync_core::error::ReconcileError;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Run `op` over every item with at most `max_concurrency` in flight.
///
/// Every dispatched operation is awaited; a failure does not cancel its
/// siblings. Successes come back in dispatch order. A single failure is
/// returned as-is, several are aggregated into [`ReconcileError::Batch`].
pub async fn run_bounded<I, T, F, Fut>(
    operation: &'static str,
    items: I,
    max_concurrency: usize,
    op: F,
) -> Result<Vec<T>, ReconcileError>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<T, ReconcileError>> + Send + 'static,
    T: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut join_set = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let fut = op(item);
        join_set.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => fut.await,
                Err(err) => Err(ReconcileError::Join(err.to_string())),
            };
            (index, outcome)
        });
    }

    let mut outcomes = Vec::with_capacity(join_set.len());
    let mut failures = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => failures.push(ReconcileError::Join(err.to_string())),
        }
    }
    outcomes.sort_by_key(|(index, _)| *index);

    let mut successes = Vec::with_capacity(outcomes.len());
    let mut op_failures = Vec::new();
    for (_, outcome) in outcomes {
        match outcome {
            Ok(value) => successes.push(value),
            Err(err) => op_failures.push(err),
        }
    }
    op_failures.append(&mut failures);

    match op_failures.len() {
        0 => Ok(successes),
        1 => {
            warn!(operation, completed = successes.len(), "batch operation failed");
            Err(op_failures.remove(0))
        }
        n => {
            warn!(
                operation,
                completed = successes.len(),
                failed = n,
                "batch operations failed"
            );
            Err(ReconcileError::Batch {
                operation,
                completed: successes.len(),
                failures: op_failures,
            })
        }
    }
}
