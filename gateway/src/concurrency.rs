//! Bounded fan-out over a set of targets, with per-target deadlines and
//! first-class partial failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::GatewayError;

/// One target's outcome in a fan-out aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct FanoutFailure {
    pub target: String,
    pub kind: &'static str,
    pub message: String,
}

/// Results of a fan-out, preserving input target order for both the
/// success and failure slots.
pub struct PartialFailureAggregate<T> {
    pub successes: Vec<(String, T)>,
    pub failures: Vec<FanoutFailure>,
    pub partial: bool,
}

/// Global semaphore bounding concurrent Docker calls across all requests,
/// plus the per-fanout parallelism ceiling.
pub struct Concurrency {
    global: Arc<Semaphore>,
    fanout_max_parallel: usize,
}

impl Concurrency {
    pub fn new(max_concurrent_docker_calls: usize, fanout_max_parallel: usize) -> Self {
        Self {
            global: Arc::new(Semaphore::new(max_concurrent_docker_calls)),
            fanout_max_parallel,
        }
    }

    /// Acquire a permit against the global Docker-call budget, failing
    /// with `unavailable` if it cannot be acquired before `deadline`.
    pub async fn acquire(&self, deadline: Duration) -> Result<tokio::sync::OwnedSemaphorePermit, GatewayError> {
        match tokio::time::timeout(deadline, Arc::clone(&self.global).acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(GatewayError::new(
                crate::error::ErrorKind::Internal,
                "concurrency semaphore closed",
            )),
            Err(_) => Err(GatewayError::new(
                crate::error::ErrorKind::Unavailable,
                "too many in-flight Docker calls; request dropped rather than queued past its deadline",
            )),
        }
    }

    /// Run `op` once per target with bounded parallelism. A failing target
    /// never cancels its siblings; `op`'s own deadline handling determines
    /// per-target timeout behavior. Uses `buffered` rather than
    /// `buffer_unordered` so `successes`/`failures` come back in the same
    /// order as `targets`, regardless of which target finishes first.
    pub async fn fanout<T, Fut>(
        &self,
        targets: Vec<String>,
        op: impl Fn(String) -> Fut + Send + Sync,
        overall_deadline: Duration,
    ) -> PartialFailureAggregate<T>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, GatewayError>> + Send,
    {
        use futures_util::stream::{self, StreamExt};

        let max_parallel = self.fanout_max_parallel.min(targets.len().max(1));
        let total = targets.len();

        let run = stream::iter(targets)
            .map(|target| {
                let op = &op;
                async move {
                    let result = op(target.clone()).await;
                    (target, result)
                }
            })
            .buffered(max_parallel)
            .collect::<Vec<_>>();

        let results = match tokio::time::timeout(overall_deadline, run).await {
            Ok(results) => results,
            Err(_) => {
                debug!("fanout overall deadline elapsed with work still outstanding");
                Vec::new()
            }
        };

        let mut successes = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for (target, result) in results {
            match result {
                Ok(value) => successes.push((target, value)),
                Err(err) => failures.push(FanoutFailure {
                    target,
                    kind: err.kind.as_str(),
                    message: err.message,
                }),
            }
        }

        let partial = !failures.is_empty() && successes.len() + failures.len() == total;

        PartialFailureAggregate {
            successes,
            failures,
            partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_fanout_all_succeed() {
        let coordinator = Concurrency::new(8, 4);
        let targets = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let aggregate = coordinator
            .fanout(
                targets,
                |target| async move { Ok::<_, GatewayError>(format!("ok-{target}")) },
                Duration::from_secs(1),
            )
            .await;

        assert_eq!(aggregate.successes.len(), 3);
        assert!(aggregate.failures.is_empty());
        assert!(!aggregate.partial);
    }

    #[tokio::test]
    async fn test_fanout_partial_failure_preserves_counts() {
        let coordinator = Concurrency::new(8, 4);
        let targets = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let aggregate = coordinator
            .fanout(
                targets,
                |target| async move {
                    if target == "b" {
                        Err(GatewayError::new(ErrorKind::Timeout, "stalled"))
                    } else {
                        Ok::<_, GatewayError>(format!("ok-{target}"))
                    }
                },
                Duration::from_secs(1),
            )
            .await;

        assert_eq!(aggregate.successes.len(), 2);
        assert_eq!(aggregate.failures.len(), 1);
        assert_eq!(aggregate.failures[0].target, "b");
        assert!(aggregate.partial);
    }

    #[tokio::test]
    async fn test_fanout_preserves_target_order_despite_completion_order() {
        let coordinator = Concurrency::new(8, 4);
        let targets = vec!["slow".to_string(), "fast".to_string()];

        let aggregate = coordinator
            .fanout(
                targets,
                |target| async move {
                    if target == "slow" {
                        tokio::time::sleep(Duration::from_millis(40)).await;
                    }
                    Ok::<_, GatewayError>(target)
                },
                Duration::from_secs(1),
            )
            .await;

        let order: Vec<&str> = aggregate.successes.iter().map(|(target, _)| target.as_str()).collect();
        assert_eq!(order, vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn test_global_semaphore_bounds_concurrency() {
        let coordinator = Concurrency::new(1, 1);
        let _permit = coordinator.acquire(Duration::from_millis(50)).await.unwrap();

        let second = coordinator.acquire(Duration::from_millis(20)).await;
        assert!(second.is_err());
    }
}
