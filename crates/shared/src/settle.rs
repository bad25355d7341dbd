//! Settle-all, succeed-if-any.
//!
//! Every task is polled concurrently until it settles. A failing task never
//! cancels or delays its siblings, and the aggregate does not depend on the
//! order in which tasks complete.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::future::Future;

/// The settled result of one keyed task.
#[derive(Debug)]
pub struct Settled<K, T, E> {
    pub key: K,
    pub result: Result<T, E>,
}

/// Runs all `tasks` concurrently and waits for every one of them to settle.
///
/// Results are returned in submission order, whatever the completion order.
pub async fn settle_all<K, T, E, F, I>(tasks: I) -> Vec<Settled<K, T, E>>
where
    I: IntoIterator<Item = (K, F)>,
    F: Future<Output = Result<T, E>>,
{
    let (keys, futures): (Vec<K>, Vec<F>) = tasks.into_iter().unzip();
    let results = futures::future::join_all(futures).await;

    keys.into_iter()
        .zip(results)
        .map(|(key, result)| Settled { key, result })
        .collect()
}

/// Aggregate of a settle-all run, keyed by task identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome<K: Ord> {
    pub attempted: Vec<K>,
    pub succeeded: BTreeSet<K>,
    pub failed: BTreeMap<K, String>,
}

impl<K: Ord + Clone> DispatchOutcome<K> {
    pub fn from_settled<T, E: Display>(settled: &[Settled<K, T, E>]) -> Self {
        let mut outcome = Self {
            attempted: Vec::with_capacity(settled.len()),
            succeeded: BTreeSet::new(),
            failed: BTreeMap::new(),
        };

        for task in settled {
            outcome.attempted.push(task.key.clone());
            match &task.result {
                Ok(_) => {
                    outcome.succeeded.insert(task.key.clone());
                }
                Err(e) => {
                    outcome.failed.insert(task.key.clone(), e.to_string());
                }
            }
        }

        outcome
    }

    /// At least one task succeeded.
    pub fn is_success(&self) -> bool {
        !self.succeeded.is_empty()
    }

    pub fn is_total_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn succeeded(&self, key: &K) -> bool {
        self.succeeded.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn delayed(ms: u64, ok: bool) -> Result<u64, String> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        if ok { Ok(ms) } else { Err(format!("failed after {ms}ms")) }
    }

    #[tokio::test]
    async fn test_settle_all_keeps_submission_order() {
        let settled = settle_all(vec![("slow", delayed(30, true)), ("fast", delayed(1, false))]).await;

        assert_eq!(settled[0].key, "slow");
        assert_eq!(settled[0].result, Ok(30));
        assert_eq!(settled[1].key, "fast");
        assert_eq!(settled[1].result, Err("failed after 1ms".to_string()));
    }

    #[tokio::test]
    async fn test_failure_does_not_cancel_siblings() {
        let settled = settle_all(vec![("a", delayed(1, false)), ("b", delayed(20, true))]).await;
        let outcome = DispatchOutcome::from_settled(&settled);

        assert!(outcome.is_success());
        assert!(outcome.succeeded(&"b"));
        assert_eq!(outcome.failed.get("a").map(String::as_str), Some("failed after 1ms"));
        assert_eq!(outcome.attempted, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_outcome_is_order_independent() {
        let forward = settle_all(vec![(1, delayed(1, true)), (2, delayed(5, false))]).await;
        let backward = settle_all(vec![(2, delayed(5, false)), (1, delayed(1, true))]).await;

        let a = DispatchOutcome::from_settled(&forward);
        let b = DispatchOutcome::from_settled(&backward);

        assert_eq!(a.succeeded, b.succeeded);
        assert_eq!(a.failed, b.failed);
        assert_eq!(a.is_success(), b.is_success());
    }

    #[tokio::test]
    async fn test_all_failed_is_total_failure() {
        let settled = settle_all(vec![("a", delayed(1, false)), ("b", delayed(1, false))]).await;
        let outcome = DispatchOutcome::from_settled(&settled);

        assert!(outcome.is_total_failure());
        assert_eq!(outcome.failed.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_run_is_not_success() {
        let settled: Vec<Settled<&str, u64, String>> =
            settle_all(Vec::<(&str, std::future::Ready<Result<u64, String>>)>::new()).await;
        let outcome = DispatchOutcome::from_settled(&settled);

        assert!(outcome.attempted.is_empty());
        assert!(outcome.is_total_failure());
    }
}
