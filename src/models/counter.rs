use scylla::DeserializeRow;
use serde::{Deserialize, Serialize};

use crate::constants::{COUNTER_ID, MAX_INCREMENT_ATTEMPTS};
use crate::errors::CounterError;
use crate::models::counter::store::CounterStore;

pub mod store;

/// The singleton row tracking the running visit count.
#[derive(Debug, Clone, Serialize, Deserialize, DeserializeRow)]
pub struct VisitCount {
    pub id: String,
    pub count: i64,
}

impl VisitCount {
    /// Advances the persisted counter by one and returns the new value.
    ///
    /// Read-increment-write with a conditional write: a missing row is
    /// created only if still absent, an existing one is replaced only if
    /// its count is unchanged since the read. Losing the condition means a
    /// concurrent visit committed in between, so the whole cycle retries.
    pub async fn increment_and_get(store: &dyn CounterStore) -> Result<i64, CounterError> {
        for _ in 0..MAX_INCREMENT_ATTEMPTS {
            let current = store.read(COUNTER_ID).await?.map(|row| row.count);
            let new_count = current.unwrap_or(0) + 1;

            let applied = match current {
                None => store.create(COUNTER_ID, new_count).await?,
                Some(count) => store.replace(COUNTER_ID, count, new_count).await?,
            };

            if applied {
                return Ok(new_count);
            }
        }

        Err(CounterError::StoreConflict(
            "visit count increment kept losing to concurrent writers",
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use futures::future::join_all;

    use super::store::testing::MemoryStore;
    use super::VisitCount;
    use crate::constants::COUNTER_ID;
    use crate::errors::CounterError;

    #[tokio::test]
    async fn first_visit_initializes_the_counter() {
        let store = MemoryStore::default();

        let count = VisitCount::increment_and_get(&store).await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(store.count(COUNTER_ID), Some(1));
    }

    #[tokio::test]
    async fn sequential_visits_count_up_by_one() {
        let store = MemoryStore::default();

        for expected in 1..=5i64 {
            let count = VisitCount::increment_and_get(&store).await.unwrap();

            assert_eq!(count, expected);
        }

        assert_eq!(store.count(COUNTER_ID), Some(5));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_visits_lose_no_updates() {
        let store = Arc::new(MemoryStore::default());
        let visits: i64 = 10;

        let handles = (0..visits).map(|_| {
            let store = store.clone();

            tokio::spawn(async move { VisitCount::increment_and_get(store.as_ref()).await })
        });

        let mut counts: Vec<i64> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        counts.sort_unstable();

        assert_eq!(counts, (1..=visits).collect::<Vec<i64>>());
        assert_eq!(store.count(COUNTER_ID), Some(visits));
    }

    #[tokio::test]
    async fn lost_condition_is_retried_with_a_fresh_read() {
        let store = MemoryStore::default();

        for _ in 0..5 {
            VisitCount::increment_and_get(&store).await.unwrap();
        }

        // The next replace loses to a simulated concurrent visit, which
        // itself lands in the store.
        store.lose_next_replace.store(true, Ordering::SeqCst);

        let count = VisitCount::increment_and_get(&store).await.unwrap();

        assert_eq!(count, 7);
        assert_eq!(store.count(COUNTER_ID), Some(7));
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_a_conflict() {
        let store = MemoryStore::default();
        store.force_conflicts.store(true, Ordering::SeqCst);

        let err = VisitCount::increment_and_get(&store).await.unwrap_err();

        assert!(matches!(err, CounterError::StoreConflict(_)));
        assert_eq!(store.count(COUNTER_ID), None);
    }

    #[tokio::test]
    async fn failed_write_leaves_the_counter_unchanged() {
        let store = MemoryStore::default();

        VisitCount::increment_and_get(&store).await.unwrap();
        VisitCount::increment_and_get(&store).await.unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);

        let err = VisitCount::increment_and_get(&store).await.unwrap_err();

        assert!(matches!(err, CounterError::StoreUnreachable(_)));
        assert_eq!(store.count(COUNTER_ID), Some(2));
    }
}
