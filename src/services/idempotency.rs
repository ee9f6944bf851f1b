use std::future::Future;

use crate::database::StoreError;

/// Result of a guarded write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome<T> {
    /// This call inserted the record.
    Created(T),
    /// A record with the same key already existed (or was inserted by a
    /// concurrent caller while this one was running).
    Existing(T),
}

impl<T> WriteOutcome<T> {
    pub fn is_new(&self) -> bool {
        matches!(self, WriteOutcome::Created(_))
    }

    pub fn record(&self) -> &T {
        match self {
            WriteOutcome::Created(record) | WriteOutcome::Existing(record) => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            WriteOutcome::Created(record) | WriteOutcome::Existing(record) => record,
        }
    }
}

/// Check-then-insert keyed on a unique index.
///
/// `lookup` finds the record by its key; `insert` writes it. The lookup and
/// the insert are not atomic, so two callers can both miss and both insert.
/// The unique index rejects the second insert with `StoreError::DuplicateKey`,
/// which is turned into a second lookup returning the winner's record.
pub async fn insert_once<T, L, LF, I, IF>(
    lookup: L,
    insert: I,
) -> Result<WriteOutcome<T>, StoreError>
where
    L: Fn() -> LF,
    LF: Future<Output = Result<Option<T>, StoreError>>,
    I: FnOnce() -> IF,
    IF: Future<Output = Result<T, StoreError>>,
{
    if let Some(existing) = lookup().await? {
        return Ok(WriteOutcome::Existing(existing));
    }

    match insert().await {
        Ok(created) => Ok(WriteOutcome::Created(created)),
        Err(StoreError::DuplicateKey) => match lookup().await? {
            Some(existing) => Ok(WriteOutcome::Existing(existing)),
            // The conflicting record vanished between the insert and the
            // re-read; nothing sensible to return.
            None => Err(StoreError::Backend(
                "duplicate key reported but no record found".to_string(),
            )),
        },
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_existing_record_skips_insert() {
        let inserts = AtomicUsize::new(0);
        let outcome = insert_once(
            || async { Ok::<_, StoreError>(Some("stored")) },
            || async {
                inserts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, StoreError>("fresh")
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome, WriteOutcome::Existing("stored"));
        assert_eq!(inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_record_is_inserted() {
        let outcome = insert_once(
            || async { Ok::<_, StoreError>(None) },
            || async { Ok::<_, StoreError>("fresh") },
        )
        .await
        .unwrap();
        assert!(outcome.is_new());
        assert_eq!(outcome.into_record(), "fresh");
    }

    #[tokio::test]
    async fn test_duplicate_key_becomes_existing() {
        // First lookup misses, the insert loses the race, the re-read finds
        // the winner.
        let lookups = AtomicUsize::new(0);
        let outcome = insert_once(
            || {
                let n = lookups.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, StoreError>(if n == 0 { None } else { Some("winner") }) }
            },
            || async { Err::<&str, _>(StoreError::DuplicateKey) },
        )
        .await
        .unwrap();

        assert_eq!(outcome, WriteOutcome::Existing("winner"));
        assert_eq!(lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_backend_errors_propagate() {
        let result: Result<WriteOutcome<&str>, _> = insert_once(
            || async { Ok::<_, StoreError>(None) },
            || async { Err::<&str, _>(StoreError::Backend("down".into())) },
        )
        .await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
