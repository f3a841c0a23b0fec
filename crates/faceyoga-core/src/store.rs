//! Synchronized stores: cached remote state with a loading/error lifecycle.
//!
//! Every operation on a [`Store`] goes through the same steps:
//!
//! 1. mark the store loading and clear the previous error;
//! 2. await the remote call;
//! 3. on success, reconcile the cached state with the returned value;
//! 4. on failure, record a human-readable message. Fetches absorb the
//!    failure, mutations hand it back to the caller.
//!
//! `loading` is true while at least one operation is in flight. The `error`
//! field is last-writer-wins when operations overlap.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

/// A failure that can be shown to a user as-is.
pub trait UserFacing {
    /// Short message suitable for inline feedback.
    fn user_message(&self) -> String;
}

impl UserFacing for std::io::Error {
    fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Point-in-time copy of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<S> {
    /// Cached state.
    pub data: S,
    /// Whether any operation is in flight.
    pub loading: bool,
    /// Message from the most recent failure, cleared when an operation starts.
    pub error: Option<String>,
}

struct StoreInner<S> {
    data: S,
    in_flight: usize,
    error: Option<String>,
}

/// Shared, cloneable handle to cached state of type `S`.
///
/// Clones observe and mutate the same state. The lock is only held for the
/// synchronous bookkeeping around a remote call, never across an `.await`.
pub struct Store<S> {
    inner: Arc<RwLock<StoreInner<S>>>,
    version: Arc<watch::Sender<u64>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            version: Arc::clone(&self.version),
        }
    }
}

impl<S: Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read_inner();
        f.debug_struct("Store")
            .field("data", &inner.data)
            .field("loading", &(inner.in_flight > 0))
            .field("error", &inner.error)
            .finish()
    }
}

impl<S> Store<S> {
    /// Create a store holding `data`.
    pub fn new(data: S) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                data,
                in_flight: 0,
                error: None,
            })),
            version: Arc::new(version),
        }
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, StoreInner<S>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, StoreInner<S>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }

    /// Read the cached state.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.read_inner().data)
    }

    /// Patch the cached state directly, without a remote call.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = f(&mut self.write_inner().data);
        self.notify();
        result
    }

    /// Whether any operation is in flight.
    pub fn loading(&self) -> bool {
        self.read_inner().in_flight > 0
    }

    /// Message from the most recent failure.
    pub fn error(&self) -> Option<String> {
        self.read_inner().error.clone()
    }

    /// Copy out the state and both flags.
    pub fn snapshot(&self) -> Snapshot<S>
    where
        S: Clone,
    {
        let inner = self.read_inner();
        Snapshot {
            data: inner.data.clone(),
            loading: inner.in_flight > 0,
            error: inner.error.clone(),
        }
    }

    /// Subscribe to change notifications. The value is a change counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Record a failure detected before any remote call was made.
    pub fn fail(&self, message: impl Into<String>) {
        self.write_inner().error = Some(message.into());
        self.notify();
    }

    /// Drop the recorded error.
    pub fn clear_error(&self) {
        self.write_inner().error = None;
        self.notify();
    }

    fn begin(&self) -> InFlight<'_, S> {
        {
            let mut inner = self.write_inner();
            inner.in_flight += 1;
            inner.error = None;
        }
        self.notify();
        InFlight { store: self }
    }

    /// Run a read against the remote side and replace cached state with it.
    ///
    /// Failures are recorded in [`Store::error`] and not returned; the cached
    /// state is left as it was. Returns whether the fetch succeeded.
    pub async fn fetch<T, E, Fut>(&self, operation: Fut, reconcile: impl FnOnce(&mut S, T)) -> bool
    where
        Fut: Future<Output = Result<T, E>>,
        E: UserFacing,
    {
        let guard = self.begin();
        let outcome = operation.await;
        match outcome {
            Ok(value) => {
                guard.succeed(|data| reconcile(data, value));
                true
            }
            Err(err) => {
                guard.fail(err.user_message());
                false
            }
        }
    }

    /// Run a write against the remote side and patch cached state with its result.
    ///
    /// Failures are recorded in [`Store::error`] and returned to the caller.
    pub async fn mutate<T, R, E, Fut>(
        &self,
        operation: Fut,
        reconcile: impl FnOnce(&mut S, T) -> R,
    ) -> Result<R, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: UserFacing,
    {
        let guard = self.begin();
        let outcome = operation.await;
        match outcome {
            Ok(value) => Ok(guard.succeed(|data| reconcile(data, value))),
            Err(err) => {
                guard.fail(err.user_message());
                Err(err)
            }
        }
    }
}

impl<S: Default> Store<S> {
    /// Return to the initial, empty state.
    pub fn reset(&self) {
        {
            let mut inner = self.write_inner();
            inner.data = S::default();
            inner.error = None;
        }
        self.notify();
    }
}

/// Marks one operation as in flight until dropped.
struct InFlight<'a, S> {
    store: &'a Store<S>,
}

impl<S> InFlight<'_, S> {
    fn succeed<R>(self, reconcile: impl FnOnce(&mut S) -> R) -> R {
        let mut inner = self.store.write_inner();
        reconcile(&mut inner.data)
    }

    fn fail(self, message: String) {
        self.store.write_inner().error = Some(message);
    }
}

impl<S> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        {
            let mut inner = self.store.write_inner();
            inner.in_flight = inner.in_flight.saturating_sub(1);
        }
        self.store.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Collection, Identified};
    use std::io;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: u32,
        notes: String,
    }

    impl Identified for Entry {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    fn entry(id: u32, notes: &str) -> Entry {
        Entry {
            id,
            notes: notes.to_string(),
        }
    }

    fn seeded() -> Store<Collection<Entry>> {
        Store::new(Collection::from(vec![entry(1, "day one"), entry(2, "day two")]))
    }

    fn offline() -> io::Error {
        io::Error::new(io::ErrorKind::NotConnected, "Failed to fetch progress")
    }

    #[tokio::test]
    async fn test_fetch_success_replaces_state() {
        let store = seeded();
        store.fail("stale");

        let ok = store
            .fetch(
                async { Ok::<_, io::Error>(vec![entry(7, "fresh"), entry(3, "older")]) },
                Collection::replace_all,
            )
            .await;

        assert!(ok);
        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.error, None);
        assert_eq!(
            snapshot.data.into_vec(),
            vec![entry(7, "fresh"), entry(3, "older")]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_absorbed() {
        let store = seeded();
        let before = store.read(Clone::clone);

        let ok = store
            .fetch(async { Err::<Vec<Entry>, _>(offline()) }, Collection::replace_all)
            .await;

        assert!(!ok);
        assert!(!store.loading());
        assert_eq!(store.error().as_deref(), Some("Failed to fetch progress"));
        assert_eq!(store.read(Clone::clone), before);
    }

    #[tokio::test]
    async fn test_mutate_success_returns_reconciled_value() {
        let store = seeded();

        let created = store
            .mutate(async { Ok::<_, io::Error>(entry(3, "day three")) }, |data, new| {
                data.prepend(new.clone());
                new
            })
            .await
            .unwrap();

        assert_eq!(created.id, 3);
        assert_eq!(store.read(Collection::len), 3);
        assert_eq!(store.read(|c| c.as_slice()[0].id), 3);
    }

    #[tokio::test]
    async fn test_mutate_failure_is_resignaled() {
        let store = seeded();

        let result = store
            .mutate(async { Err::<Entry, _>(offline()) }, |data, new| {
                data.prepend(new);
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotConnected);
        assert_eq!(store.read(Collection::len), 2);
        assert!(store.error().is_some());
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_loading_while_in_flight() {
        let store = seeded();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let background = store.clone();
        let handle = tokio::spawn(async move {
            background
                .fetch(
                    async move {
                        let _ = rx.await;
                        Ok::<_, io::Error>(Vec::new())
                    },
                    Collection::replace_all,
                )
                .await
        });

        tokio::time::timeout(Duration::from_secs(1), async {
            while !store.loading() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("store never entered loading state");

        tx.send(()).unwrap();
        assert!(handle.await.unwrap());
        assert!(!store.loading());
        assert!(store.read(Collection::is_empty));
    }

    #[tokio::test]
    async fn test_overlapping_operations_keep_loading_until_last_finishes() {
        let store: Store<Collection<Entry>> = Store::default();
        let (first_tx, first_rx) = tokio::sync::oneshot::channel::<()>();
        let (second_tx, second_rx) = tokio::sync::oneshot::channel::<()>();

        let a = store.clone();
        let first = tokio::spawn(async move {
            a.fetch(
                async move {
                    let _ = first_rx.await;
                    Ok::<_, io::Error>(vec![entry(1, "a")])
                },
                Collection::replace_all,
            )
            .await
        });
        let b = store.clone();
        let second = tokio::spawn(async move {
            b.fetch(
                async move {
                    let _ = second_rx.await;
                    Ok::<_, io::Error>(vec![entry(2, "b")])
                },
                Collection::replace_all,
            )
            .await
        });

        tokio::time::timeout(Duration::from_secs(1), async {
            while store.read_inner().in_flight < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("both operations should be in flight");

        first_tx.send(()).unwrap();
        assert!(first.await.unwrap());
        assert!(store.loading());

        second_tx.send(()).unwrap();
        assert!(second.await.unwrap());
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_cancelled_operation_releases_loading() {
        let store: Store<Collection<Entry>> = Store::default();

        let pending = store.fetch(
            std::future::pending::<Result<Vec<Entry>, io::Error>>(),
            Collection::replace_all,
        );
        let _ = tokio::time::timeout(Duration::from_millis(5), pending).await;

        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_subscribe_sees_changes() {
        let store = seeded();
        let mut changes = store.subscribe();

        store.update(|data| data.append(entry(9, "manual")));

        assert!(changes.has_changed().unwrap());
        changes.mark_unchanged();
        store.fail("nope");
        assert!(changes.has_changed().unwrap());
    }

    #[test]
    fn test_reset_clears_everything() {
        let store = seeded();
        store.fail("boom");

        store.reset();

        let snapshot = store.snapshot();
        assert!(snapshot.data.is_empty());
        assert_eq!(snapshot.error, None);
        assert!(!snapshot.loading);
    }
}
