//! Session lifecycle management.
//!
//! [`SessionGuard`] owns a best-effort boolean view of whether the current
//! operator holds a valid session, transparently refreshing the access
//! token when it nears expiry and reacting to logout signals from this
//! process or elsewhere. Every failure path resolves to "not
//! authenticated"; the guard never surfaces an error to its consumers.

mod events;
mod token;

pub use events::{SessionEvent, SessionEvents};
pub use token::{
    EXPIRY_BUFFER_SECS, TokenClaims, TokenError, decode_claims, is_token_expired, unix_now,
};

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore};

/// Observable authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    /// True only until the first validation pass completes.
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
        }
    }
}

/// Refresh collaborator: obtains a new access token using the stored
/// refresh token and persists the new pair itself. Returns the new access
/// token, or `None` when the session cannot be renewed. Implementations
/// surface their own errors; the guard only consumes the outcome.
#[async_trait]
pub trait RefreshAccessToken: Send + Sync {
    async fn refresh_access_token(&self) -> Option<String>;
}

struct GuardInner {
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn RefreshAccessToken>,
    state: watch::Sender<SessionState>,
    /// Bumped on logout. A validation pass only commits its outcome when
    /// the counter still matches its entry snapshot, so a refresh that
    /// resolves after a logout cannot resurrect the session.
    generation: AtomicU64,
    listener: Mutex<Option<JoinHandle<()>>>,
}

/// Session guard handle. Cheap to clone; all clones share one state.
///
/// Construct once at application start and tear down with
/// [`SessionGuard::shutdown`] when the application exits.
#[derive(Clone)]
pub struct SessionGuard {
    inner: Arc<GuardInner>,
}

impl SessionGuard {
    /// Create a guard over the given store and refresh collaborator and
    /// subscribe it to the session event bus. The initial state is
    /// unauthenticated and loading; call [`validate_and_refresh`] once
    /// after construction.
    ///
    /// [`validate_and_refresh`]: SessionGuard::validate_and_refresh
    pub fn new(
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn RefreshAccessToken>,
        events: &SessionEvents,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let inner = Arc::new(GuardInner {
            store,
            refresher,
            state,
            generation: AtomicU64::new(0),
            listener: Mutex::new(None),
        });

        let handle = tokio::spawn(run_event_loop(Arc::downgrade(&inner), events.subscribe()));
        *inner.listener.lock().expect("listener lock poisoned") = Some(handle);

        Self { inner }
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Validate the stored access token, refreshing it if it is expired.
    ///
    /// Missing token: unauthenticated. Valid token: authenticated without
    /// touching the refresh collaborator. Expired token: one refresh
    /// attempt, logging out on failure. `is_loading` becomes false at the
    /// end of every branch.
    pub async fn validate_and_refresh(&self) {
        let generation = self.inner.generation.load(Ordering::SeqCst);

        let access = match self.inner.store.get(ACCESS_TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Token store read failed, treating session as absent");
                None
            }
        };

        match access {
            None => self.commit(generation, false),
            Some(token) if !is_token_expired(&token, unix_now()) => self.commit(generation, true),
            Some(_) => {
                debug!("Access token expired, attempting refresh");
                match self.inner.refresher.refresh_access_token().await {
                    Some(_) => self.commit(generation, true),
                    None => self.logout().await,
                }
            }
        }

        self.inner
            .state
            .send_if_modified(|s| std::mem::replace(&mut s.is_loading, false));
    }

    /// Clear both stored tokens and mark the session unauthenticated.
    /// Idempotent: logging out while already logged out changes nothing
    /// observable.
    pub async fn logout(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.inner.store.remove(key).await {
                warn!(key = %key, error = %e, "Failed to clear stored token");
            }
        }

        self.inner
            .state
            .send_if_modified(|s| std::mem::replace(&mut s.is_authenticated, false));
    }

    /// Trusted override for callers that have independently established
    /// session validity, e.g. immediately after login. No validation.
    pub fn set_authenticated(&self, value: bool) {
        self.inner
            .state
            .send_if_modified(|s| std::mem::replace(&mut s.is_authenticated, value) != value);
    }

    /// Deregister the event listener. The guard holds no other resources.
    pub fn shutdown(&self) {
        if let Some(handle) = self
            .inner
            .listener
            .lock()
            .expect("listener lock poisoned")
            .take()
        {
            handle.abort();
        }
    }

    /// Commit a validation outcome unless a logout landed in the meantime.
    fn commit(&self, generation: u64, authenticated: bool) {
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding stale validation result");
            return;
        }
        self.inner
            .state
            .send_if_modified(|s| std::mem::replace(&mut s.is_authenticated, authenticated) != authenticated);
    }
}

/// React to session events until the bus closes or the guard is dropped.
async fn run_event_loop(
    inner: Weak<GuardInner>,
    mut rx: broadcast::Receiver<SessionEvent>,
) {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped = skipped, "Session event listener lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let Some(inner) = inner.upgrade() else { break };
        let guard = SessionGuard { inner };

        match event {
            SessionEvent::StoreChanged => {
                // Only a removed access token forces de-authentication
                // here; a replaced token is picked up on the next
                // validation pass.
                let present = matches!(
                    guard.inner.store.get(ACCESS_TOKEN_KEY).await,
                    Ok(Some(_))
                );
                if !present {
                    guard.set_authenticated(false);
                }
            }
            SessionEvent::ForceLogout => guard.logout().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio::time::timeout;

    fn make_token(exp: u64) -> String {
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"user-1","exp":{}}}"#, exp));
        format!("header.{}.signature", payload)
    }

    /// Scripted refresh collaborator. On success it persists the new pair
    /// like the real one does.
    struct ScriptedRefresh {
        store: Arc<MemoryStore>,
        outcome: Option<String>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedRefresh {
        fn new(store: Arc<MemoryStore>, outcome: Option<String>) -> Arc<Self> {
            Arc::new(Self {
                store,
                outcome,
                calls: AtomicUsize::new(0),
                gate: None,
            })
        }

        fn gated(store: Arc<MemoryStore>, outcome: Option<String>, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                store,
                outcome,
                calls: AtomicUsize::new(0),
                gate: Some(gate),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RefreshAccessToken for ScriptedRefresh {
        async fn refresh_access_token(&self) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if let Some(token) = &self.outcome {
                self.store.set(ACCESS_TOKEN_KEY, token).await.unwrap();
                self.store.set(REFRESH_TOKEN_KEY, "rotated").await.unwrap();
            }
            self.outcome.clone()
        }
    }

    fn setup(
        outcome: Option<String>,
    ) -> (SessionGuard, Arc<MemoryStore>, Arc<ScriptedRefresh>, SessionEvents) {
        let store = Arc::new(MemoryStore::new());
        let refresher = ScriptedRefresh::new(store.clone(), outcome);
        let events = SessionEvents::new();
        let guard = SessionGuard::new(store.clone(), refresher.clone(), &events);
        (guard, store, refresher, events)
    }

    #[tokio::test]
    async fn test_initial_state_is_loading() {
        let (guard, _, _, _) = setup(None);
        let state = guard.state();
        assert!(!state.is_authenticated);
        assert!(state.is_loading);
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_empty_store_yields_unauthenticated() {
        let (guard, _, refresher, _) = setup(None);

        guard.validate_and_refresh().await;

        let state = guard.state();
        assert!(!state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(refresher.calls(), 0);
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_valid_token_authenticates_without_refresh() {
        let (guard, store, refresher, _) = setup(None);
        store
            .set(ACCESS_TOKEN_KEY, &make_token(unix_now() + 3600))
            .await
            .unwrap();

        guard.validate_and_refresh().await;

        let state = guard.state();
        assert!(state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(refresher.calls(), 0);
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_expired_token_refreshed_successfully() {
        let fresh = make_token(unix_now() + 3600);
        let (guard, store, refresher, _) = setup(Some(fresh.clone()));
        store
            .set(ACCESS_TOKEN_KEY, &make_token(unix_now() - 10))
            .await
            .unwrap();

        guard.validate_and_refresh().await;

        assert!(guard.state().is_authenticated);
        assert_eq!(refresher.calls(), 1);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), Some(fresh));
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_failed_refresh_logs_out() {
        let (guard, store, refresher, _) = setup(None);
        store
            .set(ACCESS_TOKEN_KEY, &make_token(unix_now() - 10))
            .await
            .unwrap();
        store.set(REFRESH_TOKEN_KEY, "stale-refresh").await.unwrap();

        guard.validate_and_refresh().await;

        let state = guard.state();
        assert!(!state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(refresher.calls(), 1);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY).await.unwrap(), None);
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_undecodable_token_follows_expired_path() {
        let (guard, store, refresher, _) = setup(None);
        store.set(ACCESS_TOKEN_KEY, "garbage").await.unwrap();

        guard.validate_and_refresh().await;

        assert!(!guard.state().is_authenticated);
        assert_eq!(refresher.calls(), 1);
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_logout_clears_store_and_is_idempotent() {
        let (guard, store, _, _) = setup(None);
        store.set(ACCESS_TOKEN_KEY, "a").await.unwrap();
        store.set(REFRESH_TOKEN_KEY, "r").await.unwrap();
        guard.set_authenticated(true);

        guard.logout().await;
        assert!(!guard.state().is_authenticated);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY).await.unwrap(), None);

        // Logging out again changes nothing observable
        guard.logout().await;
        assert!(!guard.state().is_authenticated);
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_set_authenticated_override() {
        let (guard, _, _, _) = setup(None);

        guard.set_authenticated(true);
        assert!(guard.state().is_authenticated);

        guard.set_authenticated(false);
        assert!(!guard.state().is_authenticated);
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_force_logout_event() {
        let (guard, store, _, events) = setup(None);
        store.set(ACCESS_TOKEN_KEY, "a").await.unwrap();
        store.set(REFRESH_TOKEN_KEY, "r").await.unwrap();
        guard.set_authenticated(true);

        let mut rx = guard.subscribe();
        events.force_logout();

        timeout(Duration::from_secs(1), rx.wait_for(|s| !s.is_authenticated))
            .await
            .expect("force logout not observed")
            .unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY).await.unwrap(), None);
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_store_changed_with_token_removed() {
        let (guard, store, refresher, events) = setup(None);
        store.set(ACCESS_TOKEN_KEY, "a").await.unwrap();
        guard.set_authenticated(true);

        store.remove(ACCESS_TOKEN_KEY).await.unwrap();
        let mut rx = guard.subscribe();
        events.store_changed();

        timeout(Duration::from_secs(1), rx.wait_for(|s| !s.is_authenticated))
            .await
            .expect("store change not observed")
            .unwrap();
        // Removal is handled directly, without the refresh flow
        assert_eq!(refresher.calls(), 0);
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_store_changed_with_token_present_is_ignored() {
        let (guard, store, _, events) = setup(None);
        store
            .set(ACCESS_TOKEN_KEY, &make_token(unix_now() + 3600))
            .await
            .unwrap();
        guard.set_authenticated(true);

        events.store_changed();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(guard.state().is_authenticated);
        guard.shutdown();
    }

    #[tokio::test]
    async fn test_logout_during_refresh_is_not_overwritten() {
        let store = Arc::new(MemoryStore::new());
        let gate = Arc::new(Notify::new());
        let refresher = ScriptedRefresh::gated(
            store.clone(),
            Some(make_token(unix_now() + 3600)),
            gate.clone(),
        );
        let events = SessionEvents::new();
        let guard = SessionGuard::new(store.clone(), refresher, &events);
        store
            .set(ACCESS_TOKEN_KEY, &make_token(unix_now() - 10))
            .await
            .unwrap();

        let pending = tokio::spawn({
            let guard = guard.clone();
            async move { guard.validate_and_refresh().await }
        });

        // Let the validation reach the gated refresh, then log out
        tokio::time::sleep(Duration::from_millis(50)).await;
        guard.logout().await;
        gate.notify_one();
        pending.await.unwrap();

        // The late refresh success must not resurrect the session
        assert!(!guard.state().is_authenticated);
        guard.shutdown();
    }
}
