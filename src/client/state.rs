//! Per-tab authentication mirror.

use chrono::Utc;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Weak,
};
use tokio::sync::watch;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::{
    backend::AuthBackend,
    channel::{Subscription, SyncChannel, SyncEvent, SyncKind},
    error::ClientError,
    jar::CookieJar,
    navigator::Navigator,
};
use crate::api::handlers::auth::{
    guard::LOGIN_PATH, types::DisplayIdentity, DISPLAY_COOKIE_NAME,
};

/// What presentation code renders from. Never used for authorization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub username: Option<String>,
}

impl AuthSnapshot {
    #[must_use]
    pub fn signed_in(username: String) -> Self {
        Self {
            username: Some(username),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }
}

struct Inner {
    context_id: Uuid,
    jar: CookieJar,
    backend: Arc<dyn AuthBackend>,
    navigator: Arc<dyn Navigator>,
    channel: Arc<dyn SyncChannel>,
    snapshot: watch::Sender<AuthSnapshot>,
    /// Bumped by every update; only the most recent one may publish.
    generation: AtomicU64,
}

impl Inner {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish `snapshot` unless a newer update started meanwhile. The check
    /// runs under the watch lock, so publishes are ordered by generation.
    fn publish(&self, generation: u64, snapshot: AuthSnapshot) -> bool {
        self.snapshot.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = snapshot;
            true
        })
    }

    /// Re-read the display cookie, asking the server when none is visible.
    async fn hydrate(&self) {
        let generation = self.next_generation();
        let snapshot = match self.display_identity() {
            Some(identity) => AuthSnapshot::signed_in(identity.username),
            None => match self.backend.session().await {
                Ok(Some(username)) => AuthSnapshot::signed_in(username),
                Ok(None) => AuthSnapshot::default(),
                Err(err) => {
                    warn!(context = %self.context_id, "session lookup failed: {err}");
                    AuthSnapshot::default()
                }
            },
        };
        if self.publish(generation, snapshot) {
            debug!(context = %self.context_id, generation, "hydrated");
        } else {
            debug!(context = %self.context_id, generation, "stale hydrate discarded");
        }
    }

    fn display_identity(&self) -> Option<DisplayIdentity> {
        let raw = self.jar.script_value(DISPLAY_COOKIE_NAME, Utc::now())?;
        let decoded = urlencoding::decode(&raw).ok()?;
        match serde_json::from_str::<DisplayIdentity>(&decoded) {
            Ok(identity) => Some(identity),
            Err(err) => {
                warn!(context = %self.context_id, "unreadable display cookie: {err}");
                None
            }
        }
    }

    fn broadcast(&self, kind: SyncKind) {
        self.channel.notify(SyncEvent {
            origin: self.context_id,
            kind,
        });
    }
}

/// Reactive view of "who is logged in" for one browsing context.
///
/// Tabs of the same browser share a [`CookieJar`] and a [`SyncChannel`]; a
/// login or logout in one tab makes every other tab re-hydrate.
pub struct ClientAuthState {
    inner: Arc<Inner>,
    _subscription: Subscription,
}

impl std::fmt::Debug for ClientAuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientAuthState")
            .field("context_id", &self.inner.context_id)
            .field("snapshot", &*self.inner.snapshot.borrow())
            .finish_non_exhaustive()
    }
}

impl ClientAuthState {
    /// Hydrate from the jar and start listening for other contexts.
    /// Must be called from within a tokio runtime.
    pub async fn mount(
        jar: CookieJar,
        backend: Arc<dyn AuthBackend>,
        navigator: Arc<dyn Navigator>,
        channel: Arc<dyn SyncChannel>,
    ) -> Self {
        let (snapshot, _) = watch::channel(AuthSnapshot::default());
        let inner = Arc::new(Inner {
            context_id: Uuid::new_v4(),
            jar,
            backend,
            navigator,
            channel,
            snapshot,
            generation: AtomicU64::new(0),
        });

        inner.hydrate().await;

        let weak: Weak<Inner> = Arc::downgrade(&inner);
        let context_id = inner.context_id;
        let subscription = inner.channel.on_notify(Box::new(move |event| {
            if event.origin == context_id {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                debug!(context = %context_id, ?event, "sync event received");
                tokio::spawn(async move { inner.hydrate().await });
            }
        }));

        Self {
            inner,
            _subscription: subscription,
        }
    }

    #[must_use]
    pub fn context_id(&self) -> Uuid {
        self.inner.context_id
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.snapshot.borrow().is_authenticated()
    }

    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.inner.snapshot.borrow().username.clone()
    }

    /// Receiver that changes whenever this context's view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Submit credentials. On success the local view flips, other contexts are
    /// told, and the current page is reloaded so the guard decides where we land.
    ///
    /// # Errors
    /// Returns the failure with state untouched; [`ClientError::user_message`]
    /// gives the text to show.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let granted = match self.inner.backend.login(username, password).await {
            Ok(granted) => granted,
            Err(err) => {
                debug!(context = %self.inner.context_id, "login failed: {err}");
                return Err(err);
            }
        };

        let username = granted
            .username
            .or_else(|| self.inner.display_identity().map(|identity| identity.username))
            .unwrap_or_else(|| username.to_string());
        let generation = self.inner.next_generation();
        self.inner
            .publish(generation, AuthSnapshot::signed_in(username));
        self.inner.broadcast(SyncKind::SignedIn);

        if let Err(err) = self.inner.navigator.reload().await {
            warn!(context = %self.inner.context_id, "reload after login failed: {err}");
        }
        Ok(())
    }

    /// Ask the server to drop the session, then clear local state whatever it
    /// answered and go back to the login surface.
    pub async fn logout(&self) {
        if let Err(err) = self.inner.backend.logout().await {
            error!(context = %self.inner.context_id, "logout request failed: {err}");
        }

        let generation = self.inner.next_generation();
        self.inner.publish(generation, AuthSnapshot::default());
        self.inner.broadcast(SyncKind::SignedOut);

        if let Err(err) = self.inner.navigator.navigate(LOGIN_PATH).await {
            warn!(context = %self.inner.context_id, "navigation after logout failed: {err}");
        }
    }

    /// Re-read the cookies now, without waiting for a notification.
    pub async fn refresh(&self) {
        self.inner.hydrate().await;
    }
}
