use crate::application::CheckoutSession;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Server-side checkout sessions, keyed by the generated session id.
///
/// The return handler resolves the expected amount, currency and payment
/// intent from here; a session whose intent was never stored can only be
/// recovered by paying again.
#[derive(Default)]
pub struct CheckoutSessionStore {
    inner: Mutex<HashMap<Uuid, CheckoutSession>>,
}

impl CheckoutSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, session: CheckoutSession) {
        let mut inner = self.inner.lock().await;
        inner.insert(session.session_id, session);
    }

    pub async fn get(&self, session_id: Uuid) -> Option<CheckoutSession> {
        let inner = self.inner.lock().await;
        inner.get(&session_id).cloned()
    }

    /// Remove a settled session.
    pub async fn remove(&self, session_id: Uuid) -> Option<CheckoutSession> {
        let mut inner = self.inner.lock().await;
        inner.remove(&session_id)
    }
}
