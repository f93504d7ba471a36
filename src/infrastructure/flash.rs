use crate::domain::value_objects::ActionOutcome;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Confirmation,
    Warning,
    Error,
}

/// One message waiting for the next back-office render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// Server-side flash store, keyed by scope, read once then cleared.
///
/// Trigger-driven outcomes run outside a request that can render anything,
/// so their messages park here until the back office asks for them.
#[derive(Default)]
pub struct FlashStore {
    inner: Mutex<HashMap<String, Vec<FlashMessage>>>,
}

impl FlashStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, scope: &str, level: FlashLevel, message: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.entry(scope.to_string()).or_default().push(FlashMessage {
            level,
            message: message.into(),
        });
    }

    pub async fn push_outcome(&self, scope: &str, outcome: &ActionOutcome) {
        let level = match outcome {
            ActionOutcome::Success { .. } => FlashLevel::Confirmation,
            ActionOutcome::Warning { .. } => FlashLevel::Warning,
            ActionOutcome::Error { .. } => FlashLevel::Error,
        };

        self.push(scope, level, outcome.message()).await;
    }

    /// Take every pending message for a scope; a second drain comes back
    /// empty.
    pub async fn drain(&self, scope: &str) -> Vec<FlashMessage> {
        let mut inner = self.inner.lock().await;
        inner.remove(scope).unwrap_or_default()
    }
}
