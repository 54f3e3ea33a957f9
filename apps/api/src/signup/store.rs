use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::signup::SignupEntry;

/// Result of appending to the log.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub entry: SignupEntry,
    pub already_registered: bool,
    pub total: usize,
}

/// Flat, append-only signup log shared across handlers.
#[derive(Debug, Clone, Default)]
pub struct SignupLog {
    entries: Arc<RwLock<Vec<SignupEntry>>>,
}

impl SignupLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a signup. Repeat emails are still recorded and flagged.
    /// `email` is expected to be normalized already.
    pub async fn append(&self, email: String, role: String) -> AppendOutcome {
        let mut entries = self.entries.write().await;
        let already_registered = entries.iter().any(|e| e.email == email);

        let entry = SignupEntry {
            id: Uuid::new_v4(),
            email,
            role,
            created_at: Utc::now(),
        };
        entries.push(entry.clone());

        AppendOutcome {
            entry,
            already_registered,
            total: entries.len(),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    #[cfg(test)]
    pub async fn snapshot(&self) -> Vec<SignupEntry> {
        self.entries.read().await.clone()
    }
}
