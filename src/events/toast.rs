//! Transient user-facing messages with a fixed auto-dismiss lifetime.

use crate::core::Timestamp;

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub expires_at: Timestamp,
}

#[derive(Clone, Debug)]
pub struct ToastBoard {
    active: Vec<Toast>,
    lifetime_secs: f64,
    next_id: u64,
}

impl ToastBoard {
    pub fn new(lifetime_secs: f64) -> Self {
        Self {
            active: Vec::new(),
            lifetime_secs,
            next_id: 0,
        }
    }

    /// Show a message until `now + lifetime`. Returns the toast id.
    pub fn push(&mut self, message: impl Into<String>, now: Timestamp) -> u64 {
        self.next_id += 1;
        self.active.push(Toast {
            id: self.next_id,
            message: message.into(),
            expires_at: now.offset(self.lifetime_secs),
        });
        self.next_id
    }

    /// Remove and return the ids of every toast whose lifetime has passed.
    pub fn expire(&mut self, now: Timestamp) -> Vec<u64> {
        let mut expired = Vec::new();
        self.active.retain(|t| {
            let keep = now < t.expires_at;
            if !keep {
                expired.push(t.id);
            }
            keep
        });
        expired
    }

    pub fn active(&self) -> &[Toast] {
        &self.active
    }

    /// Earliest pending expiry.
    pub fn next_expiry(&self) -> Option<Timestamp> {
        self.active
            .iter()
            .map(|t| t.expires_at)
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }
}
