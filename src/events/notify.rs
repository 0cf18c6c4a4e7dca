//! Fire-and-forget collaborator interfaces: audio/haptic notifier and the
//! score/leaderboard sink.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Kinds of feedback the core asks the host to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    Planted,
    Watered,
    Dry,
    Accelerated,
    BadgeEarned,
    WaterReminder,
    Purchased,
}

/// Audio/haptic feedback. Failures are ignored by the caller.
pub trait Notifier: Send {
    fn notify(&mut self, kind: NotificationKind) -> Result<(), String>;
}

/// Leaderboard metric reporting. Failures are logged, never propagated.
pub trait ScoreSink: Send {
    fn report_count(&mut self, metric: &str, value: i64) -> Result<(), String>;
}

/// Notifier that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, kind: NotificationKind) -> Result<(), String> {
        log::debug!("notify {:?}", kind);
        Ok(())
    }
}

/// Score sink that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogScoreSink;

impl ScoreSink for LogScoreSink {
    fn report_count(&mut self, metric: &str, value: i64) -> Result<(), String> {
        log::debug!("score {metric} = {value}");
        Ok(())
    }
}

/// Records every call; clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    notifications: Arc<Mutex<Vec<NotificationKind>>>,
    scores: Arc<Mutex<Vec<(String, i64)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<NotificationKind> {
        self.notifications.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn scores(&self) -> Vec<(String, i64)> {
        self.scores.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.notifications().iter().filter(|&&k| k == kind).count()
    }
}

impl Notifier for Recorder {
    fn notify(&mut self, kind: NotificationKind) -> Result<(), String> {
        self.notifications
            .lock()
            .map(|mut v| v.push(kind))
            .map_err(|e| e.to_string())
    }
}

impl ScoreSink for Recorder {
    fn report_count(&mut self, metric: &str, value: i64) -> Result<(), String> {
        self.scores
            .lock()
            .map(|mut v| v.push((metric.to_string(), value)))
            .map_err(|e| e.to_string())
    }
}
