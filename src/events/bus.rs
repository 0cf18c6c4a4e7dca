//! Change notification for the UI layer.
//!
//! The garden publishes a [`GardenEvent`] for every observable state change.
//! Subscribers receive them over a tokio broadcast channel; publishing never
//! blocks and never fails when nobody is listening.

use tokio::sync::broadcast;

use crate::badges::Badge;
use crate::sim::{Stage, TreeId};

#[derive(Clone, Debug, PartialEq)]
pub enum GardenEvent {
    TreePlanted { id: TreeId, name: String },
    TreeWatered { id: TreeId, count_today: u32 },
    TreeDried { id: TreeId },
    TreeRecovered { id: TreeId },
    StageChanged { id: TreeId, from: Stage, to: Stage },
    TreeRenamed { id: TreeId, from: String, to: String },
    Accelerated { id: TreeId },
    SelectionChanged { id: Option<TreeId> },
    BadgeEarned { badge: Badge, credits: u32 },
    CreditsChanged { credits: u32 },
    Toast { id: u64, message: String },
    ToastDismissed { id: u64 },
}

pub struct EventBus {
    sender: broadcast::Sender<GardenEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GardenEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: GardenEvent) {
        // Err only means there are no subscribers
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        bus.publish(GardenEvent::SelectionChanged { id: None });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_receives_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let id = TreeId::new();
        bus.publish(GardenEvent::TreeDried { id });
        bus.publish(GardenEvent::TreeRecovered { id });

        assert_eq!(rx.try_recv().unwrap(), GardenEvent::TreeDried { id });
        assert_eq!(rx.try_recv().unwrap(), GardenEvent::TreeRecovered { id });
        assert!(rx.try_recv().is_err());
    }
}
