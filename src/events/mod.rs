//! Outbound notifications: collaborator traits, the UI event bus and toasts

pub mod bus;
pub mod notify;
pub mod toast;

pub use bus::{EventBus, GardenEvent};
pub use notify::{LogNotifier, LogScoreSink, NotificationKind, Notifier, Recorder, ScoreSink};
pub use toast::{Toast, ToastBoard};
