use crate::types::NotificationKind;
use uuid::Uuid;

/// A transient, never-persisted UI message.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: String,
    pub message: String,
    pub kind: NotificationKind,
    /// Hint for how long a consumer should display the toast.
    pub timeout_ms: u64,
}

type Listener = Box<dyn Fn(&Toast) + Send + Sync>;

/// In-process fan-out channel for toasts. Subscribers are called inline on
/// `show`; there is no buffering and nothing is stored.
#[derive(Default)]
pub struct ToastHub {
    listeners: Vec<Listener>,
}

impl ToastHub {
    pub fn subscribe(&mut self, listener: impl Fn(&Toast) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn show(&self, message: &str, kind: NotificationKind, timeout_ms: u64) -> Toast {
        let toast = Toast {
            id: Uuid::new_v4().to_string(),
            message: message.to_string(),
            kind,
            timeout_ms,
        };
        for listener in &self.listeners {
            listener(&toast);
        }
        toast
    }
}
