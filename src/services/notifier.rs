use serde::Serialize;
use std::sync::Mutex;
use utoipa::ToSchema;

/// Время показа уведомления на странице, мс
pub const NOTIFICATION_DISPLAY_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub display_ms: u64,
}

/// Показ короткого уведомления пользователю
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NotificationKind);
}

/// Пишет уведомления в лог. Используется CLI.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Success => log::info!("[notify] {}", message),
            NotificationKind::Error => log::warn!("[notify] {}", message),
        }
    }
}

/// Накапливает уведомления, чтобы HTTP-слой вернул их странице
#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn last(&self) -> Option<Notification> {
        match self.notifications.lock() {
            Ok(guard) => guard.last().cloned(),
            Err(poisoned) => poisoned.into_inner().last().cloned(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        let notification = Notification {
            message: message.to_string(),
            kind,
            display_ms: NOTIFICATION_DISPLAY_MS,
        };
        match self.notifications.lock() {
            Ok(mut guard) => guard.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
