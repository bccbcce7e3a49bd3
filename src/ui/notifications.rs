use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl NotificationLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
        }
    }

    fn lifetime(&self) -> Duration {
        match self {
            NotificationLevel::Info => Duration::from_secs(2),
            NotificationLevel::Warning => Duration::from_secs(3),
            NotificationLevel::Error => Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
    pub expires_at: Instant,
}

/// Transient messages shown over the video surface.
#[derive(Debug, Default)]
pub struct NotificationManager {
    notifications: Vec<Notification>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify_at(&mut self, level: NotificationLevel, text: impl Into<String>, now: Instant) {
        self.notifications.push(Notification {
            level,
            text: text.into(),
            expires_at: now + level.lifetime(),
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.notify_at(NotificationLevel::Info, text, Instant::now());
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.notify_at(NotificationLevel::Warning, text, Instant::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.notify_at(NotificationLevel::Error, text, Instant::now());
    }

    pub fn tick(&mut self, now: Instant) {
        self.notifications.retain(|n| n.expires_at > now);
    }

    pub fn active_notifications(&self) -> &[Notification] {
        &self.notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_expire_by_level() {
        let now = Instant::now();
        let mut manager = NotificationManager::new();
        manager.notify_at(NotificationLevel::Info, "loaded", now);
        manager.notify_at(NotificationLevel::Error, "broken", now);

        manager.tick(now + Duration::from_millis(2500));
        let active = manager.active_notifications();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].level, NotificationLevel::Error);

        manager.tick(now + Duration::from_secs(4));
        assert!(manager.active_notifications().is_empty());
    }
}
