//! Transient user notifications
//!
//! Every notification lives for a fixed lifetime, independently of the
//! others, and they stack. Expiry is evaluated against the tokio clock, so
//! tests can drive it with a paused runtime.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Danger,
    Info,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Danger => "danger",
            Level::Info => "info",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub level: Level,
    pub message: String,
    pub posted_at: Instant,
}

impl Notification {
    pub fn expires_at(&self, lifetime: Duration) -> Instant {
        self.posted_at + lifetime
    }
}

/// Receives each notification as it is posted, e.g. to print a banner
pub trait NotificationSink: Send {
    fn show(&mut self, notification: &Notification);
}

/// Stack of live notifications for one session
pub struct NotificationCenter {
    lifetime: Duration,
    active: Vec<Notification>,
    sink: Option<Box<dyn NotificationSink>>,
}

impl NotificationCenter {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            active: Vec::new(),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn notify(&mut self, level: Level, message: impl Into<String>) -> Uuid {
        let message = message.into();
        match level {
            Level::Success | Level::Info => info!("{}", message),
            Level::Warning => warn!("{}", message),
            Level::Danger => error!("{}", message),
        }

        self.prune();
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            message,
            posted_at: Instant::now(),
        };
        if let Some(sink) = self.sink.as_mut() {
            sink.show(&notification);
        }

        let id = notification.id;
        self.active.push(notification);
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> Uuid {
        self.notify(Level::Success, message)
    }

    pub fn danger(&mut self, message: impl Into<String>) -> Uuid {
        self.notify(Level::Danger, message)
    }

    /// Notifications still within their lifetime, oldest first
    pub fn visible(&self) -> Vec<&Notification> {
        let now = Instant::now();
        self.active
            .iter()
            .filter(|n| n.expires_at(self.lifetime) > now)
            .collect()
    }

    /// Drop expired notifications
    pub fn prune(&mut self) {
        let now = Instant::now();
        let lifetime = self.lifetime;
        self.active.retain(|n| n.expires_at(lifetime) > now);
    }

    /// Remove one notification before it expires
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }
}
