//! Command-line front end

pub mod autoresponses;
pub mod commands;
pub mod converters;
pub mod groups;
pub mod render;
pub mod stats;
pub mod words;

use crate::notify::{Notification, NotificationSink};

/// Prints each notification to stderr as soon as it is posted
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn show(&mut self, notification: &Notification) {
        eprintln!("{}", render::banner(notification));
    }
}
