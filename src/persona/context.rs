// src/persona/context.rs
// Situational context fed into the persona generation prompt

use chrono::{DateTime, Local};

/// Timestamp format used in the generation context (local time, second precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Request-scoped context for one persona generation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    pub user_message: String,
    pub timestamp: Option<String>,
}

impl GenerationContext {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            timestamp: None,
        }
    }

    /// Attach the given instant, formatted with [`TIMESTAMP_FORMAT`]
    pub fn with_time(mut self, now: DateTime<Local>) -> Self {
        self.timestamp = Some(now.format(TIMESTAMP_FORMAT).to_string());
        self
    }

    /// Build the context for a request, stamping the current local time if asked
    pub fn capture(user_message: &str, include_time: bool) -> Self {
        let context = Self::new(user_message);
        if include_time {
            context.with_time(Local::now())
        } else {
            context
        }
    }

    /// Render as the bullet list substituted into the template
    pub fn describe(&self) -> String {
        let mut info = format!("- User's latest message: \"{}\"", self.user_message);
        if let Some(ref ts) = self.timestamp {
            info.push_str(&format!("\n- Current time: {}", ts));
        }
        info
    }
}
