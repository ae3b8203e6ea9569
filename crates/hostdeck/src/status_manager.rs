use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub content: String,
    pub message_type: MessageType,
    pub created_at: Instant,
    pub auto_clear_duration: Duration,
}

impl StatusMessage {
    pub fn new(content: String, message_type: MessageType) -> Self {
        Self {
            content,
            message_type,
            created_at: Instant::now(),
            auto_clear_duration: Self::default_duration_for_type(message_type),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.auto_clear_duration
    }

    fn default_duration_for_type(message_type: MessageType) -> Duration {
        match message_type {
            MessageType::Info => Duration::from_secs(3),
            MessageType::Success => Duration::from_secs(2),
            MessageType::Error => Duration::from_secs(7),
        }
    }
}

/// Transient one-line messages for the browse view's status bar.
#[derive(Debug, Clone, Default)]
pub struct StatusManager {
    current_message: Option<StatusMessage>,
}

impl StatusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_info(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, MessageType::Info));
    }

    pub fn set_success(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, MessageType::Success));
    }

    pub fn set_error(&mut self, message: String) {
        self.current_message = Some(StatusMessage::new(message, MessageType::Error));
    }

    /// Drop the current message once it has been shown long enough.
    pub fn update(&mut self) {
        if self
            .current_message
            .as_ref()
            .is_some_and(StatusMessage::is_expired)
        {
            self.current_message = None;
        }
    }

    pub fn current_message(&self) -> Option<&StatusMessage> {
        self.current_message.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_message_wins() {
        let mut status = StatusManager::new();
        status.set_error("boom".to_string());
        status.set_success("Saved".to_string());

        let message = status.current_message().unwrap();
        assert_eq!(message.content, "Saved");
        assert_eq!(message.message_type, MessageType::Success);
    }

    #[test]
    fn test_expired_message_is_dropped() {
        let mut status = StatusManager::new();
        status.set_error("boom".to_string());
        if let Some(message) = status.current_message.as_mut() {
            message.auto_clear_duration = Duration::ZERO;
            message.created_at = Instant::now() - Duration::from_millis(10);
        }

        status.update();
        assert!(status.current_message().is_none());
    }

    #[test]
    fn test_fresh_message_survives_update() {
        let mut status = StatusManager::new();
        status.set_info("hello".to_string());
        status.update();
        assert!(status.current_message().is_some());
    }
}
