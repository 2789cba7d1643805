//! Outbound direct messages.

use thiserror::Error;

use crate::domain::chat::ChatMessage;

pub mod stomp;

pub use stomp::{StompOptions, StompPublisher};

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("chat channel is closed")]
    Closed,

    #[error("invalid STOMP frame: {0}")]
    Frame(String),

    #[error("websocket error: {0}")]
    Transport(String),

    #[error("broker error: {0}")]
    Broker(String),
}

/// Publishes direct messages to the chat broker.
///
/// Implementations only hand the message over; delivery and
/// acknowledgement belong to the broker.
pub trait ChatPublisher: Send + Sync {
    fn publish(&self, message: &ChatMessage) -> Result<(), MessagingError>;
}

#[cfg(any(test, feature = "test-mocks"))]
mockall::mock! {
    pub ChatPublisher {}

    impl ChatPublisher for ChatPublisher {
        fn publish(&self, message: &ChatMessage) -> Result<(), MessagingError>;
    }
}
