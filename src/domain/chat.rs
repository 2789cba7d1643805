use serde::{Deserialize, Serialize};

use crate::domain::labels::MessageStatus;
use crate::domain::types::{ChatText, UserId};

/// Direct message published on the chat channel.
///
/// Serialises to the broker payload `{senderId, receiverId, message, status}`.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub message: ChatText,
    pub status: MessageStatus,
}

impl ChatMessage {
    /// New outgoing message, always starting as [`MessageStatus::Sent`].
    pub fn outgoing(sender_id: UserId, receiver_id: UserId, message: ChatText) -> Self {
        Self {
            sender_id,
            receiver_id,
            message,
            status: MessageStatus::Sent,
        }
    }
}

/// Message a signed-out visitor tried to send, kept until they sign in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingChatIntent {
    pub receiver_id: i64,
    pub message: String,
}
