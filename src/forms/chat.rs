use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::chat::{ChatMessage, PendingChatIntent};
use crate::domain::types::{ChatText, MAX_MESSAGE_LENGTH, UserId};
use crate::forms::FormError;

const MAX_MESSAGE_LENGTH_U64: u64 = MAX_MESSAGE_LENGTH as u64;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatMessageForm {
    pub receiver_id: i64,
    #[validate(length(min = 1, max = MAX_MESSAGE_LENGTH_U64))]
    pub message: String,
}

/// Validated message, not yet bound to a sender.
#[derive(Debug)]
pub struct ChatPayload {
    pub receiver_id: UserId,
    pub message: ChatText,
}

impl TryFrom<ChatMessageForm> for ChatPayload {
    type Error = FormError;

    fn try_from(form: ChatMessageForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            receiver_id: UserId::new(form.receiver_id).map_err(|_| FormError::InvalidId)?,
            message: ChatText::new(form.message)?,
        })
    }
}

impl ChatPayload {
    pub fn into_domain(self, sender_id: UserId) -> Result<ChatMessage, FormError> {
        if sender_id == self.receiver_id {
            return Err(FormError::SelfMessage);
        }
        Ok(ChatMessage::outgoing(sender_id, self.receiver_id, self.message))
    }

    /// What gets stored in the session until the visitor signs in.
    pub fn into_intent(self) -> PendingChatIntent {
        PendingChatIntent {
            receiver_id: self.receiver_id.get(),
            message: self.message.into(),
        }
    }
}

impl From<PendingChatIntent> for ChatMessageForm {
    fn from(intent: PendingChatIntent) -> Self {
        Self {
            receiver_id: intent.receiver_id,
            message: intent.message,
        }
    }
}
