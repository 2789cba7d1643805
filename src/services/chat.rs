//! Direct messages and the sign-in handshake that resumes them.

use crate::domain::chat::{ChatMessage, PendingChatIntent};
use crate::forms::chat::{ChatMessageForm, ChatPayload};
use crate::forms::session::LoginForm;
use crate::messaging::ChatPublisher;
use crate::models::auth::AuthenticatedUser;
use crate::services::{ServiceError, ServiceResult};

/// Validates the message and hands it to the publisher.
pub fn send_message<P>(
    publisher: &P,
    user: &AuthenticatedUser,
    form: ChatMessageForm,
) -> ServiceResult<ChatMessage>
where
    P: ChatPublisher + ?Sized,
{
    let sender_id = user.user_id()?;
    let payload = ChatPayload::try_from(form)?;

    let message = payload.into_domain(sender_id)?;

    publisher.publish(&message).map_err(|err| {
        log::error!("Failed to publish chat message: {err}");
        err
    })?;

    Ok(message)
}

/// Validates a message from a signed-out visitor and turns it into an
/// intent to keep until sign-in.
pub fn defer_message(form: ChatMessageForm) -> ServiceResult<PendingChatIntent> {
    let payload = ChatPayload::try_from(form)?;
    Ok(payload.into_intent())
}

/// Sends a message kept from before sign-in on behalf of `user`.
pub fn resume_message<P>(
    publisher: &P,
    user: &AuthenticatedUser,
    intent: PendingChatIntent,
) -> ServiceResult<ChatMessage>
where
    P: ChatPublisher + ?Sized,
{
    send_message(publisher, user, ChatMessageForm::from(intent))
}

/// Verifies a backend-issued token.
pub fn sign_in(form: &LoginForm, secret: &str) -> ServiceResult<AuthenticatedUser> {
    AuthenticatedUser::from_token(form.token.trim(), secret).map_err(|err| {
        log::warn!("Rejected sign-in token: {err}");
        ServiceError::Unauthorized
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::labels::MessageStatus;
    use crate::messaging::{MessagingError, MockChatPublisher};
    use crate::services::test_support::member_user;

    fn form(receiver_id: i64, message: &str) -> ChatMessageForm {
        ChatMessageForm {
            receiver_id,
            message: message.to_string(),
        }
    }

    #[test]
    fn message_is_published_with_sender_and_status() {
        let mut publisher = MockChatPublisher::new();
        publisher
            .expect_publish()
            .withf(|message| {
                message.sender_id.get() == 3
                    && message.receiver_id.get() == 8
                    && message.message.as_str() == "Hello"
                    && message.status == MessageStatus::Sent
            })
            .times(1)
            .returning(|_| Ok(()));

        let message = send_message(&publisher, &member_user(), form(8, "Hello")).unwrap();

        assert_eq!(message.receiver_id.get(), 8);
    }

    #[test]
    fn invalid_message_is_not_published() {
        let mut publisher = MockChatPublisher::new();
        publisher.expect_publish().times(0);

        let result = send_message(&publisher, &member_user(), form(8, ""));
        assert!(matches!(result, Err(ServiceError::Form(_))));

        let result = send_message(&publisher, &member_user(), form(3, "Note to self"));
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn closed_channel_is_a_messaging_error() {
        let mut publisher = MockChatPublisher::new();
        publisher
            .expect_publish()
            .returning(|_| Err(MessagingError::Closed));

        let result = send_message(&publisher, &member_user(), form(8, "Hello"));

        assert!(matches!(result, Err(ServiceError::Messaging(_))));
    }

    #[test]
    fn deferred_message_resumes_after_sign_in() {
        let intent = defer_message(form(8, "Hi there")).unwrap();
        assert_eq!(intent.receiver_id, 8);

        let mut publisher = MockChatPublisher::new();
        publisher
            .expect_publish()
            .withf(|message| message.message.as_str() == "Hi there")
            .times(1)
            .returning(|_| Ok(()));

        let message = resume_message(&publisher, &member_user(), intent).unwrap();
        assert_eq!(message.sender_id.get(), 3);
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let form = LoginForm {
            token: "not-a-jwt".to_string(),
        };
        assert!(matches!(
            sign_in(&form, "secret"),
            Err(ServiceError::Unauthorized)
        ));
    }
}
