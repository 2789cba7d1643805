use serde::Deserialize;
use validator::Validate;

use crate::domain::comment::NewComment;
use crate::domain::types::{CommentId, CommentText, MAX_MESSAGE_LENGTH, PostId, UserId};
use crate::forms::FormError;

const MAX_MESSAGE_LENGTH_U64: u64 = MAX_MESSAGE_LENGTH as u64;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, max = MAX_MESSAGE_LENGTH_U64))]
    pub content: String,
    /// Set when replying to another comment.
    pub parent_id: Option<i64>,
}

pub struct CommentPayload {
    pub content: CommentText,
    pub parent_id: Option<CommentId>,
}

impl TryFrom<CommentForm> for CommentPayload {
    type Error = FormError;

    fn try_from(form: CommentForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let parent_id = form
            .parent_id
            .map(CommentId::new)
            .transpose()
            .map_err(|_| FormError::InvalidId)?;
        Ok(Self {
            content: CommentText::new(form.content)?,
            parent_id,
        })
    }
}

impl CommentPayload {
    pub fn into_domain(self, post_id: PostId, author_id: UserId) -> NewComment {
        NewComment {
            post_id,
            author_id,
            content: self.content,
            parent_id: self.parent_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_only_comment_is_rejected() {
        let form = CommentForm {
            content: "<script>alert(1)</script>".to_string(),
            parent_id: None,
        };
        assert!(CommentPayload::try_from(form).is_err());
    }

    #[test]
    fn reply_keeps_parent() {
        let form = CommentForm {
            content: "Agreed".to_string(),
            parent_id: Some(4),
        };
        let comment = CommentPayload::try_from(form)
            .unwrap()
            .into_domain(PostId::new(1).unwrap(), UserId::new(2).unwrap());
        assert!(comment.is_reply());
        assert_eq!(comment.parent_id, Some(CommentId::new(4).unwrap()));
    }

    #[test]
    fn invalid_parent_is_rejected() {
        let form = CommentForm {
            content: "Agreed".to_string(),
            parent_id: Some(0),
        };
        assert!(matches!(CommentPayload::try_from(form), Err(FormError::InvalidId)));
    }
}
