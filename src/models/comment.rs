use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::comment::{Comment, NewComment};
use crate::domain::types::{CommentId, CommentText, PostId, TypeConstraintError, UserId};

/// Comment node as returned by the backend; replies nest recursively.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: i64,
    pub post_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub author_id: i64,
    #[serde(default)]
    pub author_name: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub replies: Vec<CommentRecord>,
}

impl TryFrom<CommentRecord> for Comment {
    type Error = TypeConstraintError;

    fn try_from(record: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: CommentId::new(record.id)?,
            post_id: PostId::new(record.post_id)?,
            parent_id: record.parent_id.map(CommentId::new).transpose()?,
            author_id: UserId::new(record.author_id)?,
            author_name: record.author_name,
            content: CommentText::from_stored(record.content),
            created_at: record.created_at,
            replies: record
                .replies
                .into_iter()
                .map(Comment::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

/// Body of `POST /posts/{id}/comments`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentBody<'a> {
    pub author_id: i64,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

impl<'a> From<&'a NewComment> for NewCommentBody<'a> {
    fn from(comment: &'a NewComment) -> Self {
        Self {
            author_id: comment.author_id.get(),
            content: comment.content.as_str(),
            parent_id: comment.parent_id.map(CommentId::get),
        }
    }
}
