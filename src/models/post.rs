use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::domain::post::Post;
use crate::domain::types::{PostId, PostTitle, TypeConstraintError, UserId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: i64,
    pub author_id: i64,
    #[serde(default)]
    pub author_name: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub trending: bool,
    pub created_at: NaiveDateTime,
}

impl TryFrom<PostRecord> for Post {
    type Error = TypeConstraintError;

    fn try_from(record: PostRecord) -> Result<Self, Self::Error> {
        Ok(Post {
            id: PostId::new(record.id)?,
            author_id: UserId::new(record.author_id)?,
            author_name: record.author_name,
            title: PostTitle::new(record.title)?,
            content: record.content,
            category: record.category,
            likes: record.like_count,
            is_liked: record.liked,
            comments_count: record.comment_count,
            is_trending: record.trending,
            created_at: record.created_at,
        })
    }
}
