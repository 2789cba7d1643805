use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{PostId, PostTitle, UserId};
use crate::listing::Identified;
use crate::listing::mutation::{LikeState, Likeable};
use crate::listing::refine::Refinable;

pub const CATEGORY_FILTER: &str = "category";

/// Community board post.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub title: PostTitle,
    pub content: String,
    pub category: String,
    pub likes: u64,
    /// Whether the signed-in user liked the post.
    pub is_liked: bool,
    pub comments_count: u64,
    pub is_trending: bool,
    pub created_at: NaiveDateTime,
}

impl Identified for Post {
    type Id = PostId;

    fn id(&self) -> PostId {
        self.id
    }
}

impl Refinable for Post {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.content.as_str(),
            self.author_name.as_str(),
        ]
    }

    fn category(&self, key: &str) -> Option<&str> {
        (key == CATEGORY_FILTER).then_some(self.category.as_str())
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.created_at
    }

    fn popularity(&self) -> u64 {
        self.likes
    }

    fn is_trending(&self) -> bool {
        self.is_trending
    }
}

impl Likeable for Post {
    fn like_state(&self) -> LikeState {
        LikeState::new(self.is_liked, self.likes)
    }

    fn set_like_state(&mut self, state: LikeState) {
        self.is_liked = state.is_liked;
        self.likes = state.likes;
    }
}
