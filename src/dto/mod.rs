//! Response bodies of the portal routes.

use serde::Serialize;

use crate::domain::chat::{ChatMessage, PendingChatIntent};
use crate::domain::comment::{Comment, CommentThread};
use crate::domain::types::PostId;
use crate::listing::Identified;
use crate::listing::mutation::LikeState;
use crate::listing::pagination::Paginated;
use crate::listing::query::ListQuery;
use crate::listing::view::ListView;

/// One page of a list view with the query that produced it.
#[derive(Debug, Serialize)]
pub struct ListingData<T> {
    pub query: ListQuery,
    #[serde(flatten)]
    pub page: Paginated<T>,
    /// UI page originally requested when the backend answered another one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resynced_from: Option<usize>,
}

impl<T: Identified> ListingData<T> {
    pub fn from_view(view: ListView<T>, requested_page: usize) -> Self {
        let query = view.query().clone();
        let resynced_from = (query.page() != requested_page).then_some(requested_page);
        Self {
            query,
            page: view.into_paginated(),
            resynced_from,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LikeData {
    pub post_id: PostId,
    #[serde(flatten)]
    pub state: LikeState,
    /// The acknowledgement was unusable and the post was fetched again.
    pub refreshed: bool,
}

/// Result of adding a comment.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "update", rename_all = "snake_case")]
pub enum CommentUpdate {
    /// Top-level comment; append it to the local list.
    Appended { comment: Comment },
    /// Reply; the whole tree was fetched again.
    Refetched { thread: CommentThread },
}

#[derive(Debug, Serialize)]
pub struct LoginRequired {
    pub login_url: String,
    pub pending: PendingChatIntent,
}

#[derive(Debug, Serialize)]
pub struct SessionData {
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    /// Message kept from before sign-in and sent on the user's behalf.
    pub resumed: Option<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
