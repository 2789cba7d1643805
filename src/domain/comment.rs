//! Nested post comments.
//!
//! Top-level comments form a flat list and are appended in place after a
//! successful create. Replies live at arbitrary depth, so a reply is followed
//! by a refetch of the whole tree instead of a local patch.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{CommentId, CommentText, PostId, UserId};
use crate::listing::Identified;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub author_id: UserId,
    pub author_name: String,
    pub content: CommentText,
    pub created_at: NaiveDateTime,
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Number of comments in this subtree, the comment itself included.
    pub fn subtree_len(&self) -> usize {
        1 + self.replies.iter().map(Comment::subtree_len).sum::<usize>()
    }

    fn find(&self, id: CommentId) -> Option<&Comment> {
        if self.id == id {
            return Some(self);
        }
        self.replies.iter().find_map(|reply| reply.find(id))
    }
}

impl Identified for Comment {
    type Id = CommentId;

    fn id(&self) -> CommentId {
        self.id
    }
}

/// Comment to be created on a post, optionally as a reply.
#[derive(Clone, Debug, PartialEq)]
pub struct NewComment {
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: CommentText,
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// How a thread must be updated after a comment was created.
#[derive(Debug, PartialEq)]
pub enum ThreadUpdate {
    /// The comment was appended to the top level.
    Appended,
    /// The comment was a reply; the tree must be fetched again.
    RefetchRequired,
}

/// Comment tree of one post.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CommentThread {
    pub post_id: PostId,
    pub comments: Vec<Comment>,
}

impl CommentThread {
    pub fn new(post_id: PostId, comments: Vec<Comment>) -> Self {
        Self { post_id, comments }
    }

    /// Total number of comments at every depth.
    pub fn len(&self) -> usize {
        self.comments.iter().map(Comment::subtree_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find_map(|comment| comment.find(id))
    }

    /// Reconciles a freshly created comment with the local tree.
    pub fn absorb(&mut self, created: Comment) -> ThreadUpdate {
        if created.is_reply() {
            return ThreadUpdate::RefetchRequired;
        }
        self.comments.push(created);
        ThreadUpdate::Appended
    }

    /// Replaces the whole tree with a refetched copy.
    pub fn replace(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn comment(id: i64, parent: Option<i64>, replies: Vec<Comment>) -> Comment {
        Comment {
            id: CommentId::new(id).unwrap(),
            post_id: PostId::new(1).unwrap(),
            parent_id: parent.map(|p| CommentId::new(p).unwrap()),
            author_id: UserId::new(3).unwrap(),
            author_name: "Jane".to_string(),
            content: CommentText::new(format!("comment {id}")).unwrap(),
            created_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            replies,
        }
    }

    fn thread() -> CommentThread {
        CommentThread::new(
            PostId::new(1).unwrap(),
            vec![
                comment(1, None, vec![comment(2, Some(1), vec![comment(3, Some(2), vec![])])]),
                comment(4, None, vec![]),
            ],
        )
    }

    #[test]
    fn len_counts_every_depth() {
        assert_eq!(thread().len(), 4);
        assert!(thread().find(CommentId::new(3).unwrap()).is_some());
        assert!(thread().find(CommentId::new(9).unwrap()).is_none());
    }

    #[test]
    fn top_level_comment_is_appended() {
        let mut thread = thread();
        let update = thread.absorb(comment(5, None, vec![]));
        assert_eq!(update, ThreadUpdate::Appended);
        assert_eq!(thread.comments.len(), 3);
        assert_eq!(thread.len(), 5);
    }

    #[test]
    fn reply_requires_refetch_and_leaves_tree_untouched() {
        let mut thread = thread();
        let before = thread.clone();
        let update = thread.absorb(comment(6, Some(3), vec![]));
        assert_eq!(update, ThreadUpdate::RefetchRequired);
        assert_eq!(thread, before);
    }
}
