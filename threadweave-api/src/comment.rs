use std::fmt;

use chrono::Utc;
use uuid::Uuid;

use crate::{PostId, Time, User, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A comment as the service stores and returns it: a flat record pointing to
/// its parent, never a nested structure.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,

    /// None for comments attached directly to the post
    #[serde(rename = "parent_comment_id")]
    pub parent_id: Option<CommentId>,

    #[serde(rename = "user_id")]
    pub author_id: UserId,

    pub text: String,

    #[serde(rename = "upvotes")]
    pub upvote_count: u32,

    /// Soft-delete marker, the record stays in the thread
    pub is_deleted: bool,

    pub created_at: Time,

    /// Author object the service may embed alongside the comment
    #[serde(default, rename = "user", skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
}

impl Comment {
    pub fn now(
        post_id: PostId,
        parent_id: Option<CommentId>,
        author_id: UserId,
        text: String,
    ) -> Comment {
        Comment {
            id: CommentId(Uuid::new_v4()),
            post_id,
            parent_id,
            author_id,
            text,
            upvote_count: 0,
            is_deleted: false,
            created_at: Utc::now(),
            author: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
