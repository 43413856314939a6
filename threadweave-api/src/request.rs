use crate::{CommentId, Error, PostId, SortOrder, UserId};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct FetchComments {
    pub post_id: PostId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortOrder>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct FetchReplies {
    pub post_id: PostId,
    pub parent_comment_id: CommentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortOrder>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub parent_comment_id: Option<CommentId>,
    pub user_id: UserId,
    pub text: String,
}

impl NewComment {
    /// Builds the request with surrounding whitespace trimmed from `text`
    pub fn new(
        post_id: PostId,
        parent_comment_id: Option<CommentId>,
        user_id: UserId,
        text: &str,
    ) -> NewComment {
        NewComment {
            post_id,
            parent_comment_id,
            user_id,
            text: String::from(text.trim()),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.text)?;
        if self.text.trim().is_empty() {
            return Err(Error::EmptyText);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UpvoteComment {
    pub comment_id: CommentId,
    pub user_id: UserId,
}

/// Server-authoritative upvote count after a toggle
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Upvoted {
    pub comment_id: CommentId,
    pub upvotes: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DeleteComment {
    pub comment_id: CommentId,
    pub user_id: UserId,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Deleted {
    pub comment_id: CommentId,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct FetchUser {
    pub id: UserId,
}
