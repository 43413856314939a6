use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    api::{self, CommentId, Deleted, NewComment, PostId, SortOrder, Upvoted, User, UserId},
    Error,
};

/// Remote owner of every comment and user record.
///
/// All calls are plain request/response. Implementations must return every
/// comment of the post from `fetch_comments`, at all depths, and only the
/// direct children of `parent` from `fetch_replies`.
#[async_trait]
pub trait CommentService: Send + Sync {
    async fn fetch_comments(
        &self,
        post: PostId,
        sort: Option<SortOrder>,
    ) -> Result<Vec<api::Comment>, Error>;

    async fn fetch_replies(
        &self,
        post: PostId,
        parent: CommentId,
        sort: Option<SortOrder>,
    ) -> Result<Vec<api::Comment>, Error>;

    async fn create_comment(&self, c: NewComment) -> Result<api::Comment, Error>;

    async fn toggle_upvote(&self, comment: CommentId, user: UserId) -> Result<Upvoted, Error>;

    /// Fails with `PermissionDenied` unless `user` wrote the comment or is a
    /// moderator
    async fn delete_comment(&self, comment: CommentId, user: UserId) -> Result<Deleted, Error>;

    async fn fetch_user(&self, user: UserId) -> Result<User, Error>;
}

macro_rules! forward_service {
    ($($impl:tt)*) => {
        #[async_trait]
        $($impl)* {
            async fn fetch_comments(
                &self,
                post: PostId,
                sort: Option<SortOrder>,
            ) -> Result<Vec<api::Comment>, Error> {
                (**self).fetch_comments(post, sort).await
            }

            async fn fetch_replies(
                &self,
                post: PostId,
                parent: CommentId,
                sort: Option<SortOrder>,
            ) -> Result<Vec<api::Comment>, Error> {
                (**self).fetch_replies(post, parent, sort).await
            }

            async fn create_comment(&self, c: NewComment) -> Result<api::Comment, Error> {
                (**self).create_comment(c).await
            }

            async fn toggle_upvote(&self, comment: CommentId, user: UserId) -> Result<Upvoted, Error> {
                (**self).toggle_upvote(comment, user).await
            }

            async fn delete_comment(&self, comment: CommentId, user: UserId) -> Result<Deleted, Error> {
                (**self).delete_comment(comment, user).await
            }

            async fn fetch_user(&self, user: UserId) -> Result<User, Error> {
                (**self).fetch_user(user).await
            }
        }
    };
}

forward_service!(impl<T: CommentService + ?Sized> CommentService for Arc<T>);
forward_service!(impl<'a, T: CommentService + ?Sized> CommentService for &'a T);
