use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use threadweave_client::{
    api::{
        self, CommentId, Deleted, Error, NewComment, PostId, Role, SortOrder, Upvoted, User,
        UserId, Uuid,
    },
    CommentService,
};

mod http;
pub use http::router;

mod seed;

/// In-memory comment service, behaving like the real one as seen from the
/// client
pub struct MockServer(Mutex<State>);

#[derive(Debug, Default)]
struct State {
    offline: bool,
    posts: HashSet<PostId>,
    users: HashMap<UserId, User>,
    // in creation order
    comments: Vec<api::Comment>,
    upvotes: HashMap<CommentId, HashSet<UserId>>,
}

impl State {
    fn check_online(&self) -> Result<(), threadweave_client::Error> {
        match self.offline {
            true => Err(threadweave_client::Error::Transport(anyhow!(
                "mock server is offline"
            ))),
            false => Ok(()),
        }
    }

    fn comment(&self, id: &CommentId) -> Result<&api::Comment, Error> {
        self.comments
            .iter()
            .find(|c| c.id == *id)
            .ok_or(Error::UnknownComment(*id))
    }

    fn comment_mut(&mut self, id: &CommentId) -> Result<&mut api::Comment, Error> {
        self.comments
            .iter_mut()
            .find(|c| c.id == *id)
            .ok_or(Error::UnknownComment(*id))
    }

    fn user(&self, id: &UserId) -> Result<&User, Error> {
        self.users.get(id).ok_or(Error::UnknownUser(*id))
    }

    /// Comments matching `filter`, sorted, with their authors embedded
    fn listing(
        &self,
        sort: Option<SortOrder>,
        filter: impl Fn(&api::Comment) -> bool,
    ) -> Vec<api::Comment> {
        let mut res = self
            .comments
            .iter()
            .filter(|c| filter(c))
            .map(|c| api::Comment {
                author: self.users.get(&c.author_id).cloned(),
                ..c.clone()
            })
            .collect::<Vec<_>>();
        sort.unwrap_or_default().sort(&mut res);
        res
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(Mutex::new(State::default()))
    }

    /// While offline, every call fails as if the service were unreachable
    pub fn test_set_offline(&self, offline: bool) {
        self.0.lock().offline = offline;
    }

    pub fn test_add_user(&self, name: &str, role: Role) -> User {
        let user = User {
            name: String::from(name),
            role,
            created_at: chrono::Utc::now(),
            ..User::placeholder(UserId(Uuid::new_v4()))
        };
        self.0.lock().users.insert(user.id, user.clone());
        user
    }

    pub fn test_add_post(&self) -> PostId {
        let post = PostId(Uuid::new_v4());
        self.0.lock().posts.insert(post);
        post
    }

    /// Stores `c` as-is, without any of the checks `create_comment` does
    pub fn test_insert_comment(&self, c: api::Comment) {
        let mut state = self.0.lock();
        state.posts.insert(c.post_id);
        state.comments.push(c);
    }

    pub fn test_comment(&self, id: &CommentId) -> Option<api::Comment> {
        self.0.lock().comment(id).ok().cloned()
    }

    pub fn test_num_comments(&self, post: &PostId) -> usize {
        self.0
            .lock()
            .comments
            .iter()
            .filter(|c| c.post_id == *post)
            .count()
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl CommentService for MockServer {
    async fn fetch_comments(
        &self,
        post: PostId,
        sort: Option<SortOrder>,
    ) -> Result<Vec<api::Comment>, threadweave_client::Error> {
        let state = self.0.lock();
        state.check_online()?;
        if !state.posts.contains(&post) {
            return Err(Error::UnknownPost(post).into());
        }
        Ok(state.listing(sort, |c| c.post_id == post))
    }

    async fn fetch_replies(
        &self,
        post: PostId,
        parent: CommentId,
        sort: Option<SortOrder>,
    ) -> Result<Vec<api::Comment>, threadweave_client::Error> {
        let state = self.0.lock();
        state.check_online()?;
        if state.comment(&parent)?.post_id != post {
            return Err(Error::UnknownComment(parent).into());
        }
        Ok(state.listing(sort, |c| c.parent_id == Some(parent)))
    }

    async fn create_comment(
        &self,
        req: NewComment,
    ) -> Result<api::Comment, threadweave_client::Error> {
        let mut state = self.0.lock();
        state.check_online()?;
        req.validate()?;
        if !state.posts.contains(&req.post_id) {
            return Err(Error::UnknownPost(req.post_id).into());
        }
        if let Some(parent) = req.parent_comment_id {
            if state.comment(&parent)?.post_id != req.post_id {
                return Err(Error::UnknownComment(parent).into());
            }
        }
        let author = state.user(&req.user_id)?.clone();
        let c = api::Comment::now(
            req.post_id,
            req.parent_comment_id,
            req.user_id,
            String::from(req.text.trim()),
        );
        state.comments.push(c.clone());
        Ok(api::Comment {
            author: Some(author),
            ..c
        })
    }

    async fn toggle_upvote(
        &self,
        comment: CommentId,
        user: UserId,
    ) -> Result<Upvoted, threadweave_client::Error> {
        let mut state = self.0.lock();
        state.check_online()?;
        state.user(&user)?;
        state.comment(&comment)?;
        let voters = state.upvotes.entry(comment).or_default();
        if !voters.remove(&user) {
            voters.insert(user);
        }
        let upvotes = voters.len() as u32;
        state.comment_mut(&comment)?.upvote_count = upvotes;
        Ok(Upvoted {
            comment_id: comment,
            upvotes,
        })
    }

    async fn delete_comment(
        &self,
        comment: CommentId,
        user: UserId,
    ) -> Result<Deleted, threadweave_client::Error> {
        let mut state = self.0.lock();
        state.check_online()?;
        let allowed = state.user(&user)?.can_delete(state.comment(&comment)?);
        if !allowed {
            return Err(Error::PermissionDenied.into());
        }
        state.comment_mut(&comment)?.is_deleted = true;
        Ok(Deleted {
            comment_id: comment,
        })
    }

    async fn fetch_user(&self, user: UserId) -> Result<User, threadweave_client::Error> {
        let state = self.0.lock();
        state.check_online()?;
        Ok(state.user(&user)?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upvotes_toggle_per_user() {
        let srv = MockServer::new();
        let post = srv.test_add_post();
        let alice = srv.test_add_user("alice", Role::User);
        let bob = srv.test_add_user("bob", Role::User);
        let c = srv
            .create_comment(NewComment::new(post, None, alice.id, "hi"))
            .await
            .unwrap();
        assert_eq!(srv.toggle_upvote(c.id, alice.id).await.unwrap().upvotes, 1);
        assert_eq!(srv.toggle_upvote(c.id, bob.id).await.unwrap().upvotes, 2);
        assert_eq!(srv.toggle_upvote(c.id, alice.id).await.unwrap().upvotes, 1);
        assert_eq!(srv.test_comment(&c.id).unwrap().upvote_count, 1);
    }

    #[tokio::test]
    async fn only_author_or_moderator_deletes() {
        let srv = MockServer::new();
        let post = srv.test_add_post();
        let alice = srv.test_add_user("alice", Role::User);
        let bob = srv.test_add_user("bob", Role::User);
        let mod_ = srv.test_add_user("mod", Role::Moderator);
        let c = srv
            .create_comment(NewComment::new(post, None, alice.id, "hi"))
            .await
            .unwrap();
        let err = srv.delete_comment(c.id, bob.id).await.unwrap_err();
        assert_eq!(err.rejection(), Some(&Error::PermissionDenied));
        assert!(!srv.test_comment(&c.id).unwrap().is_deleted);
        srv.delete_comment(c.id, mod_.id).await.unwrap();
        assert!(srv.test_comment(&c.id).unwrap().is_deleted);
    }

    #[tokio::test]
    async fn replies_must_stay_within_their_post() {
        let srv = MockServer::new();
        let post = srv.test_add_post();
        let other = srv.test_add_post();
        let alice = srv.test_add_user("alice", Role::User);
        let c = srv
            .create_comment(NewComment::new(post, None, alice.id, "hi"))
            .await
            .unwrap();
        let err = srv
            .create_comment(NewComment::new(other, Some(c.id), alice.id, "hi"))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(&Error::UnknownComment(c.id)));
        let err = srv
            .create_comment(NewComment::new(post, Some(c.id), alice.id, "   "))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(&Error::EmptyText));
    }

    #[tokio::test]
    async fn offline_fails_every_call() {
        let srv = MockServer::new();
        let post = srv.test_add_post();
        srv.test_set_offline(true);
        assert!(srv.fetch_comments(post, None).await.unwrap_err().is_transport());
        srv.test_set_offline(false);
        assert!(srv.fetch_comments(post, None).await.unwrap().is_empty());
    }
}
