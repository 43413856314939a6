use anyhow::Context;
use async_trait::async_trait;

use crate::{
    api::{
        self, CommentId, DeleteComment, Deleted, FetchComments, FetchReplies, FetchUser,
        NewComment, PostId, SortOrder, UpvoteComment, Upvoted, User, UserId,
    },
    CommentService, Error,
};

/// `CommentService` reached over HTTP, every call being a JSON `POST`
#[derive(Clone, Debug)]
pub struct HttpService {
    client: reqwest::Client,
    host: String,
}

impl HttpService {
    pub fn new(host: &str) -> HttpService {
        HttpService::with_client(reqwest::Client::new(), host)
    }

    pub fn with_client(client: reqwest::Client, host: &str) -> HttpService {
        HttpService {
            client,
            host: String::from(host.trim_end_matches('/')),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn call<Req, Resp>(&self, endpoint: &str, body: &Req) -> Result<Resp, Error>
    where
        Req: serde::Serialize + Sync,
        Resp: for<'de> serde::Deserialize<'de>,
    {
        let resp = self
            .client
            .post(format!("{}/{}", self.host, endpoint))
            .json(body)
            .send()
            .await
            .with_context(|| format!("sending request to {endpoint}"))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("receiving response body of {endpoint}"))?;
        if status.is_success() {
            return Ok(serde_json::from_slice(&body)
                .with_context(|| format!("parsing response of {endpoint}"))?);
        }
        match api::Error::parse(&body) {
            Ok(err) => {
                tracing::debug!(%status, "{endpoint} was rejected: {err}");
                Err(Error::Rejected(err))
            }
            Err(err) => Err(Error::Transport(
                err.context(format!("{endpoint} answered {status} with an unknown body")),
            )),
        }
    }
}

#[async_trait]
impl CommentService for HttpService {
    async fn fetch_comments(
        &self,
        post: PostId,
        sort: Option<SortOrder>,
    ) -> Result<Vec<api::Comment>, Error> {
        self.call(
            "get-post-comments",
            &FetchComments {
                post_id: post,
                sort_by: sort,
            },
        )
        .await
    }

    async fn fetch_replies(
        &self,
        post: PostId,
        parent: CommentId,
        sort: Option<SortOrder>,
    ) -> Result<Vec<api::Comment>, Error> {
        self.call(
            "get-comment-reply",
            &FetchReplies {
                post_id: post,
                parent_comment_id: parent,
                sort_by: sort,
            },
        )
        .await
    }

    async fn create_comment(&self, c: NewComment) -> Result<api::Comment, Error> {
        self.call("create-comment", &c).await
    }

    async fn toggle_upvote(&self, comment: CommentId, user: UserId) -> Result<Upvoted, Error> {
        self.call(
            "upvote-comment",
            &UpvoteComment {
                comment_id: comment,
                user_id: user,
            },
        )
        .await
    }

    async fn delete_comment(&self, comment: CommentId, user: UserId) -> Result<Deleted, Error> {
        self.call(
            "delete-comment",
            &DeleteComment {
                comment_id: comment,
                user_id: user,
            },
        )
        .await
    }

    async fn fetch_user(&self, user: UserId) -> Result<User, Error> {
        self.call("get-user", &FetchUser { id: user }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        assert_eq!(
            HttpService::new("http://localhost:3000/").host(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_failure() {
        // port 9 (discard) is not expected to run an http server
        let service = HttpService::new("http://127.0.0.1:9");
        let err = service
            .fetch_comments(PostId::stub(), None)
            .await
            .expect_err("nothing listens there");
        assert!(err.is_transport(), "got {err:?}");
    }
}
