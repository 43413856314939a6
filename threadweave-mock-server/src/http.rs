use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    routing::{get, post},
    Json, Router,
};
use threadweave_client::{
    api::{
        self, DeleteComment, Deleted, FetchComments, FetchReplies, FetchUser, NewComment,
        UpvoteComment, Upvoted, User,
    },
    CommentService,
};

use crate::MockServer;

/// Wraps a client-side error so it can be sent back over the wire
#[derive(Debug)]
pub struct HttpError(threadweave_client::Error);

impl From<threadweave_client::Error> for HttpError {
    fn from(e: threadweave_client::Error) -> HttpError {
        HttpError(e)
    }
}

impl axum::response::IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let err = match self.0 {
            threadweave_client::Error::Transport(err) => {
                tracing::error!(?err, "internal server error");
                api::Error::Unknown(format!("Internal server error: {err:#}"))
            }
            threadweave_client::Error::Rejected(err) => {
                tracing::info!("returning error to client: {err}");
                err
            }
        };
        (
            err.status_code(),
            [(header::CONTENT_TYPE, "application/json")],
            err.contents(),
        )
            .into_response()
    }
}

type Srv = State<Arc<MockServer>>;

async fn health() -> &'static str {
    "ok"
}

async fn get_post_comments(
    State(srv): Srv,
    Json(req): Json<FetchComments>,
) -> Result<Json<Vec<api::Comment>>, HttpError> {
    Ok(Json(srv.fetch_comments(req.post_id, req.sort_by).await?))
}

async fn get_comment_reply(
    State(srv): Srv,
    Json(req): Json<FetchReplies>,
) -> Result<Json<Vec<api::Comment>>, HttpError> {
    Ok(Json(
        srv.fetch_replies(req.post_id, req.parent_comment_id, req.sort_by)
            .await?,
    ))
}

async fn create_comment(
    State(srv): Srv,
    Json(req): Json<NewComment>,
) -> Result<Json<api::Comment>, HttpError> {
    Ok(Json(srv.create_comment(req).await?))
}

async fn upvote_comment(
    State(srv): Srv,
    Json(req): Json<UpvoteComment>,
) -> Result<Json<Upvoted>, HttpError> {
    Ok(Json(srv.toggle_upvote(req.comment_id, req.user_id).await?))
}

async fn delete_comment(
    State(srv): Srv,
    Json(req): Json<DeleteComment>,
) -> Result<Json<Deleted>, HttpError> {
    Ok(Json(srv.delete_comment(req.comment_id, req.user_id).await?))
}

async fn get_user(State(srv): Srv, Json(req): Json<FetchUser>) -> Result<Json<User>, HttpError> {
    Ok(Json(srv.fetch_user(req.id).await?))
}

/// Exposes `srv` over the endpoints `HttpService` talks to
pub fn router(srv: Arc<MockServer>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/get-post-comments", post(get_post_comments))
        .route("/get-comment-reply", post(get_comment_reply))
        .route("/create-comment", post(create_comment))
        .route("/upvote-comment", post(upvote_comment))
        .route("/delete-comment", post(delete_comment))
        .route("/get-user", post(get_user))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(srv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http};
    use threadweave_client::api::{PostId, Role};
    use tower::ServiceExt;

    async fn call(app: Router, uri: &str, body: serde_json::Value) -> (http::StatusCode, Vec<u8>) {
        let req = http::Request::builder()
            .method("POST")
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let resp = app.oneshot(req).await.expect("running request");
        let status = resp.status();
        let body = hyper::body::to_bytes(resp.into_body())
            .await
            .expect("recovering resp bytes");
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn creates_then_lists() {
        let srv = Arc::new(MockServer::new());
        let user = srv.test_add_user("alice", Role::User);
        let post = srv.test_add_post();
        let app = router(srv.clone());

        let (status, body) = call(
            app.clone(),
            "/create-comment",
            serde_json::json!({
                "post_id": post,
                "parent_comment_id": null,
                "user_id": user.id,
                "text": "hello",
            }),
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        let created: api::Comment = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.text, "hello");
        assert_eq!(created.author.as_ref().map(|u| u.id), Some(user.id));

        let (status, body) = call(
            app,
            "/get-post-comments",
            serde_json::json!({ "post_id": post, "sort_by": "created_at" }),
        )
        .await;
        assert_eq!(status, http::StatusCode::OK);
        let listed: Vec<api::Comment> = serde_json::from_slice(&body).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn rejections_carry_the_wire_error() {
        let srv = Arc::new(MockServer::new());
        let app = router(srv);
        let post = PostId::stub();
        let (status, body) = call(
            app,
            "/get-post-comments",
            serde_json::json!({ "post_id": post, "sort_by": null }),
        )
        .await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);
        assert_eq!(api::Error::parse(&body).unwrap(), api::Error::UnknownPost(post));
    }

    #[tokio::test]
    async fn offline_is_an_internal_error() {
        let srv = Arc::new(MockServer::new());
        let post = srv.test_add_post();
        srv.test_set_offline(true);
        let (status, body) = call(
            router(srv),
            "/get-post-comments",
            serde_json::json!({ "post_id": post, "sort_by": null }),
        )
        .await;
        assert_eq!(status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(api::Error::parse(&body), Ok(api::Error::Unknown(_))));
    }
}
