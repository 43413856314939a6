use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

use crate::{CommentId, PostId, UserId};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Comment text is empty")]
    EmptyText,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Unknown post {0}")]
    UnknownPost(PostId),

    #[error("Unknown comment {0}")]
    UnknownComment(CommentId),

    #[error("Unknown user {0}")]
    UnknownUser(UserId),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::EmptyText => StatusCode::BAD_REQUEST,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::UnknownPost(_) => StatusCode::NOT_FOUND,
            Error::UnknownComment(_) => StatusCode::NOT_FOUND,
            Error::UnknownUser(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::EmptyText => json!({
                "message": "comment text is empty",
                "type": "empty-text",
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::UnknownPost(p) => json!({
                "message": "unknown post",
                "type": "unknown-post",
                "uuid": p.0,
            }),
            Error::UnknownComment(c) => json!({
                "message": "unknown comment",
                "type": "unknown-comment",
                "uuid": c.0,
            }),
            Error::UnknownUser(u) => json!({
                "message": "unknown user",
                "type": "unknown-user",
                "uuid": u.0,
            }),
        })
        .expect("serializing error")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let uuid = || {
            data.get("uuid")
                .and_then(|uuid| uuid.as_str())
                .and_then(|uuid| Uuid::from_str(uuid).ok())
                .ok_or_else(|| anyhow!("error is about an unknown record without a proper uuid"))
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "permission-denied" => Error::PermissionDenied,
                "empty-text" => Error::EmptyText,
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                "unknown-post" => Error::UnknownPost(PostId(uuid()?)),
                "unknown-comment" => Error::UnknownComment(CommentId(uuid()?)),
                "unknown-user" => Error::UnknownUser(UserId(uuid()?)),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
