use std::fmt;

use uuid::Uuid;

use crate::{Comment, Time, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn stub() -> UserId {
        UserId(STUB_UUID)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Id given to the user by the external identity provider
#[derive(
    Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ExternalUserId(pub String);

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Role {
    #[default]
    #[serde(rename = "user")]
    User,

    #[serde(rename = "admin")]
    Moderator,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub id: UserId,

    #[serde(default, rename = "clerk_user_id")]
    pub external_id: ExternalUserId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    #[serde(default)]
    pub role: Role,

    #[serde(default)]
    pub is_deleted: bool,

    pub created_at: Time,
}

impl User {
    pub const PLACEHOLDER_NAME: &'static str = "Loading…";

    /// Stand-in shown until the real record for `id` is known. Always the
    /// same value for the same id.
    pub fn placeholder(id: UserId) -> User {
        User {
            id,
            external_id: ExternalUserId::default(),
            name: String::from(User::PLACEHOLDER_NAME),
            avatar_url: None,
            role: Role::User,
            is_deleted: false,
            created_at: Time::from(std::time::UNIX_EPOCH),
        }
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    pub fn can_delete(&self, c: &Comment) -> bool {
        c.author_id == self.id || self.is_moderator()
    }
}
