pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<chrono::Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod comment;
pub use comment::{Comment, CommentId};

mod error;
pub use error::Error;

mod post;
pub use post::PostId;

mod request;
pub use request::{
    DeleteComment, Deleted, FetchComments, FetchReplies, FetchUser, NewComment, UpvoteComment,
    Upvoted,
};

mod sort;
pub use sort::SortOrder;

mod user;
pub use user::{ExternalUserId, Role, User, UserId};

pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}
