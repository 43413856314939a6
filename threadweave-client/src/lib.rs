mod comment;
pub use comment::{Comment, DELETED_MESSAGE};

mod error;
pub use error::Error;

mod http;
pub use http::HttpService;

mod service;
pub use service::CommentService;

mod store;
pub use store::ThreadStore;

pub mod tree;

mod users;
pub use users::UserDirectory;

mod view;
pub use view::{Busy, Expansion, Row, ThreadView, DEFAULT_MAX_DEPTH};

pub mod api {
    pub use threadweave_api::*;
}
