pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<chrono::Utc>;

mod comment;
pub use comment::{Comment, CommentId, CommentNode, NewComment};

mod error;
pub use error::Error;

mod sanitize;
pub use sanitize::escape_html;

mod store;
pub use store::{SortOrder, Store};

mod submission;
pub use submission::{
    SubmitOutcome, Submission, CONTENT_MAX_LEN, EMAIL_MAX_LEN, NAME_MAX_LEN,
};

mod tree;
pub use tree::{build_tree, Page};
