use async_trait::async_trait;

use crate::{Comment, CommentId, NewComment};

/// Which way `fetch_comments` orders by creation time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortOrder {
    NewestFirst,
    OldestFirst,
}

/// The document collection the board lives in.
///
/// One insert per accepted submission, one full fetch per read. The counter
/// bump is an atomic increment-and-read in a single store round-trip.
#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch_comments(&self, order: SortOrder) -> anyhow::Result<Vec<Comment>>;
    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<CommentId>;
    async fn increment_counter(&self, name: &str) -> anyhow::Result<i64>;
}
