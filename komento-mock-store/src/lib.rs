use std::{
    collections::HashMap,
    sync::Mutex,
};

use async_trait::async_trait;
use komento_api::{Comment, CommentId, NewComment, SortOrder, Store, Uuid};

/// In-memory stand-in for the real document store, with the same observable
/// semantics: ids assigned on insert, fetches ordered by creation time.
pub struct MemStore(Mutex<Inner>);

#[derive(Default)]
struct Inner {
    comments: Vec<Comment>,
    counters: HashMap<String, i64>,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore(Mutex::new(Inner::default()))
    }

    /// Number of stored comments; lets tests assert that the honeypot and
    /// failed validations never wrote anything.
    pub fn test_comment_count(&self) -> usize {
        self.0.lock().expect("mock store lock poisoned").comments.len()
    }

    /// Insertion-ordered copy of everything stored, ip fields included.
    pub fn test_comments(&self) -> Vec<Comment> {
        self.0.lock().expect("mock store lock poisoned").comments.clone()
    }
}

impl Default for MemStore {
    fn default() -> MemStore {
        MemStore::new()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn fetch_comments(&self, order: SortOrder) -> anyhow::Result<Vec<Comment>> {
        let mut comments = self.0.lock().expect("mock store lock poisoned").comments.clone();
        // stable sort: equal timestamps keep insertion order
        match order {
            SortOrder::OldestFirst => comments.sort_by_key(|c| c.created_at),
            SortOrder::NewestFirst => {
                comments.sort_by_key(|c| c.created_at);
                comments.reverse();
            }
        }
        Ok(comments)
    }

    async fn insert_comment(&self, comment: NewComment) -> anyhow::Result<CommentId> {
        let id = CommentId(Uuid::new_v4());
        self.0
            .lock()
            .expect("mock store lock poisoned")
            .comments
            .push(comment.into_comment(id));
        Ok(id)
    }

    async fn increment_counter(&self, name: &str) -> anyhow::Result<i64> {
        let mut inner = self.0.lock().expect("mock store lock poisoned");
        let count = inner.counters.entry(String::from(name)).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}
