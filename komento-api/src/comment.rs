use std::net::IpAddr;

use uuid::Uuid;

use crate::Time;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentId(pub Uuid);

/// A comment as the store keeps it.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub parent_id: Option<CommentId>,
    pub name: String,
    pub email: String,
    pub content: String,
    pub created_at: Time,

    /// Kept for rate limiting and audit, never serialized into a read
    /// response.
    #[serde(default, skip_serializing)]
    pub ip: Option<IpAddr>,
}

/// What the ingestion pipeline hands to the store. The store assigns the id.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewComment {
    pub parent_id: Option<CommentId>,
    pub name: String,
    pub email: String,
    pub content: String,
    pub created_at: Time,
    pub ip: IpAddr,
}

impl NewComment {
    pub fn into_comment(self, id: CommentId) -> Comment {
        Comment {
            id,
            parent_id: self.parent_id,
            name: self.name,
            email: self.email,
            content: self.content,
            created_at: self.created_at,
            ip: Some(self.ip),
        }
    }
}

/// A comment with its replies attached. Built fresh on every read, never
/// persisted.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub children: Vec<CommentNode>,
}
