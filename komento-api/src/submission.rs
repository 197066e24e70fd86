use std::net::IpAddr;

use crate::{escape_html, CommentId, Error, NewComment, Time};

pub const NAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 50;
pub const CONTENT_MAX_LEN: usize = 500;

/// A comment submission as it comes off the wire.
///
/// Every field defaults when absent so that a sparse body reaches
/// `validate` instead of failing to deserialize; the original board form
/// always sends all of them.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<CommentId>,

    /// Honeypot. The real form hides it; only bots fill it.
    #[serde(default)]
    pub website: Option<String>,
}

impl Submission {
    pub fn is_honeypot(&self) -> bool {
        self.website.as_deref().map_or(false, |w| !w.is_empty())
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() || self.email.is_empty() || self.content.is_empty() {
            return Err(Error::MissingFields);
        }
        if self.name.chars().count() > NAME_MAX_LEN
            || self.email.chars().count() > EMAIL_MAX_LEN
            || self.content.chars().count() > CONTENT_MAX_LEN
        {
            return Err(Error::FieldTooLong);
        }
        Ok(())
    }

    /// Escapes the text fields and stamps the server-side metadata.
    ///
    /// The parent reference is passed through unchecked; resolution happens
    /// at read time, when the tree is assembled.
    pub fn into_record(self, ip: IpAddr, now: Time) -> NewComment {
        NewComment {
            parent_id: self.parent_id,
            name: escape_html(&self.name),
            email: escape_html(&self.email),
            content: escape_html(&self.content),
            created_at: now,
            ip,
        }
    }
}

/// Write-side response: the real outcome, or the honeypot's fake success.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SubmitOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmitOutcome {
    pub fn saved() -> SubmitOutcome {
        SubmitOutcome {
            success: true,
            message: Some(String::from("Comment saved")),
        }
    }

    pub fn honeypot() -> SubmitOutcome {
        SubmitOutcome {
            success: true,
            message: None,
        }
    }
}
