use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// -- Content --

/// Metadata for one stored content record. Immutable after creation;
/// the payload bytes live in the blob store keyed by `{owner}/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentMeta {
    pub id: Uuid,
    pub owner: String,
    pub title: String,
    pub transcription: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for an upload. Id, owner and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewContent {
    pub title: String,
    pub transcription: String,
}

impl NewContent {
    pub fn new(title: impl Into<String>, transcription: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            transcription: transcription.into(),
        }
    }
}

// -- Identity --

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 32;

/// Usernames name per-user blob directories, so the accepted charset
/// must stay path-safe.
pub fn validate_username(name: &str) -> Result<()> {
    if name.len() < USERNAME_MIN || name.len() > USERNAME_MAX {
        return Err(Error::InvalidPayload("username must be 3-32 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(Error::InvalidPayload(
            "username may contain only a-z, 0-9, '-' and '_'",
        ));
    }
    Ok(())
}
