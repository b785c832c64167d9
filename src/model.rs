//! Data models for the idea board
//!
//! This module defines the persisted record structures, the request payloads
//! with their field validation, and the listing query parameters.

use chrono::{DateTime, Utc};
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Represents an idea record stored in the database
///
/// The `votes_count` and `comments_count` fields are denormalized counters.
/// They are only ever mutated inside the ledger's write transactions so they
/// stay equal to the number of vote/comment records referencing this idea.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Idea {
    /// Generated opaque identifier
    pub id: String,

    /// Idea title (3-120 characters)
    pub title: String,

    /// What to build (10-1000 characters)
    pub description: String,

    /// Optional reference link
    pub link: Option<String>,

    /// Number of votes cast for this idea
    #[serde(default)]
    pub votes_count: u64,

    /// Number of comments attached to this idea
    #[serde(default)]
    pub comments_count: u64,

    /// Timestamp when this idea was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last counter update
    pub updated_at: DateTime<Utc>,
}

/// Represents a comment record stored in the database
///
/// Immutable after creation. `post_id` is a weak reference to an idea,
/// validated at write time only.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Comment {
    /// Generated opaque identifier
    pub id: String,

    /// Id of the idea this comment belongs to
    pub post_id: String,

    /// Display name (1-60 characters)
    pub author: String,

    /// Comment body (1-500 characters)
    pub text: String,

    /// Timestamp when this comment was created
    pub created_at: DateTime<Utc>,

    /// Same as created_at; comments are never edited
    pub updated_at: DateTime<Utc>,
}

/// Represents a vote record stored in the database
///
/// At most one exists per IP address system-wide. Never updated or deleted:
/// the first idea an IP votes for stays bound to that IP.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Vote {
    /// Id of the idea this vote was cast for
    pub post_id: String,

    /// Voter IP address, also the table key
    pub ip: String,

    /// Timestamp when this vote was cast
    pub created_at: DateTime<Utc>,
}

/// Request payload for submitting a new idea
///
/// # Example
/// ```json
/// {
///   "title": "CLI to full SaaS",
///   "description": "Paste a CLI tool and generate a hosted service.",
///   "link": "https://example.com"  // Optional
/// }
/// ```
#[derive(Deserialize)]
pub struct CreateIdea {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
}

impl CreateIdea {
    /// Checks the field constraints, returning a validation error naming the
    /// first offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        let title_len = self.title.chars().count();
        if !(3..=120).contains(&title_len) {
            return Err(AppError::Validation(
                "title must be 3-120 characters".to_string(),
            ));
        }
        let desc_len = self.description.chars().count();
        if !(10..=1000).contains(&desc_len) {
            return Err(AppError::Validation(
                "description must be 10-1000 characters".to_string(),
            ));
        }
        if let Some(link) = &self.link {
            if !link.starts_with("http://") && !link.starts_with("https://") {
                return Err(AppError::Validation(
                    "link must be an http(s) URL".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Builds the stored record: zero counters, fresh timestamps, generated id.
    pub fn into_idea(self) -> Idea {
        let now = Utc::now();
        Idea {
            id: new_id(),
            title: self.title,
            description: self.description,
            link: self.link,
            votes_count: 0,
            comments_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request payload for submitting a comment
#[derive(Deserialize)]
pub struct CreateComment {
    /// Id of the idea being commented on
    pub post_id: String,

    pub author: String,
    pub text: String,
}

impl CreateComment {
    pub fn validate(&self) -> Result<(), AppError> {
        let author_len = self.author.chars().count();
        if !(1..=60).contains(&author_len) {
            return Err(AppError::Validation(
                "author must be 1-60 characters".to_string(),
            ));
        }
        let text_len = self.text.chars().count();
        if !(1..=500).contains(&text_len) {
            return Err(AppError::Validation(
                "text must be 1-500 characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Query parameters for listing ideas
///
/// # Example
/// Query string: `?timeframe=month&sort=comments&limit=20`
#[derive(Deserialize)]
pub struct ListParams {
    /// Recency window: "week", "month" or "all" (default "week")
    pub timeframe: Option<String>,

    /// Sort order: "votes", "comments" or "recent" (default "votes")
    pub sort: Option<String>,

    /// Maximum number of items returned (default 50)
    pub limit: Option<usize>,
}

/// Generates a random 12-character alphanumeric record id
pub fn new_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}
