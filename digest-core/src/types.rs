use chrono::{DateTime, Utc};
use serde::Serialize;

/// A post as returned by the board listing, before any filtering.
#[derive(Debug, Clone)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    /// Path relative to the site root, e.g. `/r/Board/comments/x1/title/`.
    pub permalink: String,
    pub url: String,
    pub created_utc: i64,
}

/// A post that passed the day-window and keyword filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedPost {
    pub title: String,
    pub permalink: String,
    pub created: DateTime<Utc>,
}

/// Matches in the order the listing returned them.
pub type MatchSet = Vec<MatchedPost>;
