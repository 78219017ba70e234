use chrono::{DateTime, Utc};
use digest_core::MatchedPost;
use std::fmt::Write;

/// Day, date, time and zone, e.g. `Fri, 15 Mar 2024 09:30:00 UTC`.
pub const TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %Z";

/// The single email summarising one run's matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub body: String,
}

impl Digest {
    pub fn compose(board: &str, keywords: &[String], matches: &[MatchedPost]) -> Self {
        Self {
            subject: compose_subject(board, keywords),
            body: compose_body(board, keywords, matches),
        }
    }
}

pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

pub fn compose_subject(board: &str, keywords: &[String]) -> String {
    let topics: Vec<String> = keywords.iter().map(|k| capitalize(k)).collect();
    format!("{} Alert: {} Posts Today", board, topics.join("/"))
}

pub fn compose_body(board: &str, keywords: &[String], matches: &[MatchedPost]) -> String {
    let mut body = format!(
        "Posts for today with keywords ({}) from r/{}:\n\n",
        keywords.join(", "),
        board
    );

    for post in matches {
        // Writing into a String cannot fail.
        let _ = write!(
            body,
            "- {}\n  {}\n  Posted at (UTC): {}\n\n",
            post.title,
            post.permalink,
            format_timestamp(&post.created)
        );
    }
    body
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
