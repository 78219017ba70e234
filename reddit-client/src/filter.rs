use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use digest_core::{MatchSet, MatchedPost, RedditPost};
use std::fmt;
use url::Url;

const LAST_SECOND_OF_DAY: i64 = 86_399;

/// One UTC calendar day as an inclusive range of epoch seconds,
/// 00:00:00 through 23:59:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    start: i64,
    end: i64,
}

impl DayWindow {
    pub fn for_day(date: NaiveDate) -> Self {
        let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).timestamp();
        Self {
            start,
            end: start + LAST_SECOND_OF_DAY,
        }
    }

    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self::for_day(instant.date_naive())
    }

    pub fn today() -> Self {
        Self::containing(Utc::now())
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Case-insensitive substring match against a fixed keyword list.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Stops at the first keyword found in the title.
    pub fn matches(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.keywords.iter().any(|k| title.contains(k.as_str()))
    }
}

/// Prefixes a site-relative permalink with the site base, never doubling
/// the slash between them.
pub fn absolute_permalink(site_base: &Url, permalink: &str) -> String {
    let base = site_base.as_str().trim_end_matches('/');
    if permalink.starts_with('/') {
        format!("{}{}", base, permalink)
    } else {
        format!("{}/{}", base, permalink)
    }
}

/// Keeps posts inside `window` whose title matches, preserving input order.
/// Each post appears at most once however many keywords it contains.
pub fn filter_matches<I>(
    posts: I,
    window: &DayWindow,
    keywords: &KeywordMatcher,
    site_base: &Url,
) -> MatchSet
where
    I: IntoIterator<Item = RedditPost>,
{
    posts
        .into_iter()
        .filter(|post| window.contains(post.created_utc))
        .filter(|post| keywords.matches(&post.title))
        .filter_map(|post| {
            let created = Utc.timestamp_opt(post.created_utc, 0).single()?;
            Some(MatchedPost {
                permalink: absolute_permalink(site_base, &post.permalink),
                title: post.title,
                created,
            })
        })
        .collect()
}
