use crate::filter::{filter_matches, DayWindow};
use crate::{endpoint_url, transport_error, RedditClient, RedditToken, LISTING_TIMEOUT_SECS};
use chrono::{DateTime, Utc};
use digest_core::{CoreError, MatchSet, RedditApiError, RedditPost};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    #[serde(default)]
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    #[serde(default)]
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub permalink: String,
    #[serde(default)]
    pub url: String,
    pub created_utc: f64,
}

impl RedditClient {
    /// Fetches the newest posts of the configured board, a single page of
    /// at most `fetch_limit` entries in listing order.
    pub async fn fetch_new_posts(&self, token: &RedditToken) -> Result<Vec<RedditPost>, CoreError> {
        let endpoint = format!("/r/{}/new", self.board);
        let url = endpoint_url(&self.endpoints.api_base_url, &endpoint)?;
        let limit = self.fetch_limit.to_string();

        info!("Making Reddit API request: GET {}", endpoint);
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&token.access_token)
            .header("User-Agent", &self.user_agent)
            .query(&[("limit", limit.as_str())])
            .timeout(Duration::from_secs(LISTING_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                error!("Network error for GET {}: {}", endpoint, e);
                transport_error(e, LISTING_TIMEOUT_SECS)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Request failed with status: {} for {}", status, endpoint);
            return Err(match status {
                StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
                StatusCode::FORBIDDEN => RedditApiError::Forbidden { resource: endpoint },
                StatusCode::NOT_FOUND => RedditApiError::SubredditNotFound {
                    subreddit: self.board.clone(),
                },
                other => RedditApiError::UnexpectedStatus {
                    status: other.to_string(),
                },
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, LISTING_TIMEOUT_SECS))?;
        let listing: RedditListing<RedditPostData> = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}: {}", self.board, e),
            }
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            self.board
        );
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect())
    }

    /// Posts created during the current UTC day whose title contains one of
    /// the configured keywords.
    pub async fn fetch_today_matches(&self, token: &RedditToken) -> Result<MatchSet, CoreError> {
        self.fetch_matches_at(token, Utc::now()).await
    }

    /// Same as [`fetch_today_matches`](Self::fetch_today_matches) with an
    /// explicit notion of "now".
    pub async fn fetch_matches_at(
        &self,
        token: &RedditToken,
        now: DateTime<Utc>,
    ) -> Result<MatchSet, CoreError> {
        let posts = self.fetch_new_posts(token).await?;
        let window = DayWindow::containing(now);
        let matches = filter_matches(
            posts,
            &window,
            &self.keywords,
            &self.endpoints.site_base_url,
        );

        debug!(
            "{} of the fetched posts fall in {} and match {:?}",
            matches.len(),
            window,
            self.keywords
        );
        Ok(matches)
    }
}

impl From<RedditPostData> for RedditPost {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            title: post_data.title,
            permalink: post_data.permalink,
            url: post_data.url,
            created_utc: post_data.created_utc as i64,
        }
    }
}
