pub mod api;
pub mod auth;
pub mod filter;


pub use api::{RedditListing, RedditListingChild, RedditListingData, RedditPostData};
pub use auth::{RedditAuthResponse, RedditToken};
pub use filter::{absolute_permalink, filter_matches, DayWindow, KeywordMatcher};

use digest_core::{AppConfig, ConfigError, CoreError, RedditCredentials, RedditEndpoints};
use reqwest::Client;
use url::Url;

/// Timeout for the token exchange.
pub const AUTH_TIMEOUT_SECS: u64 = 10;
/// Timeout for the listing call.
pub const LISTING_TIMEOUT_SECS: u64 = 15;

/// Reddit access for a single run: one token exchange, one listing fetch.
#[derive(Debug)]
pub struct RedditClient {
    http_client: Client,
    credentials: RedditCredentials,
    endpoints: RedditEndpoints,
    user_agent: String,
    board: String,
    keywords: KeywordMatcher,
    fetch_limit: u32,
}

impl RedditClient {
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        let user_agent = config.user_agent();
        let http_client = Client::builder().user_agent(&user_agent).build()?;

        Ok(Self {
            http_client,
            credentials: config.reddit.clone(),
            endpoints: config.endpoints.clone(),
            user_agent,
            board: config.board.clone(),
            keywords: KeywordMatcher::new(config.keywords.as_slice()),
            fetch_limit: config.fetch_limit,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn board(&self) -> &str {
        &self.board
    }
}

fn endpoint_url(base: &Url, path: &str) -> Result<Url, CoreError> {
    base.join(path).map_err(|_| {
        ConfigError::InvalidValue {
            field: "endpoint".to_string(),
            value: format!("{}{}", base, path),
        }
        .into()
    })
}

fn transport_error(error: reqwest::Error, timeout_secs: u64) -> CoreError {
    if error.is_timeout() {
        CoreError::Timeout {
            seconds: timeout_secs,
        }
    } else {
        CoreError::Network(error)
    }
}
