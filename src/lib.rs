//! One authenticate, fetch, filter and notify cycle over a Reddit board.

use digest_core::{AppConfig, CoreError};
use mail_notifier::{send_digest, Mailer};
use reddit_client::RedditClient;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing matched today; no email was sent.
    NoMatches,
    /// A digest with this many posts was accepted by the mail server.
    Delivered { matches: usize },
}

/// Runs the pipeline once. The first failing stage ends the run; the mailer
/// is only touched when at least one post matched.
pub async fn run<M>(
    config: &AppConfig,
    client: &RedditClient,
    mailer: &M,
) -> Result<RunOutcome, CoreError>
where
    M: Mailer + ?Sized,
{
    let token = client.get_access_token().await?;
    info!("Got Reddit access token");

    let matches = client.fetch_today_matches(&token).await?;
    if matches.is_empty() {
        info!("No matching posts found today");
        return Ok(RunOutcome::NoMatches);
    }
    info!(
        "Found {} matching posts in r/{}",
        matches.len(),
        config.board
    );

    send_digest(mailer, config, &matches).await?;
    info!("Email sent successfully");

    Ok(RunOutcome::Delivered {
        matches: matches.len(),
    })
}
