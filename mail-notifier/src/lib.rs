pub mod digest;
pub mod mailer;

pub use digest::{compose_body, compose_subject, format_timestamp, Digest, TIMESTAMP_FORMAT};
pub use mailer::{build_message, classify_smtp_failure, Mailer, SmtpMailer};

use digest_core::{AppConfig, CoreError, MatchedPost};
use tracing::info;

/// Formats the matches and hands the digest to `mailer`.
pub async fn send_digest<M>(
    mailer: &M,
    config: &AppConfig,
    matches: &[MatchedPost],
) -> Result<Digest, CoreError>
where
    M: Mailer + ?Sized,
{
    let digest = Digest::compose(&config.board, &config.keywords, matches);

    info!("Sending email notification...");
    mailer.send_digest(&digest).await?;
    Ok(digest)
}
