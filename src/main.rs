use board_digest::{run, RunOutcome};
use digest_core::{AppConfig, CoreError, ErrorExt, ErrorReporter};
use mail_notifier::SmtpMailer;
use reddit_client::RedditClient;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "board_digest=info,reddit_client=info,mail_notifier=info,digest_core=info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Loaded first so RUST_LOG may come from the file too.
    let env_file = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    match env_file {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) => tracing::debug!("No .env file loaded: {}", e),
    }

    tracing::info!("Starting board digest run");

    match try_main().await {
        Ok(RunOutcome::NoMatches) => ExitCode::SUCCESS,
        Ok(RunOutcome::Delivered { matches }) => {
            tracing::info!("Digest with {} posts delivered", matches);
            ExitCode::SUCCESS
        }
        Err(e) => {
            ErrorReporter::new().report_error(&e);
            tracing::error!("Run aborted ({}): {}", e.category(), e);
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> Result<RunOutcome, CoreError> {
    // Everything that can be validated offline is, before the first request.
    let config = AppConfig::from_env()?;
    let client = RedditClient::new(&config)?;
    let mailer = SmtpMailer::new(&config.smtp)?;

    run(&config, &client, &mailer).await
}
