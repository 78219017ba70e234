use crate::error::*;
use std::fmt;
use tracing::{error, info};

/// Coarse classification of a failure, used for the final report of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Authentication,
    Decode,
    Delivery,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Network => "network",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Decode => "decode",
            ErrorCategory::Delivery => "delivery",
        };
        f.write_str(name)
    }
}

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn category(&self) -> ErrorCategory;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Mail(e) => {
                error!("Mail error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn category(&self) -> ErrorCategory {
        match self {
            CoreError::RedditApi(e) => e.category(),
            CoreError::Mail(e) => e.category(),
            CoreError::Config(e) => e.category(),
            CoreError::Network(e) if e.is_decode() => ErrorCategory::Decode,
            CoreError::Network(_) | CoreError::Timeout { .. } => ErrorCategory::Network,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Mail(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::Timeout { seconds } => {
                format!("The request did not complete within {} seconds.", seconds)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.error_code(),
            CoreError::Mail(e) => e.error_code(),
            CoreError::Config(e) => e.error_code(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::Timeout { .. } => "TIMEOUT".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn category(&self) -> ErrorCategory {
        match self {
            RedditApiError::AuthenticationFailed { .. } | RedditApiError::InvalidToken => {
                ErrorCategory::Authentication
            }
            RedditApiError::InvalidResponse { .. } => ErrorCategory::Decode,
            _ => ErrorCategory::Network,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit authentication failed. Please check your credentials.".to_string()
            }
            RedditApiError::InvalidToken => {
                "Reddit rejected the access token for this run.".to_string()
            }
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. The account may not be allowed to read it.",
                resource
            ),
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("Subreddit '{}' not found or is private.", subreddit)
            }
            RedditApiError::InvalidResponse { .. } => {
                "Reddit returned a response that could not be read.".to_string()
            }
            RedditApiError::UnexpectedStatus { status } => {
                format!("Reddit answered with status {}.", status)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND".to_string(),
            RedditApiError::UnexpectedStatus { .. } => "REDDIT_UNEXPECTED_STATUS".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for MailError {
    fn log_error(&self) -> &Self {
        error!("MailError: {}", self);
        self
    }

    fn category(&self) -> ErrorCategory {
        match self {
            MailError::InvalidAddress { .. } => ErrorCategory::Configuration,
            MailError::ConnectionFailed { .. } => ErrorCategory::Network,
            MailError::AuthenticationRejected { .. } => ErrorCategory::Authentication,
            MailError::Build { .. } | MailError::DeliveryFailed { .. } => ErrorCategory::Delivery,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            MailError::InvalidAddress { field, address } => {
                format!("'{}' is not a valid address for {}.", address, field)
            }
            MailError::Build { .. } => "The digest email could not be assembled.".to_string(),
            MailError::ConnectionFailed { .. } => {
                "Could not reach the SMTP server. Check SMTP_HOST and SMTP_PORT.".to_string()
            }
            MailError::AuthenticationRejected { .. } => {
                "The SMTP server rejected the login. Check EMAIL_USER and EMAIL_PASS.".to_string()
            }
            MailError::DeliveryFailed { .. } => {
                "The SMTP server refused the digest email.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            MailError::InvalidAddress { .. } => "MAIL_INVALID_ADDRESS".to_string(),
            MailError::Build { .. } => "MAIL_BUILD_FAILED".to_string(),
            MailError::ConnectionFailed { .. } => "MAIL_CONNECTION_FAILED".to_string(),
            MailError::AuthenticationRejected { .. } => "MAIL_AUTH_REJECTED".to_string(),
            MailError::DeliveryFailed { .. } => "MAIL_DELIVERY_FAILED".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::MissingEnvironmentVariable { var_name } => {
                format!("Please set {} in the environment or the .env file.", var_name)
            }
            ConfigError::InvalidValue { field, value } => {
                format!("'{}' is not a valid value for {}.", value, field)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_VARIABLE".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {} ({})", error.error_code(), error.category());
            info!("User message: {}", error.user_friendly_message());
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
