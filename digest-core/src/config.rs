use crate::error::{ConfigError, CoreError};
use std::fmt;
use tracing::debug;
use url::Url;

pub const DEFAULT_BOARD: &str = "HyderabadBuySell";
pub const DEFAULT_KEYWORDS: [&str; 2] = ["table", "chair"];
pub const DEFAULT_FETCH_LIMIT: u32 = 100;

const REDDIT_AUTH_BASE: &str = "https://www.reddit.com";
const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
const REDDIT_SITE_BASE: &str = "https://reddit.com";

/// Required variables, in the order they are checked.
pub const REQUIRED_VARIABLES: [&str; 10] = [
    "REDDIT_CLIENT_ID",
    "REDDIT_CLIENT_SECRET",
    "REDDIT_USERNAME",
    "REDDIT_PASSWORD",
    "SMTP_HOST",
    "SMTP_PORT",
    "EMAIL_FROM",
    "EMAIL_TO",
    "EMAIL_USER",
    "EMAIL_PASS",
];

#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
    /// Skips certificate and hostname verification on the TLS session.
    pub accept_invalid_certs: bool,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RedditEndpoints {
    /// Host serving `/api/v1/access_token`.
    pub auth_base_url: Url,
    /// Host serving authenticated listing calls.
    pub api_base_url: Url,
    /// Prefix used to turn relative permalinks into absolute links.
    pub site_base_url: Url,
}

impl RedditEndpoints {
    pub fn new(auth_base: &str, api_base: &str, site_base: &str) -> Result<Self, ConfigError> {
        let parse = |field: &str, raw: &str| {
            Url::parse(raw).map_err(|_| ConfigError::InvalidValue {
                field: field.to_string(),
                value: raw.to_string(),
            })
        };

        Ok(Self {
            auth_base_url: parse("auth_base_url", auth_base)?,
            api_base_url: parse("api_base_url", api_base)?,
            site_base_url: parse("site_base_url", site_base)?,
        })
    }

    pub fn reddit() -> Result<Self, ConfigError> {
        Self::new(REDDIT_AUTH_BASE, REDDIT_API_BASE, REDDIT_SITE_BASE)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub board: String,
    /// Lower-cased, non-empty keywords in configured order.
    pub keywords: Vec<String>,
    pub fetch_limit: u32,
    pub reddit: RedditCredentials,
    pub smtp: SmtpSettings,
    pub endpoints: RedditEndpoints,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Empty or whitespace-only values count as missing. Nothing is read
    /// from the network here; a returned config is complete.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        for var_name in REQUIRED_VARIABLES {
            if get(var_name).is_none() {
                return Err(ConfigError::MissingEnvironmentVariable {
                    var_name: var_name.to_string(),
                }
                .into());
            }
        }
        let require = |key: &str| get(key).unwrap_or_default();

        let port_raw = require("SMTP_PORT");
        let port = port_raw
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue {
                field: "SMTP_PORT".to_string(),
                value: port_raw.clone(),
            })?;

        let board = get("DIGEST_BOARD").unwrap_or_else(|| DEFAULT_BOARD.to_string());
        let keywords = match get("DIGEST_KEYWORDS") {
            Some(raw) => parse_keywords(&raw)?,
            None => DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        };

        let accept_invalid_certs = match get("SMTP_ACCEPT_INVALID_CERTS") {
            Some(raw) => parse_flag("SMTP_ACCEPT_INVALID_CERTS", &raw)?,
            None => false,
        };

        let config = Self {
            board,
            keywords,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            reddit: RedditCredentials {
                client_id: require("REDDIT_CLIENT_ID"),
                client_secret: require("REDDIT_CLIENT_SECRET"),
                username: require("REDDIT_USERNAME"),
                password: require("REDDIT_PASSWORD"),
            },
            smtp: SmtpSettings {
                host: require("SMTP_HOST"),
                port,
                username: require("EMAIL_USER"),
                password: require("EMAIL_PASS"),
                from: require("EMAIL_FROM"),
                to: require("EMAIL_TO"),
                accept_invalid_certs,
            },
            endpoints: RedditEndpoints::reddit()?,
        };

        debug!(
            "Loaded configuration for r/{} with keywords {:?}",
            config.board, config.keywords
        );
        Ok(config)
    }

    /// User-Agent sent on every Reddit call; the API rejects generic agents.
    pub fn user_agent(&self) -> String {
        format!(
            "rust:{}Monitor:v{} (by /u/{})",
            self.board,
            env!("CARGO_PKG_VERSION"),
            self.reddit.username
        )
    }
}

fn parse_keywords(raw: &str) -> Result<Vec<String>, ConfigError> {
    let keywords: Vec<String> = raw
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    if keywords.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "DIGEST_KEYWORDS".to_string(),
            value: raw.to_string(),
        });
    }
    Ok(keywords)
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        REQUIRED_VARIABLES
            .iter()
            .map(|key| {
                let value = match *key {
                    "SMTP_PORT" => "465".to_string(),
                    "EMAIL_FROM" => "bot@example.com".to_string(),
                    "EMAIL_TO" => "me@example.com".to_string(),
                    other => format!("{}-value", other.to_lowercase()),
                };
                (*key, value)
            })
            .collect()
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<AppConfig, CoreError> {
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.board, "HyderabadBuySell");
        assert_eq!(config.keywords, vec!["table", "chair"]);
        assert_eq!(config.fetch_limit, 100);
        assert_eq!(config.smtp.port, 465);
        assert!(!config.smtp.accept_invalid_certs);
        assert_eq!(config.endpoints.api_base_url.as_str(), "https://oauth.reddit.com/");
    }

    #[test]
    fn test_missing_variable_reported() {
        let mut env = full_env();
        env.remove("EMAIL_PASS");

        match load(&env) {
            Err(CoreError::Config(ConfigError::MissingEnvironmentVariable { var_name })) => {
                assert_eq!(var_name, "EMAIL_PASS");
            }
            other => panic!("Expected missing variable error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_variable_counts_as_missing() {
        let mut env = full_env();
        env.insert("REDDIT_PASSWORD", "   ".to_string());

        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("REDDIT_PASSWORD"));
    }

    #[test]
    fn test_first_missing_variable_wins() {
        let mut env = full_env();
        env.remove("SMTP_HOST");
        env.remove("REDDIT_CLIENT_ID");

        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("REDDIT_CLIENT_ID"));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut env = full_env();
        env.insert("SMTP_PORT", "smtps".to_string());

        assert!(matches!(
            load(&env),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_keyword_override_is_lowercased() {
        let mut env = full_env();
        env.insert("DIGEST_KEYWORDS", " Sofa, ,BED ".to_string());
        env.insert("DIGEST_BOARD", "BangaloreBuySell".to_string());

        let config = load(&env).unwrap();
        assert_eq!(config.keywords, vec!["sofa", "bed"]);
        assert_eq!(config.board, "BangaloreBuySell");
    }

    #[test]
    fn test_empty_keyword_override_rejected() {
        let mut env = full_env();
        env.insert("DIGEST_KEYWORDS", " , ,".to_string());

        assert!(load(&env).is_err());
    }

    #[test]
    fn test_accept_invalid_certs_flag() {
        let mut env = full_env();
        env.insert("SMTP_ACCEPT_INVALID_CERTS", "TRUE".to_string());
        assert!(load(&env).unwrap().smtp.accept_invalid_certs);

        env.insert("SMTP_ACCEPT_INVALID_CERTS", "maybe".to_string());
        assert!(load(&env).is_err());
    }

    #[test]
    fn test_endpoints_reject_garbage() {
        assert!(RedditEndpoints::new("not a url", REDDIT_API_BASE, REDDIT_SITE_BASE).is_err());
    }

    #[test]
    fn test_user_agent_names_account() {
        let config = load(&full_env()).unwrap();
        let agent = config.user_agent();
        assert!(agent.starts_with("rust:HyderabadBuySellMonitor:v"));
        assert!(agent.ends_with("(by /u/reddit_username-value)"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&full_env()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("email_pass-value"));
        assert!(!rendered.contains("reddit_password-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
