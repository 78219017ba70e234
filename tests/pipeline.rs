use async_trait::async_trait;
use board_digest::{run, RunOutcome};
use chrono::{TimeZone, Utc};
use digest_core::{
    AppConfig, ConfigError, CoreError, RedditApiError, RedditCredentials, RedditEndpoints,
    SmtpSettings,
};
use mail_notifier::{format_timestamp, Digest, Mailer};
use mockito::{Matcher, Mock, Server, ServerGuard};
use reddit_client::{DayWindow, RedditClient};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<Digest>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<Digest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_digest(&self, digest: &Digest) -> Result<(), CoreError> {
        self.sent.lock().unwrap().push(digest.clone());
        Ok(())
    }
}

fn config_for(server: &ServerGuard) -> AppConfig {
    AppConfig {
        board: "HyderabadBuySell".to_string(),
        keywords: vec!["table".to_string(), "chair".to_string()],
        fetch_limit: 100,
        reddit: RedditCredentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            username: "watcher".to_string(),
            password: "pass".to_string(),
        },
        smtp: SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 465,
            username: "mailer".to_string(),
            password: "mail-pass".to_string(),
            from: "bot@example.com".to_string(),
            to: "me@example.com".to_string(),
            accept_invalid_certs: false,
        },
        endpoints: RedditEndpoints::new(&server.url(), &server.url(), "https://reddit.com")
            .unwrap(),
    }
}

async fn mock_token(server: &mut ServerGuard, status: usize) -> Mock {
    server
        .mock("POST", "/api/v1/access_token")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"run-token","token_type":"bearer","expires_in":86400,"scope":"*"}"#)
        .create_async()
        .await
}

async fn mock_listing(server: &mut ServerGuard, posts: &[(&str, &str, i64)]) -> Mock {
    let children: Vec<_> = posts
        .iter()
        .map(|(id, title, created)| {
            json!({
                "kind": "t3",
                "data": {
                    "id": id,
                    "title": title,
                    "created_utc": *created as f64,
                    "permalink": format!("/r/HyderabadBuySell/comments/{}/post/", id),
                    "url": format!("https://i.redd.it/{}.jpg", id)
                }
            })
        })
        .collect();

    server
        .mock("GET", "/r/HyderabadBuySell/new")
        .match_query(Matcher::UrlEncoded("limit".to_string(), "100".to_string()))
        .match_header("authorization", "Bearer run-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "kind": "Listing", "data": { "children": children } }).to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_end_to_end_digest_contains_only_todays_keyword_match() {
    let mut server = Server::new_async().await;
    let window = DayWindow::today();
    let today = window.start() + 12 * 3600;
    let yesterday = window.start() - 3600;

    let token_mock = mock_token(&mut server, 200).await;
    let listing_mock = mock_listing(
        &mut server,
        &[
            ("a1", "Selling dining table", today),
            ("b2", "Looking for a couch", today),
            ("c3", "chair for sale", yesterday),
        ],
    )
    .await;

    let config = config_for(&server);
    let client = RedditClient::new(&config).unwrap();
    let mailer = RecordingMailer::default();

    let outcome = run(&config, &client, &mailer).await.unwrap();
    assert_eq!(outcome, RunOutcome::Delivered { matches: 1 });

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let body = &sent[0].body;
    let created = Utc.timestamp_opt(today, 0).unwrap();
    assert!(body.contains("Selling dining table"));
    assert!(body.contains("https://reddit.com/r/HyderabadBuySell/comments/a1/post/"));
    assert!(body.contains(&format_timestamp(&created)));
    assert!(!body.contains("Looking for a couch"));
    assert!(!body.contains("chair for sale"));
    assert_eq!(
        sent[0].subject,
        "HyderabadBuySell Alert: Table/Chair Posts Today"
    );

    token_mock.assert_async().await;
    listing_mock.assert_async().await;
}

#[tokio::test]
async fn test_no_matches_sends_nothing() {
    let mut server = Server::new_async().await;
    let window = DayWindow::today();

    let _token_mock = mock_token(&mut server, 200).await;
    let _listing_mock = mock_listing(
        &mut server,
        &[
            ("b2", "Looking for a couch", window.start() + 60),
            ("c3", "old table", window.start() - 1),
        ],
    )
    .await;

    let config = config_for(&server);
    let client = RedditClient::new(&config).unwrap();
    let mailer = RecordingMailer::default();

    let outcome = run(&config, &client, &mailer).await.unwrap();
    assert_eq!(outcome, RunOutcome::NoMatches);
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_auth_failure_stops_before_fetch_and_send() {
    let mut server = Server::new_async().await;

    let token_mock = mock_token(&mut server, 403).await;
    let listing_mock = server
        .mock("GET", "/r/HyderabadBuySell/new")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = config_for(&server);
    let client = RedditClient::new(&config).unwrap();
    let mailer = RecordingMailer::default();

    match run(&config, &client, &mailer).await {
        Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })) => {
            assert_eq!(reason, "403 Forbidden");
        }
        other => panic!("Expected AuthenticationFailed, got {:?}", other),
    }

    token_mock.assert_async().await;
    listing_mock.assert_async().await;
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_sends_nothing() {
    let mut server = Server::new_async().await;

    let _token_mock = mock_token(&mut server, 200).await;
    let _listing_mock = server
        .mock("GET", "/r/HyderabadBuySell/new")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{\"kind\": \"Listing\"")
        .create_async()
        .await;

    let config = config_for(&server);
    let client = RedditClient::new(&config).unwrap();
    let mailer = RecordingMailer::default();

    let result = run(&config, &client, &mailer).await;
    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::InvalidResponse { .. }))
    ));
    assert!(mailer.sent().is_empty());
}

#[test]
fn test_missing_mail_password_fails_configuration() {
    let env: HashMap<&str, &str> = [
        ("REDDIT_CLIENT_ID", "client"),
        ("REDDIT_CLIENT_SECRET", "secret"),
        ("REDDIT_USERNAME", "watcher"),
        ("REDDIT_PASSWORD", "pass"),
        ("SMTP_HOST", "smtp.example.com"),
        ("SMTP_PORT", "465"),
        ("EMAIL_FROM", "bot@example.com"),
        ("EMAIL_TO", "me@example.com"),
        ("EMAIL_USER", "mailer"),
    ]
    .into_iter()
    .collect();

    let result = AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
    match result {
        Err(CoreError::Config(ConfigError::MissingEnvironmentVariable { var_name })) => {
            assert_eq!(var_name, "EMAIL_PASS");
        }
        other => panic!("Expected missing EMAIL_PASS, got {:?}", other.map(|c| c.board)),
    }
}
