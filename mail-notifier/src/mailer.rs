use crate::digest::Digest;
use async_trait::async_trait;
use digest_core::{CoreError, MailError, SmtpSettings};
use lettre::message::header::{ContentType, MIME_VERSION_1_0};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, error, info, warn};

/// SMTP reply codes that mean the login itself was refused.
const AUTH_REJECTION_CODES: [&str; 3] = ["530", "534", "535"];

/// Delivery seam for the digest. The run calls it at most once.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_digest(&self, digest: &Digest) -> Result<(), CoreError>;
}

/// Sends over implicit TLS with PLAIN authentication. Each delivery opens
/// its own session and closes it with QUIT.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    server: String,
}

impl SmtpMailer {
    /// Validates addresses and prepares the transport. No connection is
    /// made until [`Mailer::send_digest`].
    pub fn new(settings: &SmtpSettings) -> Result<Self, CoreError> {
        let from = parse_mailbox("EMAIL_FROM", &settings.from)?;
        let to = parse_mailbox("EMAIL_TO", &settings.to)?;

        if settings.accept_invalid_certs {
            warn!(
                "TLS certificate verification is disabled for {}",
                settings.host
            );
        }
        let tls = TlsParameters::builder(settings.host.clone())
            .dangerous_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| MailError::ConnectionFailed {
                details: format!("TLS setup for {} failed: {}", settings.host, e),
            })?;

        let transport =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.host.as_str())
                .port(settings.port)
                .tls(Tls::Wrapper(tls))
                .credentials(Credentials::new(
                    settings.username.clone(),
                    settings.password.clone(),
                ))
                .authentication(vec![Mechanism::Plain])
                .build();

        Ok(Self {
            transport,
            from,
            to,
            server: format!("{}:{}", settings.host, settings.port),
        })
    }

    pub fn build_message(&self, digest: &Digest) -> Result<Message, CoreError> {
        build_message(&self.from, &self.to, digest)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_digest(&self, digest: &Digest) -> Result<(), CoreError> {
        let message = self.build_message(digest)?;

        debug!("Opening SMTP session with {}", self.server);
        let response = self.transport.send(message).await.map_err(|e| {
            error!("SMTP delivery to {} failed: {}", self.server, e);
            let status = e.status().map(|code| code.to_string());
            classify_smtp_failure(status.as_deref(), e.is_client(), e.to_string())
        })?;

        info!(
            "SMTP server accepted digest for {}: {}",
            self.to,
            response.code()
        );
        Ok(())
    }
}

pub fn build_message(from: &Mailbox, to: &Mailbox, digest: &Digest) -> Result<Message, CoreError> {
    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(digest.subject.clone())
        .header(MIME_VERSION_1_0)
        .header(ContentType::TEXT_PLAIN)
        .body(digest.body.clone())
        .map_err(|e| {
            MailError::Build {
                details: e.to_string(),
            }
            .into()
        })
}

fn parse_mailbox(field: &str, address: &str) -> Result<Mailbox, CoreError> {
    address.parse::<Mailbox>().map_err(|_| {
        MailError::InvalidAddress {
            field: field.to_string(),
            address: address.to_string(),
        }
        .into()
    })
}

/// Maps a failed SMTP exchange onto the mail error taxonomy. A server reply
/// code means the session was up and a protocol step was refused; no code
/// and no client-side fault means the transport itself failed.
pub fn classify_smtp_failure(status: Option<&str>, is_client: bool, details: String) -> MailError {
    match status {
        Some(code) if AUTH_REJECTION_CODES.contains(&code) => {
            MailError::AuthenticationRejected { details }
        }
        Some(_) => MailError::DeliveryFailed { details },
        None if is_client => MailError::DeliveryFailed { details },
        None => MailError::ConnectionFailed { details },
    }
}
