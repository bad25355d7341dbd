//! Email notification service using lettre

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde::Deserialize;
use strum::{Display, EnumString};

use crate::{MessageId, OutgoingMessage, SendError, mailer::Mailer};

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TlsMode {
    /// Implicit TLS (SMTPS), usually port 465.
    #[default]
    Wrapper,
    /// Plain connection upgraded with STARTTLS, usually port 587.
    Starttls,
    /// No TLS at all. Local catch-all servers only.
    None,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
    #[serde(default)]
    pub tls: TlsMode,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_admin_address")]
    pub admin_address: String,
    #[serde(default = "default_careers_address")]
    pub careers_address: String,
    /// Log messages instead of handing them to the SMTP server.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            tls: TlsMode::default(),
            from_address: default_from_address(),
            from_name: default_from_name(),
            admin_address: default_admin_address(),
            careers_address: default_careers_address(),
            dry_run: false,
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_from_address() -> String {
    "noreply@orivanta.ai".to_string()
}

fn default_from_name() -> String {
    "Orivanta Labs".to_string()
}

fn default_admin_address() -> String {
    "hello@orivanta.ai".to_string()
}

fn default_careers_address() -> String {
    "careers@orivanta.ai".to_string()
}

/// SMTP backed [`Mailer`]. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    skip_sending: bool,
}

impl EmailService {
    /// Create a new email service from configuration
    ///
    /// No connection is opened here; the pool connects on first use.
    /// Must be called inside a Tokio runtime, the pool spawns its reaper task.
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let builder = match config.tls {
            TlsMode::Wrapper => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?,
            TlsMode::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            }
            TlsMode::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            }
        };

        let builder = builder
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(30)));

        let mailer = if config.smtp_username.is_empty() || config.smtp_password.is_empty() {
            tracing::info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                tls = %config.tls,
                "SMTP credentials not configured, using unauthenticated connection"
            );
            builder.build()
        } else {
            tracing::info!(
                smtp_host = %config.smtp_host,
                smtp_port = config.smtp_port,
                tls = %config.tls,
                from = %config.from_address,
                "Email service initialized with authentication"
            );
            let creds =
                Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
            builder.credentials(creds).build()
        };

        Ok(Self {
            mailer,
            from: sender(config)?,
            skip_sending: config.dry_run,
        })
    }

    /// Create a mock email service that logs messages and skips SMTP.
    ///
    /// Like [`EmailService::new`] it needs a Tokio runtime.
    pub fn new_mock(config: &EmailConfig) -> anyhow::Result<Self> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost")
            .port(1025)
            .build();

        tracing::info!(from = %config.from_address, "Mock email service initialized (SMTP calls skipped)");

        Ok(Self {
            mailer,
            from: sender(config)?,
            skip_sending: true,
        })
    }

    /// Opens a connection and runs the SMTP handshake.
    pub async fn verify(&self) -> anyhow::Result<bool> {
        if self.skip_sending {
            return Ok(true);
        }

        Ok(self.mailer.test_connection().await?)
    }

    fn build(&self, message: OutgoingMessage, id: &MessageId) -> Result<Message, SendError> {
        let mut builder = Message::builder()
            .message_id(Some(id.0.clone()))
            .from(self.from.clone())
            .to(parse_mailbox(&message.to)?)
            .subject(message.subject);

        if let Some(reply_to) = &message.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }

        let body = MultiPart::alternative_plain_html(message.plain, message.html);

        let result = match message.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)
                    .map_err(|e| SendError::Build(e.to_string()))?;
                builder.multipart(
                    MultiPart::mixed().multipart(body).singlepart(
                        Attachment::new(attachment.filename)
                            .body(attachment.content.to_vec(), content_type),
                    ),
                )
            }
            None => builder.multipart(body),
        };

        result.map_err(|e| SendError::Build(e.to_string()))
    }

    fn next_message_id(&self) -> MessageId {
        MessageId(format!(
            "<{}@{}>",
            uuid::Uuid::new_v4(),
            self.from.email.domain()
        ))
    }
}

#[async_trait]
impl Mailer for EmailService {
    #[tracing::instrument(skip_all, fields(to = %message.to, subject = %message.subject))]
    async fn send(&self, message: OutgoingMessage) -> Result<MessageId, SendError> {
        let id = self.next_message_id();
        let message = self.build(message, &id)?;

        if self.skip_sending {
            tracing::info!(message_id = %id, "Mock email service: Skipping actual SMTP send");
            return Ok(id);
        }

        tracing::info!(message_id = %id, "Sending email");

        self.mailer
            .send(message)
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        Ok(id)
    }
}

fn sender(config: &EmailConfig) -> anyhow::Result<Mailbox> {
    Ok(Mailbox::new(
        Some(config.from_name.clone()),
        config.from_address.parse()?,
    ))
}

fn parse_mailbox(address: &str) -> Result<Mailbox, SendError> {
    address.parse().map_err(|e: lettre::address::AddressError| SendError::Address {
        address: address.to_owned(),
        reason: e.to_string(),
    })
}
