use async_trait::async_trait;
use bytes::Bytes;

/// `Message-ID` of a message accepted by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPart {
    pub filename: String,
    pub content_type: String,
    pub content: Bytes,
}

/// A fully rendered message, ready for the transport. The sender address is
/// owned by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub plain: String,
    pub attachment: Option<AttachmentPart>,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("invalid address `{address}`: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound mail transport.
///
/// Implementations must be safe to share across requests; one instance is
/// created at startup and handed to the dispatcher.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> Result<MessageId, SendError>;
}
