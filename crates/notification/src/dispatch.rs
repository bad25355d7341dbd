//! Best-effort notification of a submission.
//!
//! Every message planned for an event is rendered and sent concurrently. A
//! failed send never cancels the others; the submission counts as delivered
//! when at least one message was accepted by the transport.

use std::sync::Arc;

use formrelay_shared::{DispatchOutcome, settle_all};
use formrelay_submission::SubmissionEvent;

use crate::{AttachmentPart, Brand, Mailer, MessageId, Notice, NotifyError, OutgoingMessage, render};

/// Internal mailboxes that receive staff alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients {
    pub admin: String,
    pub careers: String,
}

/// One planned message: what to render and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub notice: Notice,
    pub to: String,
    pub reply_to: Option<String>,
}

#[derive(Clone)]
pub struct Dispatcher {
    mailer: Arc<dyn Mailer>,
    recipients: Arc<Recipients>,
    brand: Arc<Brand>,
}

impl Dispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, recipients: Recipients, brand: Brand) -> Self {
        Self {
            mailer,
            recipients: Arc::new(recipients),
            brand: Arc::new(brand),
        }
    }

    pub fn brand(&self) -> &Brand {
        &self.brand
    }

    /// Messages produced for `event`, admin alert first.
    pub fn plan(&self, event: &SubmissionEvent) -> Vec<Notification> {
        Notice::for_kind(event.kind())
            .iter()
            .map(|&notice| self.route(event, notice))
            .collect()
    }

    fn route(&self, event: &SubmissionEvent, notice: Notice) -> Notification {
        let submitter = event.submitter_email().to_owned();

        match (event, notice) {
            (SubmissionEvent::Application(_), Notice::AdminAlert) => Notification {
                notice,
                to: self.recipients.careers.clone(),
                reply_to: Some(submitter),
            },
            (_, Notice::AdminAlert) => Notification {
                notice,
                to: self.recipients.admin.clone(),
                reply_to: Some(submitter),
            },
            _ => Notification {
                notice,
                to: submitter,
                reply_to: None,
            },
        }
    }

    async fn deliver(
        &self,
        event: &SubmissionEvent,
        notification: Notification,
    ) -> Result<MessageId, NotifyError> {
        let body = render(event, notification.notice, &self.brand)?;

        let attachment = match event {
            SubmissionEvent::Application(a) => Some(AttachmentPart {
                filename: a.resume.filename.clone(),
                content_type: a.resume.mime_type.clone(),
                content: a.resume.content.clone(),
            }),
            _ => None,
        };

        let id = self
            .mailer
            .send(OutgoingMessage {
                to: notification.to,
                reply_to: notification.reply_to,
                subject: body.subject,
                html: body.html,
                plain: body.plain,
                attachment,
            })
            .await?;

        Ok(id)
    }

    /// Sends every planned message and waits for all of them to settle.
    #[tracing::instrument(skip_all, fields(kind = %event.kind()))]
    pub async fn dispatch(&self, event: &SubmissionEvent) -> DispatchOutcome<Notice> {
        let tasks = self
            .plan(event)
            .into_iter()
            .map(|notification| (notification.notice, self.deliver(event, notification)));

        let settled = settle_all(tasks).await;

        for task in &settled {
            match &task.result {
                Ok(id) => tracing::debug!(notice = %task.key, message_id = %id, "Notification sent"),
                Err(e) => tracing::error!(notice = %task.key, error = %e, "Notification failed"),
            }
        }

        let outcome = DispatchOutcome::from_settled(&settled);

        tracing::info!(
            attempted = outcome.attempted.len(),
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Dispatch settled"
        );

        outcome
    }
}
