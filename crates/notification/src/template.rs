//! Message rendering.
//!
//! HTML bodies are askama `.html` templates, so every interpolated value is
//! HTML-escaped; plain-text alternatives use `.txt` templates. Rendering does
//! no I/O and is deterministic for a given event and notice.

use askama::Template;
use formrelay_submission::{
    ContactMessage, JobApplication, NewsletterSignup, SubmissionEvent, SubmissionKind,
    first_name, single_line,
};
use serde::Deserialize;
use strum::{AsRefStr, Display};
use time::{OffsetDateTime, UtcOffset, macros::format_description, macros::offset};

/// Submissions are displayed in Indian Standard Time.
pub const DISPLAY_OFFSET: UtcOffset = offset!(+5:30);

/// Which message of a submission is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Notice {
    AdminAlert,
    UserAutoReply,
    UserWelcome,
}

impl Notice {
    /// Notices produced for a submission kind, admin first.
    pub fn for_kind(kind: SubmissionKind) -> &'static [Notice] {
        match kind {
            SubmissionKind::Contact => &[Notice::AdminAlert, Notice::UserAutoReply],
            SubmissionKind::Newsletter => &[Notice::AdminAlert, Notice::UserWelcome],
            SubmissionKind::Application => &[Notice::AdminAlert],
        }
    }
}

/// Company details shown in user facing messages.
#[derive(Debug, Clone, Deserialize)]
pub struct Brand {
    #[serde(default = "default_company_name")]
    pub company_name: String,
    #[serde(default = "default_tagline")]
    pub tagline: String,
    #[serde(default = "default_support_email")]
    pub support_email: String,
    #[serde(default = "default_website_url")]
    pub website_url: String,
    #[serde(default = "default_booking_url")]
    pub booking_url: String,
}

impl Default for Brand {
    fn default() -> Self {
        Self {
            company_name: default_company_name(),
            tagline: default_tagline(),
            support_email: default_support_email(),
            website_url: default_website_url(),
            booking_url: default_booking_url(),
        }
    }
}

fn default_company_name() -> String {
    "Orivanta Labs".to_string()
}

fn default_tagline() -> String {
    "AI Chatbots & Automation for Modern Businesses".to_string()
}

fn default_support_email() -> String {
    "hello@orivanta.ai".to_string()
}

fn default_website_url() -> String {
    "https://www.orivanta.ai".to_string()
}

fn default_booking_url() -> String {
    "https://orivanta.zohobookings.in/#/353437000000039052".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody {
    pub subject: String,
    pub html: String,
    pub plain: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notice `{notice}` does not apply to {kind} submissions")]
    NotApplicable {
        notice: Notice,
        kind: SubmissionKind,
    },

    #[error("failed to render template: {0}")]
    Render(#[from] askama::Error),

    #[error(transparent)]
    Send(#[from] crate::SendError),
}

/// Formats a timestamp the way submissions are shown to staff,
/// e.g. `19/10/2026, 4:39:12 pm`.
pub fn display_time(timestamp: OffsetDateTime) -> String {
    let format = format_description!(
        "[day]/[month]/[year], [hour repr:12 padding:none]:[minute]:[second] [period case:lower]"
    );

    timestamp
        .to_offset(DISPLAY_OFFSET)
        .format(format)
        .unwrap_or_else(|_| timestamp.to_string())
}

fn display_ip(ip: Option<std::net::IpAddr>) -> String {
    ip.map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Renders the subject and both bodies of `notice` for `event`.
pub fn render(
    event: &SubmissionEvent,
    notice: Notice,
    brand: &Brand,
) -> Result<MessageBody, NotifyError> {
    match (event, notice) {
        (SubmissionEvent::Contact(m), Notice::AdminAlert) => contact_admin(m),
        (SubmissionEvent::Contact(m), Notice::UserAutoReply) => contact_reply(m, brand),
        (SubmissionEvent::Newsletter(s), Notice::AdminAlert) => newsletter_admin(s),
        (SubmissionEvent::Newsletter(_), Notice::UserWelcome) => newsletter_welcome(brand),
        (SubmissionEvent::Application(a), Notice::AdminAlert) => application_admin(a),
        (event, notice) => Err(NotifyError::NotApplicable {
            notice,
            kind: event.kind(),
        }),
    }
}

#[derive(Template)]
#[template(path = "contact_admin.html")]
struct ContactAdminHtml<'a> {
    m: &'a ContactMessage,
    received: &'a str,
    ip: &'a str,
}

#[derive(Template)]
#[template(path = "contact_admin.txt")]
struct ContactAdminText<'a> {
    m: &'a ContactMessage,
    received: &'a str,
    ip: &'a str,
}

fn contact_admin(m: &ContactMessage) -> Result<MessageBody, NotifyError> {
    let received = display_time(m.timestamp);
    let ip = display_ip(m.source_ip);

    Ok(MessageBody {
        subject: format!("New Contact Form Submission - {}", single_line(&m.company)),
        html: ContactAdminHtml {
            m,
            received: &received,
            ip: &ip,
        }
        .render()?,
        plain: ContactAdminText {
            m,
            received: &received,
            ip: &ip,
        }
        .render()?,
    })
}

#[derive(Template)]
#[template(path = "contact_reply.html")]
struct ContactReplyHtml<'a> {
    first_name: &'a str,
    brand: &'a Brand,
}

#[derive(Template)]
#[template(path = "contact_reply.txt")]
struct ContactReplyText<'a> {
    first_name: &'a str,
    brand: &'a Brand,
}

fn contact_reply(m: &ContactMessage, brand: &Brand) -> Result<MessageBody, NotifyError> {
    let first_name = first_name(&m.name);

    Ok(MessageBody {
        subject: format!("Thanks for reaching out to {}!", brand.company_name),
        html: ContactReplyHtml { first_name, brand }.render()?,
        plain: ContactReplyText { first_name, brand }.render()?,
    })
}

#[derive(Template)]
#[template(path = "newsletter_admin.html")]
struct NewsletterAdminHtml<'a> {
    s: &'a NewsletterSignup,
    received: &'a str,
    ip: &'a str,
}

#[derive(Template)]
#[template(path = "newsletter_admin.txt")]
struct NewsletterAdminText<'a> {
    s: &'a NewsletterSignup,
    received: &'a str,
    ip: &'a str,
}

fn newsletter_admin(s: &NewsletterSignup) -> Result<MessageBody, NotifyError> {
    let received = display_time(s.timestamp);
    let ip = display_ip(s.source_ip);

    Ok(MessageBody {
        subject: format!("New Newsletter Subscription - {}", s.email),
        html: NewsletterAdminHtml {
            s,
            received: &received,
            ip: &ip,
        }
        .render()?,
        plain: NewsletterAdminText {
            s,
            received: &received,
            ip: &ip,
        }
        .render()?,
    })
}

#[derive(Template)]
#[template(path = "newsletter_welcome.html")]
struct NewsletterWelcomeHtml<'a> {
    brand: &'a Brand,
}

#[derive(Template)]
#[template(path = "newsletter_welcome.txt")]
struct NewsletterWelcomeText<'a> {
    brand: &'a Brand,
}

fn newsletter_welcome(brand: &Brand) -> Result<MessageBody, NotifyError> {
    Ok(MessageBody {
        subject: format!("Welcome to {} Newsletter!", brand.company_name),
        html: NewsletterWelcomeHtml { brand }.render()?,
        plain: NewsletterWelcomeText { brand }.render()?,
    })
}

#[derive(Template)]
#[template(path = "application_admin.html")]
struct ApplicationAdminHtml<'a> {
    a: &'a JobApplication,
    received: &'a str,
}

#[derive(Template)]
#[template(path = "application_admin.txt")]
struct ApplicationAdminText<'a> {
    a: &'a JobApplication,
    received: &'a str,
}

fn application_admin(a: &JobApplication) -> Result<MessageBody, NotifyError> {
    let received = display_time(a.timestamp);

    Ok(MessageBody {
        subject: format!(
            "New Job Application: {} - {}",
            single_line(&a.job_title),
            single_line(&a.name)
        ),
        html: ApplicationAdminHtml {
            a,
            received: &received,
        }
        .render()?,
        plain: ApplicationAdminText {
            a,
            received: &received,
        }
        .render()?,
    })
}
