use std::net::IpAddr;

use strum::{AsRefStr, Display};
use time::OffsetDateTime;

use crate::ResumeAttachment;

/// A validated form submission. Built once at the boundary and consumed by a
/// single dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    Contact(ContactMessage),
    Newsletter(NewsletterSignup),
    Application(JobApplication),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionKind {
    Contact,
    Newsletter,
    Application,
}

impl SubmissionEvent {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            SubmissionEvent::Contact(_) => SubmissionKind::Contact,
            SubmissionEvent::Newsletter(_) => SubmissionKind::Newsletter,
            SubmissionEvent::Application(_) => SubmissionKind::Application,
        }
    }

    /// Address of the person who filled in the form.
    pub fn submitter_email(&self) -> &str {
        match self {
            SubmissionEvent::Contact(c) => &c.email,
            SubmissionEvent::Newsletter(n) => &n.email,
            SubmissionEvent::Application(a) => &a.email,
        }
    }

    pub fn received_at(&self) -> OffsetDateTime {
        match self {
            SubmissionEvent::Contact(c) => c.timestamp,
            SubmissionEvent::Newsletter(n) => n.timestamp,
            SubmissionEvent::Application(a) => a.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub company: String,
    pub notes: String,
    pub timestamp: OffsetDateTime,
    pub source_ip: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsletterSignup {
    pub email: String,
    pub timestamp: OffsetDateTime,
    pub source_ip: Option<IpAddr>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobApplication {
    pub name: String,
    pub email: String,
    pub portfolio_url: Option<String>,
    pub job_title: String,
    pub message: Option<String>,
    pub resume: ResumeAttachment,
    pub timestamp: OffsetDateTime,
    pub source_ip: Option<IpAddr>,
}

impl From<ContactMessage> for SubmissionEvent {
    fn from(value: ContactMessage) -> Self {
        Self::Contact(value)
    }
}

impl From<NewsletterSignup> for SubmissionEvent {
    fn from(value: NewsletterSignup) -> Self {
        Self::Newsletter(value)
    }
}

impl From<JobApplication> for SubmissionEvent {
    fn from(value: JobApplication) -> Self {
        Self::Application(value)
    }
}
