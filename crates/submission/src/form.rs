//! Raw form payloads and their validation into [`SubmissionEvent`] variants.
//!
//! Every string is trimmed before the rules run, and a failed validation
//! reports every violated field at once.

use std::net::IpAddr;

use formrelay_shared::{FieldError, field_errors};
use serde::Deserialize;
use time::OffsetDateTime;
use validator::Validate;

use crate::{
    ContactMessage, JobApplication, NewsletterSignup, ResumeUpload, multiline, normalize_email,
    single_line,
};

pub const DEFAULT_NEWSLETTER_SOURCE: &str = "website";

const CONTACT_FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("email", "email"),
    ("company", "company"),
    ("notes", "notes"),
];

const NEWSLETTER_FIELDS: &[(&str, &str)] = &[("email", "email"), ("source", "source")];

const CAREER_FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("email", "email"),
    ("portfolio", "portfolio"),
    ("job_title", "jobTitle"),
    ("message", "message"),
];

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ContactForm {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(length(
        min = 2,
        max = 100,
        message = "Company name must be between 2 and 100 characters"
    ))]
    pub company: String,
    #[validate(length(
        min = 10,
        max = 1000,
        message = "Message must be between 10 and 1000 characters"
    ))]
    pub notes: String,
}

impl ContactForm {
    pub fn into_event(
        self,
        timestamp: OffsetDateTime,
        source_ip: Option<IpAddr>,
    ) -> Result<ContactMessage, Vec<FieldError>> {
        let form = Self {
            name: single_line(&self.name),
            email: self.email.trim().to_owned(),
            company: single_line(&self.company),
            notes: multiline(&self.notes),
        };

        form.validate()
            .map_err(|errors| field_errors(&errors, CONTACT_FIELDS))?;

        Ok(ContactMessage {
            name: form.name,
            email: normalize_email(&form.email),
            company: form.company,
            notes: form.notes,
            timestamp,
            source_ip,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewsletterForm {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(length(max = 50, message = "Source must be at most 50 characters"))]
    pub source: Option<String>,
}

impl NewsletterForm {
    pub fn into_event(
        self,
        timestamp: OffsetDateTime,
        source_ip: Option<IpAddr>,
    ) -> Result<NewsletterSignup, Vec<FieldError>> {
        let form = Self {
            email: self.email.trim().to_owned(),
            source: non_empty(self.source.as_deref().map(single_line)),
        };

        form.validate()
            .map_err(|errors| field_errors(&errors, NEWSLETTER_FIELDS))?;

        Ok(NewsletterSignup {
            email: normalize_email(&form.email),
            timestamp,
            source_ip,
            source: form
                .source
                .unwrap_or_else(|| DEFAULT_NEWSLETTER_SOURCE.to_owned()),
        })
    }
}

/// Text fields of a job application. The résumé arrives as a separate file
/// part and is checked alongside.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CareerForm {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    #[validate(length(max = 300, message = "Portfolio link must be at most 300 characters"))]
    pub portfolio: Option<String>,
    #[validate(length(min = 1, max = 150, message = "Job title is required"))]
    pub job_title: String,
    #[validate(length(max = 5000, message = "Message must be at most 5000 characters"))]
    pub message: Option<String>,
}

impl CareerForm {
    pub fn into_event(
        self,
        resume: Option<ResumeUpload>,
        timestamp: OffsetDateTime,
        source_ip: Option<IpAddr>,
    ) -> Result<JobApplication, Vec<FieldError>> {
        let form = Self {
            name: single_line(&self.name),
            email: self.email.trim().to_owned(),
            portfolio: non_empty(self.portfolio.as_deref().map(single_line)),
            job_title: single_line(&self.job_title),
            message: non_empty(self.message.as_deref().map(multiline)),
        };

        let mut errors = match form.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => field_errors(&errors, CAREER_FIELDS),
        };

        let resume = match resume.unwrap_or_default().check() {
            Ok(resume) => Some(resume),
            Err(e) => {
                errors.push(FieldError::new("resume", e.to_string()));
                None
            }
        };

        let Some(resume) = resume.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };

        Ok(JobApplication {
            name: form.name,
            email: normalize_email(&form.email),
            portfolio_url: form.portfolio,
            job_title: form.job_title,
            message: form.message,
            resume,
            timestamp,
            source_ip,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
