use serde::Serialize;

use crate::pipeline::ValidationVerdict;

/// A discovered person, enriched step by step (email, then validation).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Contact {
    pub name: String,
    pub title: String,
    pub linkedin_url: String,
    pub email: Option<String>,
    pub company_domain: String,
    pub email_valid: Option<bool>,
    pub mx_valid: Option<bool>,
    pub validation_message: Option<String>,
}

impl Contact {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        linkedin_url: impl Into<String>,
        company_domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            linkedin_url: linkedin_url.into(),
            company_domain: company_domain.into(),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn apply_verdict(&mut self, verdict: &ValidationVerdict) {
        self.email_valid = Some(verdict.valid);
        self.mx_valid = Some(verdict.mx_valid);
        self.validation_message = Some(verdict.message.clone());
    }

    pub fn has_valid_email(&self) -> bool {
        self.email_valid == Some(true)
    }
}
