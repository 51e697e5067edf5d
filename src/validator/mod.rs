//! Syntax checks for candidate addresses.
//!
//! [`SyntaxChecker`] is pure: no I/O, no interior mutability. The set of personal mail
//! providers is injected at construction so callers can substitute their own list.

mod personal;
mod types;

pub use personal::PersonalDomains;
pub use types::{MAX_DOMAIN_LEN, MAX_LOCAL_LEN, SyntaxReport};

use std::sync::LazyLock;

use regex::Regex;

use types::{MSG_EMPTY, MSG_INVALID_FORMAT, MSG_TOO_LONG};

// Matched against the lower-cased input only.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$")
        .expect("email pattern is a valid regex")
});

#[derive(Debug, Clone, Default)]
pub struct SyntaxChecker {
    personal_domains: PersonalDomains,
}

impl SyntaxChecker {
    pub fn new(personal_domains: PersonalDomains) -> Self {
        Self { personal_domains }
    }

    pub fn personal_domains(&self) -> &PersonalDomains {
        &self.personal_domains
    }

    pub fn is_personal_email(&self, email: &str) -> bool {
        email
            .rsplit_once('@')
            .is_some_and(|(_, domain)| self.personal_domains.contains(domain.trim()))
    }

    /// Validates the structure of `email`.
    ///
    /// A personal-provider domain is not a failure: the report stays valid and carries
    /// `personal_domain_warning`.
    pub fn check_syntax(&self, email: &str) -> SyntaxReport {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return SyntaxReport::invalid(email, MSG_EMPTY);
        }

        let normalized = trimmed.to_lowercase();
        if !EMAIL_PATTERN.is_match(&normalized) {
            return SyntaxReport::invalid(normalized, MSG_INVALID_FORMAT);
        }

        // the pattern guarantees exactly one '@'
        let Some((local, domain)) = normalized.split_once('@') else {
            return SyntaxReport::invalid(normalized, MSG_INVALID_FORMAT);
        };
        if local.len() > MAX_LOCAL_LEN || domain.len() > MAX_DOMAIN_LEN {
            return SyntaxReport::invalid(normalized, MSG_TOO_LONG);
        }

        let personal = self.personal_domains.contains(domain);
        SyntaxReport::valid(normalized, personal)
    }
}
