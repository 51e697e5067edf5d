use serde::Serialize;

pub(crate) const MSG_EMPTY: &str = "Email is empty";
pub(crate) const MSG_INVALID_FORMAT: &str = "Invalid email format";
pub(crate) const MSG_TOO_LONG: &str = "Email length exceeds limits";
pub(crate) const MSG_PERSONAL: &str =
    "WARNING: Personal email domain detected (potential GDPR concern)";
pub(crate) const MSG_VALID: &str = "Valid syntax";

/// RFC 5321 limits.
pub const MAX_LOCAL_LEN: usize = 64;
pub const MAX_DOMAIN_LEN: usize = 255;

/// Outcome of [`SyntaxChecker::check_syntax`](super::SyntaxChecker::check_syntax).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxReport {
    pub valid: bool,
    /// Trimmed, lower-cased address. Holds the raw input when it was empty.
    pub email: String,
    pub message: String,
    pub personal_domain_warning: bool,
}

impl SyntaxReport {
    pub(crate) fn invalid(email: impl Into<String>, message: &str) -> Self {
        Self {
            valid: false,
            email: email.into(),
            message: message.to_string(),
            personal_domain_warning: false,
        }
    }

    pub(crate) fn valid(email: String, personal: bool) -> Self {
        Self {
            valid: true,
            email,
            message: if personal { MSG_PERSONAL } else { MSG_VALID }.to_string(),
            personal_domain_warning: personal,
        }
    }

    pub fn local_part(&self) -> Option<&str> {
        self.email.split_once('@').map(|(local, _)| local)
    }

    pub fn domain(&self) -> Option<&str> {
        self.email.rsplit_once('@').map(|(_, domain)| domain)
    }
}
