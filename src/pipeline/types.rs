use std::fmt;

use serde::Serialize;

pub(crate) const MSG_NO_MX: &str = "Domain has no valid MX records";
pub(crate) const MSG_APPEARS_VALID: &str = "Email appears valid";
pub(crate) const MSG_PROBE_NO_MX: &str = "No MX records found for domain";

/// Result of the optional SMTP stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmtpCheck {
    NotChecked,
    Accepted,
    Rejected,
    Indeterminate,
}

impl SmtpCheck {
    /// `Some(true)` / `Some(false)` for a definite answer, `None` otherwise.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Accepted => Some(true),
            Self::Rejected => Some(false),
            Self::NotChecked | Self::Indeterminate => None,
        }
    }
}

impl fmt::Display for SmtpCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotChecked => "not checked",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Indeterminate => "indeterminate",
        })
    }
}

/// Final, immutable answer for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    pub email: String,
    pub valid: bool,
    pub syntax_valid: bool,
    pub mx_valid: bool,
    pub smtp: SmtpCheck,
    pub message: String,
    pub warnings: Vec<String>,
}

impl ValidationVerdict {
    pub(crate) fn rejected(email: String, message: impl Into<String>) -> Self {
        Self {
            email,
            valid: false,
            syntax_valid: false,
            mx_valid: false,
            smtp: SmtpCheck::NotChecked,
            message: message.into(),
            warnings: Vec::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
