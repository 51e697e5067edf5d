use std::fmt;

use serde::Serialize;

/// A raw SMTP reply, preserving the numeric status code and message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.message)
        }
    }
}

/// What the recipient step told us about a mailbox.
///
/// `Indeterminate` covers timeouts, disconnects, cancellation and replies outside the
/// expected set. It is never a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SmtpProbeOutcome {
    Accepted {
        reply: SmtpReply,
    },
    Rejected {
        reply: SmtpReply,
    },
    Indeterminate {
        reason: String,
        reply: Option<SmtpReply>,
    },
}

impl SmtpProbeOutcome {
    pub fn indeterminate(reason: impl Into<String>) -> Self {
        Self::Indeterminate {
            reason: reason.into(),
            reply: None,
        }
    }

    pub(crate) fn indeterminate_reply(reply: SmtpReply) -> Self {
        Self::Indeterminate {
            reason: format!("SMTP error: {}", reply.code),
            reply: Some(reply),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::Indeterminate { .. })
    }

    pub fn reply(&self) -> Option<&SmtpReply> {
        match self {
            Self::Accepted { reply } | Self::Rejected { reply } => Some(reply),
            Self::Indeterminate { reply, .. } => reply.as_ref(),
        }
    }

    /// Human-readable reason, suitable for a verdict message.
    pub fn message(&self) -> String {
        match self {
            Self::Accepted { .. } => "SMTP verification successful".to_string(),
            Self::Rejected { reply } if reply.message.is_empty() => {
                format!("SMTP returned code {}", reply.code)
            }
            Self::Rejected { reply } => {
                format!("SMTP returned code {}: {}", reply.code, reply.message)
            }
            Self::Indeterminate { reason, .. } => reason.clone(),
        }
    }
}

impl fmt::Display for SmtpProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted { reply } => write!(f, "accepted ({reply})"),
            Self::Rejected { reply } => write!(f, "rejected ({reply})"),
            Self::Indeterminate { reason, .. } => write!(f, "indeterminate ({reason})"),
        }
    }
}
