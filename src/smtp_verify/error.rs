use thiserror::Error;

use crate::mx::Error as MxError;

/// Failures that happen before any SMTP conversation starts.
#[derive(Debug, Error)]
pub enum SmtpProbeError {
    #[error("invalid email address: {address}")]
    InvalidAddress { address: String },
    #[error("No MX records found for domain {domain}")]
    NoMailExchanger { domain: String },
    #[error(transparent)]
    Resolver(#[from] MxError),
}

impl SmtpProbeError {
    pub fn invalid_address(address: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
        }
    }

    pub fn no_mail_exchanger(domain: impl Into<String>) -> Self {
        Self::NoMailExchanger {
            domain: domain.into(),
        }
    }
}
