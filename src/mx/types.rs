use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Definitive answer of an MX query. Transient failures are reported as
/// [`MxError`](super::Error) instead, never as an absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MxStatus {
    /// Sorted by ascending preference, never empty.
    Records(Vec<MxRecord>),
    /// The domain exists but publishes no MX record (NoAnswer).
    NoRecords,
    /// NXDOMAIN.
    DomainNotFound,
    /// No nameserver could answer for the domain.
    NoNameservers,
}

impl MxStatus {
    pub fn records(&self) -> &[MxRecord] {
        match self {
            Self::Records(records) => records.as_slice(),
            _ => &[],
        }
    }

    pub fn has_records(&self) -> bool {
        !self.records().is_empty()
    }

    /// Preferred exchange host, if any.
    pub fn primary(&self) -> Option<&MxRecord> {
        self.records().first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxOptions {
    pub timeout: Duration,
    pub attempts: usize,
}

impl Default for MxOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            attempts: 2,
        }
    }
}
