use serde::{Deserialize, Serialize};

/// Naming convention an organization uses for its addresses, e.g. `{first}.{last}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailPattern {
    pub pattern: String,
    pub organization: Option<String>,
    /// Number of addresses the provider based the pattern on.
    pub sample_count: u64,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HunterVerification {
    pub status: Option<String>,
    pub score: Option<u32>,
    pub result: Option<String>,
}
