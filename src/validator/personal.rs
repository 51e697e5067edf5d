use std::collections::HashSet;

use phf::phf_set;

const DEFAULT_PERSONAL_DOMAINS: phf::Set<&'static str> = phf_set! {
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "mail.com",
    "protonmail.com",
    "yandex.com",
    "zoho.com",
};

/// Free/personal mail providers that trigger a compliance warning.
///
/// Matching is exact on the whole domain and case-insensitive; subdomains of a listed
/// provider are not considered personal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalDomains {
    domains: HashSet<String>,
}

impl PersonalDomains {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().trim().trim_end_matches('.').to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            domains: HashSet::new(),
        }
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(&domain.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl Default for PersonalDomains {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONAL_DOMAINS.iter())
    }
}
