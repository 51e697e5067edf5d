use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::LookupError;
use super::types::{EmailPattern, HunterVerification};
use super::PatternLookup;

pub const DEFAULT_BASE_URL: &str = "https://api.hunter.io/v2";
pub const API_KEY_ENV: &str = "HUNTER_API_KEY";

const DOMAIN_SEARCH: &str = "domain-search";
const EMAIL_VERIFIER: &str = "email-verifier";

#[derive(Debug, Clone)]
pub struct HunterOptions {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HunterOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Blocking client for the Hunter.io v2 API.
#[derive(Debug, Clone)]
pub struct HunterClient {
    api_key: Option<String>,
    options: HunterOptions,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    results: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DomainData {
    pattern: Option<String>,
    organization: Option<String>,
    #[serde(default)]
    emails: Value,
}

impl HunterClient {
    pub fn new(api_key: Option<String>, options: HunterOptions) -> Result<Self, LookupError> {
        let http = Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("leadscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LookupError::client)?;
        Ok(Self::with_http_client(api_key, options, http))
    }

    pub fn with_http_client(api_key: Option<String>, options: HunterOptions, http: Client) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        Self {
            api_key,
            options,
            http,
        }
    }

    /// Reads the key from `HUNTER_API_KEY`.
    pub fn from_env(options: HunterOptions) -> Result<Self, LookupError> {
        Self::new(std::env::var(API_KEY_ENV).ok(), options)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn domain_search(&self, domain: &str) -> Result<Option<EmailPattern>, LookupError> {
        let body = self.get(DOMAIN_SEARCH, &[("domain", domain), ("limit", "1")])?;
        let pattern = parse_domain_search(domain, &body)?;
        match &pattern {
            Some(found) => tracing::info!(domain, pattern = %found.pattern, "email pattern found"),
            None => tracing::warn!(domain, "no email pattern available"),
        }
        Ok(pattern)
    }

    pub fn verify_email(&self, email: &str) -> Result<Option<HunterVerification>, LookupError> {
        let body = self.get(EMAIL_VERIFIER, &[("email", email)])?;
        parse_verification(&body)
    }

    fn get(&self, endpoint: &'static str, params: &[(&str, &str)]) -> Result<String, LookupError> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::MissingApiKey)?;
        let url = format!("{}/{endpoint}", self.options.base_url.trim_end_matches('/'));
        tracing::debug!(endpoint, "querying Hunter.io");

        self.http
            .get(url)
            .query(params)
            .query(&[("api_key", api_key)])
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|err| LookupError::http(endpoint, err))
    }
}

impl PatternLookup for HunterClient {
    fn email_pattern(&self, domain: &str) -> Result<Option<EmailPattern>, LookupError> {
        self.domain_search(domain)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T, LookupError> {
    serde_json::from_str(body).map_err(|err| LookupError::decode(endpoint, err))
}

pub(crate) fn parse_domain_search(
    domain: &str,
    body: &str,
) -> Result<Option<EmailPattern>, LookupError> {
    let envelope: Envelope<DomainData> = decode(DOMAIN_SEARCH, body)?;
    let Some(data) = envelope.data else {
        return Ok(None);
    };
    let Some(pattern) = data.pattern.filter(|p| !p.trim().is_empty()) else {
        return Ok(None);
    };

    let sample_count = envelope
        .meta
        .and_then(|meta| meta.results)
        .unwrap_or_else(|| match &data.emails {
            Value::Array(emails) => emails.len() as u64,
            Value::Number(count) => count.as_u64().unwrap_or(0),
            _ => 0,
        });

    Ok(Some(EmailPattern {
        pattern,
        organization: data.organization,
        sample_count,
        domain: domain.to_string(),
    }))
}

pub(crate) fn parse_verification(body: &str) -> Result<Option<HunterVerification>, LookupError> {
    let envelope: Envelope<HunterVerification> = decode(EMAIL_VERIFIER, body)?;
    Ok(envelope.data)
}
