use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HUNTER_API_KEY is not configured")]
    MissingApiKey,
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl LookupError {
    pub(crate) fn client(source: reqwest::Error) -> Self {
        Self::Client {
            source: source.without_url(),
        }
    }

    // the API key travels in the query string; keep it out of messages
    pub(crate) fn http(endpoint: &'static str, source: reqwest::Error) -> Self {
        Self::Http {
            endpoint,
            source: source.without_url(),
        }
    }

    pub(crate) fn decode(endpoint: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { endpoint, source }
    }
}
