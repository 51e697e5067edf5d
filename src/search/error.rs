use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("search request failed: {source}")]
    Http {
        #[source]
        source: reqwest::Error,
    },
    #[error("search provider unavailable: {0}")]
    Unavailable(String),
}

impl SearchError {
    pub(crate) fn client(source: reqwest::Error) -> Self {
        Self::Client { source }
    }

    pub(crate) fn http(source: reqwest::Error) -> Self {
        Self::Http { source }
    }
}
