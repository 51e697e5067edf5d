use std::sync::LazyLock;
use std::time::Duration;

use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::error::SearchError;

/// One organic web search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// A web search backend. Implementations return at most `limit` hits, best first.
pub trait SearchProvider {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;
}

impl<T: SearchProvider + ?Sized> SearchProvider for &T {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        (**self).search(query, limit)
    }
}

pub const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

static RESULT: LazyLock<Selector> = LazyLock::new(|| selector(".result"));
static RESULT_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.result__a"));
static RESULT_SNIPPET: LazyLock<Selector> = LazyLock::new(|| selector(".result__snippet"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector is valid")
}

/// DuckDuckGo's JavaScript-free result page.
#[derive(Debug, Clone)]
pub struct DuckDuckGoHtml {
    http: Client,
    endpoint: String,
}

impl DuckDuckGoHtml {
    pub fn new(timeout: Duration) -> Result<Self, SearchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("leadscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SearchError::client)?;
        Ok(Self::with_http_client(http, DUCKDUCKGO_HTML_ENDPOINT))
    }

    pub fn with_http_client(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

impl SearchProvider for DuckDuckGoHtml {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        tracing::debug!(query, "querying DuckDuckGo");
        let body = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(SearchError::http)?;

        let mut hits = parse_results(&body);
        hits.truncate(limit);
        Ok(hits)
    }
}

pub(crate) fn parse_results(html: &str) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT)
        .filter_map(|result| {
            let link = result.select(&RESULT_LINK).next()?;
            let url = resolve_redirect(link.value().attr("href")?)?;
            let snippet = result
                .select(&RESULT_SNIPPET)
                .next()
                .map(text_of)
                .unwrap_or_default();
            Some(SearchHit {
                url,
                title: text_of(link),
                snippet,
            })
        })
        .collect()
}

/// Result links go through `/l/?uddg=<target>`; unwrap them to the target URL.
pub(crate) fn resolve_redirect(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;
    let target = parsed
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned());
    match target {
        Some(target) => Some(target),
        None if matches!(parsed.scheme(), "http" | "https") => Some(parsed.into()),
        None => None,
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
