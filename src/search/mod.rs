//! Discovery of recruiting contacts through public LinkedIn profile search.

mod error;
mod extract;
mod provider;

pub use error::SearchError;
pub use extract::{
    DEFAULT_TITLE, build_search_queries, extract_name_from_linkedin_url,
    extract_title_from_snippet,
};
pub use provider::{DUCKDUCKGO_HTML_ENDPOINT, DuckDuckGoHtml, SearchHit, SearchProvider};

use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::contact::Contact;
use crate::smtp_verify::CancellationToken;

const SLEEP_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub results_per_query: usize,
    /// Pause between two queries, randomized by `jitter` in both directions.
    pub delay: Duration,
    pub jitter: Duration,
    pub cancel: Option<CancellationToken>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            results_per_query: 5,
            delay: Duration::from_secs(2),
            jitter: Duration::from_millis(500),
            cancel: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeadSearcher<P> {
    provider: P,
    options: SearchOptions,
}

impl<P: SearchProvider> LeadSearcher<P> {
    pub fn new(provider: P, options: SearchOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Runs every query until `max_results` contacts are collected.
    ///
    /// A failing query is logged and skipped. Hits that are not LinkedIn profiles, or whose
    /// URL was already seen, are ignored.
    pub fn search_contacts(&self, company: &str, domain: &str, max_results: usize) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let mut seen = HashSet::new();

        for (position, query) in build_search_queries(company, domain).iter().enumerate() {
            if contacts.len() >= max_results || self.is_cancelled() {
                break;
            }
            if position > 0 {
                self.pause();
                if self.is_cancelled() {
                    break;
                }
            }

            let hits = match self.provider.search(query, self.options.results_per_query) {
                Ok(hits) => hits,
                Err(err) => {
                    tracing::warn!(query = %query, error = %err, "search query failed, skipping");
                    continue;
                }
            };

            for hit in hits {
                if contacts.len() >= max_results {
                    break;
                }
                if !seen.insert(hit.url.clone()) {
                    continue;
                }
                let Some(name) = extract_name_from_linkedin_url(&hit.url) else {
                    continue;
                };
                let title = extract_title_from_snippet(&format!("{} {}", hit.title, hit.snippet));
                tracing::info!(%name, %title, "contact found");
                contacts.push(Contact::new(name, title, hit.url, domain));
            }
        }

        contacts
    }

    fn is_cancelled(&self) -> bool {
        self.options
            .cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn pause(&self) {
        let delay = jittered(self.options.delay, self.options.jitter);
        let until = Instant::now() + delay;
        while !self.is_cancelled() {
            let Some(left) = until.checked_duration_since(Instant::now()) else {
                break;
            };
            if left.is_zero() {
                break;
            }
            thread::sleep(left.min(SLEEP_SLICE));
        }
    }
}

/// Keeps contacts whose title contains one of `titles`, case-insensitively.
/// An empty `titles` keeps everything.
pub fn filter_by_title(contacts: Vec<Contact>, titles: &[String]) -> Vec<Contact> {
    if titles.is_empty() {
        return contacts;
    }
    let wanted: Vec<String> = titles.iter().map(|title| title.to_lowercase()).collect();
    contacts
        .into_iter()
        .filter(|contact| {
            let title = contact.title.to_lowercase();
            wanted.iter().any(|needle| title.contains(needle.as_str()))
        })
        .collect()
}

fn jittered(delay: Duration, jitter: Duration) -> Duration {
    if jitter.is_zero() {
        return delay;
    }
    let low = delay.saturating_sub(jitter);
    let high = delay + jitter;
    rand::thread_rng().gen_range(low..=high)
}
