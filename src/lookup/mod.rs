//! Organization email-pattern discovery (Hunter.io).

mod error;
mod hunter;
mod types;

pub use error::LookupError;
pub use hunter::{API_KEY_ENV, DEFAULT_BASE_URL, HunterClient, HunterOptions};
pub use types::{EmailPattern, HunterVerification};

pub trait PatternLookup {
    /// `Ok(None)` when the provider knows no pattern for `domain`.
    fn email_pattern(&self, domain: &str) -> Result<Option<EmailPattern>, LookupError>;
}

impl<T: PatternLookup + ?Sized> PatternLookup for &T {
    fn email_pattern(&self, domain: &str) -> Result<Option<EmailPattern>, LookupError> {
        (**self).email_pattern(domain)
    }
}
