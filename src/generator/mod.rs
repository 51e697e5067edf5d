//! Address synthesis from a person's name and an organization's naming pattern.

mod transliterate;

pub use transliterate::{ascii_name_part, is_latin_name};

use serde::Serialize;

use crate::contact::Contact;
use crate::lookup::{EmailPattern, PatternLookup};

/// Used when no pattern is known for the domain.
pub const FALLBACK_PATTERN: &str = "{first}.{last}@{domain}";

/// The pattern applied to a batch of contacts and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedPattern {
    pub pattern: String,
    /// `None` when [`FALLBACK_PATTERN`] was used.
    pub discovered: Option<EmailPattern>,
}

impl AppliedPattern {
    pub fn is_fallback(&self) -> bool {
        self.discovered.is_none()
    }
}

/// Expands `{first}`, `{last}`, `{f}`, `{l}` and `{domain}` in `pattern`.
///
/// Name parts are lower-cased, stripped of whitespace and folded to ASCII. A pattern that
/// yields no `@` gets `@domain` appended.
pub fn generate_email(first: &str, last: &str, domain: &str, pattern: &str) -> String {
    let first = ascii_name_part(first);
    let last = ascii_name_part(last);
    let initial = |part: &str| part.chars().next().map(String::from).unwrap_or_default();

    let email = pattern
        .replace("{first}", &first)
        .replace("{last}", &last)
        .replace("{f}", &initial(&first))
        .replace("{l}", &initial(&last))
        .replace("{domain}", domain);

    if email.contains('@') {
        email
    } else {
        format!("{email}@{domain}")
    }
}

/// First and last whitespace-separated tokens. A single token is used for both.
pub fn split_name(full_name: &str) -> Option<(String, String)> {
    let mut tokens = full_name.split_whitespace();
    let first = tokens.next()?;
    let last = tokens.last().unwrap_or(first);
    Some((first.to_string(), last.to_string()))
}

/// Asks `lookup` for the domain's pattern, falling back to [`FALLBACK_PATTERN`] on absence
/// or failure.
pub fn resolve_pattern(domain: &str, lookup: Option<&dyn PatternLookup>) -> AppliedPattern {
    let discovered = match lookup.map(|lookup| lookup.email_pattern(domain)) {
        Some(Ok(found)) => found,
        Some(Err(err)) => {
            tracing::warn!(domain, error = %err, "pattern lookup failed");
            None
        }
        None => None,
    };

    match discovered {
        Some(found) => AppliedPattern {
            pattern: found.pattern.clone(),
            discovered: Some(found),
        },
        None => {
            tracing::warn!(domain, pattern = FALLBACK_PATTERN, "using fallback email pattern");
            AppliedPattern {
                pattern: FALLBACK_PATTERN.to_string(),
                discovered: None,
            }
        }
    }
}

/// Fills `email` on every contact; names that cannot be parsed get `unknown@domain`.
pub fn generate_for_contacts(
    contacts: &mut [Contact],
    domain: &str,
    lookup: Option<&dyn PatternLookup>,
) -> AppliedPattern {
    let applied = resolve_pattern(domain, lookup);
    for contact in contacts.iter_mut() {
        contact.email = Some(email_for(&contact.name, domain, &applied.pattern));
    }
    applied
}

fn email_for(name: &str, domain: &str, pattern: &str) -> String {
    let unknown = || format!("unknown@{domain}");
    let Some((first, last)) = split_name(name) else {
        tracing::warn!(name, "unable to parse name");
        return unknown();
    };
    if !is_latin_name(name) {
        tracing::debug!(name, "name contains non-Latin letters; they are dropped");
    }
    if ascii_name_part(&first).is_empty() || ascii_name_part(&last).is_empty() {
        tracing::warn!(name, "name has no usable ASCII letters");
        return unknown();
    }
    generate_email(&first, &last, domain, pattern)
}
