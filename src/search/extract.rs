use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_TITLE: &str = "HR/Recruiting Professional";

const MAX_TITLE_CHARS: usize = 100;
const NAME_CHARS: std::ops::RangeInclusive<usize> = 3..=50;

static PROFILE_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"linkedin\.com/in/([^/?#]+)").expect("profile slug pattern is a valid regex")
});

static TRAILING_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-\d+[a-z]*$").expect("trailing id pattern is a valid regex")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"));

// Tried in order; the first pattern that matches anywhere wins.
static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        "Recruiter",
        "Talent Acquisition",
        "HR Manager",
        "Human Resources",
        "Head of",
        "Director of",
        "VP of",
        "Chief People Officer",
    ]
    .iter()
    .map(|lead| {
        Regex::new(&format!(r"(?i)({lead}[^•|]*)")).expect("title pattern is a valid regex")
    })
    .collect()
});

/// LinkedIn profile queries, most specific first.
pub fn build_search_queries(company: &str, domain: &str) -> Vec<String> {
    vec![
        format!(r#"site:linkedin.com/in "{company}" (Recruiter OR "Talent Acquisition")"#),
        format!(r#"site:linkedin.com/in "{company}" ("HR Manager" OR "Human Resources")"#),
        format!(r#"site:linkedin.com/in "{company}" ("Head of" OR "Director") (HR OR Recruiting)"#),
        format!(r#"site:linkedin.com/in "{domain}" Recruiter"#),
        format!(r#"site:linkedin.com/in "{domain}" "Talent Acquisition""#),
    ]
}

/// `https://www.linkedin.com/in/john-doe-12345` gives `John Doe`.
pub fn extract_name_from_linkedin_url(url: &str) -> Option<String> {
    let slug = PROFILE_SLUG.captures(url)?.get(1)?.as_str();
    let slug = TRAILING_ID.replace(slug, "");

    let name = slug
        .split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    NAME_CHARS.contains(&name.chars().count()).then_some(name)
}

pub fn extract_title_from_snippet(snippet: &str) -> String {
    TITLE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(snippet))
        .and_then(|captures| captures.get(1))
        .map(|found| {
            let collapsed = WHITESPACE.replace_all(found.as_str().trim(), " ");
            collapsed.chars().take(MAX_TITLE_CHARS).collect()
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
