use std::borrow::Cow;

use phf::phf_map;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use unicode_script::{Script, UnicodeScript};

// Letters NFKD does not decompose into ASCII, plus the common precomposed ones.
const LETTER_MAP: phf::Map<char, &'static str> = phf_map! {
    'à' => "a", 'á' => "a", 'â' => "a", 'ä' => "a", 'ã' => "a", 'å' => "a",
    'ç' => "c",
    'è' => "e", 'é' => "e", 'ê' => "e", 'ë' => "e",
    'ì' => "i", 'í' => "i", 'î' => "i", 'ï' => "i",
    'ñ' => "n",
    'ò' => "o", 'ó' => "o", 'ô' => "o", 'ö' => "o", 'õ' => "o",
    'ù' => "u", 'ú' => "u", 'û' => "u", 'ü' => "u",
    'ÿ' => "y",
    'œ' => "oe", 'æ' => "ae",
    'ø' => "o", 'ß' => "ss", 'ł' => "l", 'đ' => "d", 'ð' => "d", 'þ' => "th", 'ı' => "i",
};

/// Lower-cases `name` and reduces it to characters usable in a local part.
///
/// Accented Latin letters are folded to ASCII; whitespace, punctuation other than `.`, `-`
/// and `_`, and letters from other scripts are dropped.
pub fn ascii_name_part(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().to_lowercase().chars() {
        if let Some(folded) = fold_char(ch) {
            out.extend(
                folded
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')),
            );
        }
    }
    out
}

/// `true` when every letter of `name` is Latin script.
pub fn is_latin_name(name: &str) -> bool {
    name.chars().all(|ch| {
        matches!(
            ch.script(),
            Script::Latin | Script::Common | Script::Inherited | Script::Unknown
        )
    })
}

fn fold_char(ch: char) -> Option<Cow<'static, str>> {
    if ch.is_ascii() {
        return Some(Cow::Owned(ch.to_string()));
    }
    if is_combining_mark(ch) {
        return None;
    }
    if let Some(repl) = LETTER_MAP.get(&ch) {
        return Some(Cow::Borrowed(repl));
    }

    let decomposed: String = ch
        .to_string()
        .nfkd()
        .filter(|d| !is_combining_mark(*d) && d.is_ascii())
        .collect();
    (!decomposed.is_empty()).then_some(Cow::Owned(decomposed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_accents() {
        assert_eq!(ascii_name_part("José"), "jose");
        assert_eq!(ascii_name_part("Françoise"), "francoise");
        assert_eq!(ascii_name_part("Jürgen"), "jurgen");
        assert_eq!(ascii_name_part("Ørsted"), "orsted");
        assert_eq!(ascii_name_part("Łukasz"), "lukasz");
        assert_eq!(ascii_name_part("Strauß"), "strauss");
    }

    #[test]
    fn decomposed_input_is_folded() {
        assert_eq!(ascii_name_part("Rene\u{301}e"), "renee");
    }

    #[test]
    fn strips_spaces_and_punctuation() {
        assert_eq!(ascii_name_part("  Van Der Berg "), "vanderberg");
        assert_eq!(ascii_name_part("O'Brien"), "obrien");
        assert_eq!(ascii_name_part("Jean-Paul"), "jean-paul");
    }

    #[test]
    fn other_scripts_are_dropped() {
        assert!(!is_latin_name("Иван"));
        assert_eq!(ascii_name_part("Иван"), "");
        assert!(is_latin_name("Zoë O'Neil"));
    }
}
