//! String utility functions.
//!
//! `underscore` and `pluralize` follow the ActiveSupport-style inflection
//! rules used for deriving database names: foreign keys, join tables, and
//! the aliases of embedded association columns.

use regex::Regex;
use std::sync::OnceLock;

/// Converts a CamelCase name to snake_case.
///
/// Acronym runs are kept together (`HTTPServer` becomes `http_server`),
/// and hyphens are treated as word separators.
///
/// # Examples
///
/// ```
/// use nestql_core::utils::text::underscore;
///
/// assert_eq!(underscore("Post"), "post");
/// assert_eq!(underscore("BlogPost"), "blog_post");
/// assert_eq!(underscore("HTTPServer"), "http_server");
/// ```
pub fn underscore(s: &str) -> String {
    static ACRONYM_BOUNDARY: OnceLock<Regex> = OnceLock::new();
    static WORD_BOUNDARY: OnceLock<Regex> = OnceLock::new();

    let acronym_boundary =
        ACRONYM_BOUNDARY.get_or_init(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").unwrap());
    let word_boundary = WORD_BOUNDARY.get_or_init(|| Regex::new(r"([a-z\d])([A-Z])").unwrap());

    let s = acronym_boundary.replace_all(s, "${1}_${2}");
    let s = word_boundary.replace_all(&s, "${1}_${2}");
    s.replace('-', "_").to_lowercase()
}

/// Returns the plural form of an English word.
///
/// Covers the regular suffix rules plus the irregulars and uncountables
/// that show up in real table names. This is not a full inflection engine;
/// callers with exotic names should supply explicit aliases instead.
///
/// # Examples
///
/// ```
/// use nestql_core::utils::text::pluralize;
///
/// assert_eq!(pluralize("post"), "posts");
/// assert_eq!(pluralize("category"), "categories");
/// assert_eq!(pluralize("person"), "people");
/// ```
pub fn pluralize(word: &str) -> String {
    const IRREGULAR: &[(&str, &str)] = &[
        ("person", "people"),
        ("child", "children"),
        ("man", "men"),
        ("woman", "women"),
        ("mouse", "mice"),
        ("goose", "geese"),
        ("foot", "feet"),
        ("tooth", "teeth"),
    ];
    const UNCOUNTABLE: &[&str] = &[
        "equipment",
        "information",
        "money",
        "news",
        "series",
        "species",
        "sheep",
        "fish",
        "deer",
        "data",
        "metadata",
    ];

    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == lower) {
        return (*plural).to_string();
    }

    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before_y = stem.chars().last();
        let is_vowel = matches!(before_y, Some('a' | 'e' | 'i' | 'o' | 'u'));
        if before_y.is_some() && !is_vowel {
            return format!("{stem}ies");
        }
    }
    if let Some(stem) = word.strip_suffix("fe") {
        return format!("{stem}ves");
    }
    if let Some(stem) = word.strip_suffix('f') {
        return format!("{stem}ves");
    }
    format!("{word}s")
}
