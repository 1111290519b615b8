//! Web-search query construction.
//!
//! A query is assembled from a target snippet in a fixed order:
//!
//! 1. a phrase built from the language and a detected purpose,
//! 2. library names found by per-language substring probes,
//! 3. up to two of the snippet's user tags,
//! 4. up to `max_keywords` frequent identifiers from the code.
//!
//! Empty terms are dropped and the rest are joined with single spaces.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Snippet;

/// Default number of code keywords appended to a query.
pub const DEFAULT_MAX_KEYWORDS: usize = 2;

/// Number of user tags carried into a query.
const QUERY_TAG_LIMIT: usize = 2;

const KEYWORD_STOPLIST: &[&str] = &[
    "function", "const", "let", "var", "return", "if", "else", "for", "while", "class", "this",
    "new", "import", "export", "from", "try", "catch", "async", "await",
];

const SYNTAX_CHARS: &[char] = &[
    '{', '}', '[', ']', '(', ')', ';', '.', ',', '=', '<', '>', '!', '&', '|', '+', '-', '*', '/',
    '%', '^', '~', '#',
];

static IDENTIFIER_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_$]+$").expect("valid regex"));

/// Ordered query terms derived from a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub terms: Vec<String>,
}

impl SearchQuery {
    /// The query string sent to the search collaborator.
    pub fn render(&self) -> String {
        self.terms.join(" ")
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Build the web-search query for `snippet`.
pub fn build_search_query(snippet: &Snippet, max_keywords: usize) -> SearchQuery {
    let purpose = detect_purpose(&snippet.code);
    let phrase = match purpose {
        Some(p) => format!("{} code for {}", snippet.language, p),
        None => format!("{} code example", snippet.language),
    };

    let mut terms = vec![phrase];
    terms.extend(
        detect_libraries(&snippet.code, &snippet.language)
            .into_iter()
            .map(str::to_string),
    );
    terms.extend(snippet.tags.iter().take(QUERY_TAG_LIMIT).cloned());
    terms.extend(extract_keywords(&snippet.code, max_keywords));
    terms.retain(|t| !t.is_empty());

    SearchQuery { terms }
}

/// Library and framework names referenced by `code`, probed per language.
pub fn detect_libraries(code: &str, language: &str) -> Vec<&'static str> {
    let mut libraries = Vec::new();
    match language {
        "python" => {
            if code.contains("import whisper") {
                libraries.push("whisper");
            }
            if code.contains("import pandas") {
                libraries.push("pandas");
            }
            if code.contains("import numpy") {
                libraries.push("numpy");
            }
            if code.contains("import tensorflow") || code.contains("import torch") {
                libraries.push("machine learning");
            }
        }
        "javascript" => {
            if code.contains("React") {
                libraries.push("React");
            }
            if code.contains("useState") || code.contains("useEffect") {
                libraries.push("React hooks");
            }
            if code.contains("express") {
                libraries.push("Express.js");
            }
            if code.contains("mongoose") {
                libraries.push("MongoDB");
            }
        }
        _ => {}
    }
    libraries
}

/// The intent label for `code`.
///
/// Every probe runs; a later match replaces an earlier one.
pub fn detect_purpose(code: &str) -> Option<&'static str> {
    let mut purpose = None;
    if code.contains("transcribe") {
        purpose = Some("transcription");
    }
    if code.contains("translate") {
        purpose = Some("translation");
    }
    if code.contains("analyze") || code.contains("process") {
        purpose = Some("data processing");
    }
    if code.contains("render") || (code.contains("return") && code.contains('<')) {
        purpose = Some("rendering UI");
    }
    purpose
}

/// The `max_keywords` most frequent identifier-like words in `code`.
///
/// Words must be longer than three characters and not common language
/// keywords. Ties keep first-appearance order.
pub fn extract_keywords(code: &str, max_keywords: usize) -> Vec<String> {
    let cleaned: String = code
        .chars()
        .map(|c| if SYNTAX_CHARS.contains(&c) { ' ' } else { c })
        .collect();

    let mut order: Vec<&str> = Vec::new();
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for word in cleaned.split_whitespace() {
        if word.chars().count() <= 3
            || KEYWORD_STOPLIST.contains(&word.to_lowercase().as_str())
            || !IDENTIFIER_WORD.is_match(word)
        {
            continue;
        }
        let count = frequency.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    // Stable sort keeps first-appearance order among equal counts.
    order.sort_by(|a, b| frequency[b].cmp(&frequency[a]));
    order
        .into_iter()
        .take(max_keywords)
        .map(str::to_string)
        .collect()
}
