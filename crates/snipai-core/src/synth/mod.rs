//! Turns raw web-search results into scored candidate snippets.
//!
//! No page content is fetched. For each search hit a plausible code body is
//! rendered from a template chosen by the target's language and code
//! signals, tags are pulled from the hit's summary text, and a similarity
//! score is estimated from the hit's rank and its token overlap with the
//! target.
//!
//! The original position of each hit is carried through to its id
//! (`web_{index}`) and rank-based score. Malformed hits are skipped with a
//! warning and keep their index slot.

pub mod templates;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::models::{ScoredCandidate, Snippet, SnippetSource};

pub use templates::{CodeSignals, TemplateContext, TemplateVariant};

const NAME_STOPLIST: &[&str] = &[
    "function",
    "const",
    "class",
    "import",
    "from",
    "this",
    "null",
    "undefined",
];
const NAME_LIMIT: usize = 3;
const DEFAULT_PRIMARY_NAME: &str = "example";
const DEFAULT_SECONDARY_NAME: &str = "helper";

const RESULT_TAG_LIMIT: usize = 4;
const TARGET_TAGS_CARRIED: usize = 2;

const BASE_SCORE: i64 = 85;
const RANK_DECAY: i64 = 5;
const TOKEN_BONUS_CAP: i64 = 10;
const MIN_SCORE: i64 = 30;
const MAX_SCORE: i64 = 95;

static WORD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+").expect("valid regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex"));

/// One search hit after shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchHit {
    /// Accept objects with string `title` and `link`; `snippet` is optional.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let title = object.get("title")?.as_str()?;
        let link = object.get("link")?.as_str()?;
        let snippet = object
            .get("snippet")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(Self {
            title: title.to_string(),
            link: link.to_string(),
            snippet: snippet.to_string(),
        })
    }
}

/// Synthesize one candidate per valid search result, in input order.
pub fn synthesize(target: &Snippet, results: &[Value]) -> Vec<ScoredCandidate> {
    let signals = CodeSignals::detect(&target.code);

    results
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match SearchHit::from_value(value) {
            Some(hit) => Some(synthesize_hit(target, signals, &hit, index)),
            None => {
                tracing::warn!(index, "skipping malformed search result");
                None
            }
        })
        .collect()
}

fn synthesize_hit(
    target: &Snippet,
    signals: CodeSignals,
    hit: &SearchHit,
    index: usize,
) -> ScoredCandidate {
    let domain = extract_domain_name(&hit.link);
    let source_type = determine_source_type(&domain);

    let names = extract_names(&format!("{} {}", hit.title, hit.snippet));
    let primary = names.first().map_or(DEFAULT_PRIMARY_NAME, String::as_str);
    let secondary = names.get(1).map_or(DEFAULT_SECONDARY_NAME, String::as_str);

    let ctx = TemplateContext {
        source_type: &source_type,
        title: &hit.title,
        language: &target.language,
        primary,
        secondary,
        signals,
    };
    let code = TemplateVariant::select(&target.language, signals).render(&ctx);

    let mut tags = extract_result_tags(&hit.snippet, &target.language, &target.tags);
    tags.extend(target.tags.iter().take(TARGET_TAGS_CARRIED).cloned());
    let tags = dedup_preserving_order(tags);

    let similarity_score = calculate_similarity_score(&code, &target.code, index);

    ScoredCandidate {
        snippet: Snippet {
            id: format!("web_{}", index),
            title: hit.title.clone(),
            code,
            language: target.language.clone(),
            description: hit.snippet.clone(),
            tags,
            ai_tags: Vec::new(),
            explanation: String::new(),
            created_at: None,
        },
        similarity_score,
        source: Some(SnippetSource {
            url: hit.link.clone(),
            name: domain,
        }),
        from_web: true,
    }
}

/// Host of `url` with a leading `www.` label removed.
///
/// Unparseable input is returned unchanged; URLs without a host yield `""`.
pub fn extract_domain_name(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            host.strip_prefix("www.").unwrap_or(host).to_string()
        }
        Err(_) => url.to_string(),
    }
}

/// Human label for a result's site.
pub fn determine_source_type(domain: &str) -> String {
    let domain = domain.to_lowercase();
    let label = if domain.contains("github") {
        "GitHub"
    } else if domain.contains("stackoverflow") {
        "Stack Overflow"
    } else if domain.contains("mdn") || domain.contains("mozilla") {
        "MDN Web Docs"
    } else if domain.contains("codepen") {
        "CodePen"
    } else if domain.contains("jsfiddle") {
        "JSFiddle"
    } else if domain.contains("w3schools") {
        "W3Schools"
    } else if domain.contains("dev.to") {
        "Dev.to"
    } else if domain.contains("medium") {
        "Medium"
    } else {
        return domain;
    };
    label.to_string()
}

/// Up to three identifier-like names from `text`, in order of appearance.
///
/// A name is a run of ASCII word characters starting with a letter, longer
/// than three characters and not a common keyword.
pub fn extract_names(text: &str) -> Vec<String> {
    WORD_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|word| word.starts_with(|c: char| c.is_ascii_alphabetic()))
        .filter(|word| word.len() > 3 && !NAME_STOPLIST.contains(word))
        .take(NAME_LIMIT)
        .map(str::to_string)
        .collect()
}

/// Concept words a result summary is probed for, per language.
pub fn concept_vocabulary(language: &str) -> &'static [&'static str] {
    match language {
        "python" => &[
            "list", "dict", "function", "class", "async", "django", "flask", "pandas", "numpy",
            "api",
        ],
        "html" => &["element", "form", "input", "semantic", "layout", "responsive"],
        "css" => &[
            "flexbox",
            "grid",
            "animation",
            "responsive",
            "media-query",
            "selector",
            "variable",
        ],
        "java" => &[
            "class", "method", "interface", "spring", "maven", "hibernate", "awt", "swing",
        ],
        "csharp" => &[
            "class", "method", "linq", "entity", "asp", "dotnet", "xamarin", "wpf",
        ],
        _ => &[
            "array",
            "object",
            "function",
            "promise",
            "async",
            "component",
            "hook",
            "react",
            "vue",
            "angular",
            "node",
            "express",
            "api",
            "dom",
        ],
    }
}

/// Tags for a synthesized result, drawn from its summary text.
///
/// The lowercased language leads the list. When fewer than two tags were
/// found the target's first tag is appended. At most four are returned.
pub fn extract_result_tags(snippet_text: &str, language: &str, target_tags: &[String]) -> Vec<String> {
    let language = language.to_lowercase();
    let text = snippet_text.to_lowercase();

    let mut tags: Vec<String> = concept_vocabulary(&language)
        .iter()
        .filter(|concept| text.contains(*concept))
        .map(|concept| concept.to_string())
        .collect();

    if !tags.contains(&language) {
        tags.insert(0, language);
    }
    if tags.len() < 2 {
        if let Some(first) = target_tags.first() {
            tags.push(first.clone());
        }
    }
    tags.truncate(RESULT_TAG_LIMIT);
    tags
}

fn dedup_preserving_order(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Estimated similarity of a synthesized body to the target code.
///
/// Starts at `85 - 5 * index`, loses 15/10/5 points when the length gap
/// exceeds the target length, half of it, or a quarter of it, gains a point
/// per shared token (at most 10), and is clamped to `30..=95`.
pub fn calculate_similarity_score(mock_code: &str, target_code: &str, index: usize) -> u32 {
    let index = i64::try_from(index).unwrap_or(i64::MAX / RANK_DECAY);
    let base = BASE_SCORE - RANK_DECAY * index;

    let target_len = target_code.chars().count() as f64;
    let length_diff = (mock_code.chars().count() as f64 - target_len).abs();
    let penalty = if length_diff > target_len {
        15
    } else if length_diff > target_len / 2.0 {
        10
    } else if length_diff > target_len / 4.0 {
        5
    } else {
        0
    };

    let target_tokens: HashSet<&str> = tokens(target_code).collect();
    let shared = tokens(mock_code)
        .filter(|token| target_tokens.contains(token))
        .count() as i64;
    let bonus = shared.min(TOKEN_BONUS_CAP);

    (base - penalty + bonus).clamp(MIN_SCORE, MAX_SCORE) as u32
}

fn tokens(code: &str) -> impl Iterator<Item = &str> {
    NON_WORD.split(code).filter(|t| t.len() > 2)
}
