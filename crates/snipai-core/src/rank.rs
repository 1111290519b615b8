//! Local similarity ranking and result merging.
//!
//! # Local Scoring
//!
//! Each candidate is scored against the target:
//!
//! | Signal | Points |
//! |--------|--------|
//! | Same language (exact) | +30 |
//! | Each target tag present in the candidate's tags | +10 |
//! | Each target AI tag present in the candidate's AI tags | +15 |
//! | Code lengths differ by fewer than 50 chars | +10 |
//!
//! Tag matches count with the multiplicity of the target's list, so a
//! duplicated target tag earns its bonus twice. Candidates scoring at or
//! below [`LOCAL_SCORE_THRESHOLD`] are dropped, the rest are stable-sorted
//! by score (descending) and truncated to [`LOCAL_RESULT_LIMIT`].
//!
//! # Merging
//!
//! [`merge`] takes up to [`MERGE_TAKE_PER_SOURCE`] entries from each side,
//! concatenates local then external, and stable-sorts by score.

use crate::models::{ScoredCandidate, Snippet};

/// Candidates must score strictly above this to be returned.
pub const LOCAL_SCORE_THRESHOLD: u32 = 20;
/// Maximum number of local results.
pub const LOCAL_RESULT_LIMIT: usize = 3;
/// Entries taken from each side before merging.
pub const MERGE_TAKE_PER_SOURCE: usize = 3;

const LANGUAGE_BONUS: u32 = 30;
const TAG_BONUS: u32 = 10;
const AI_TAG_BONUS: u32 = 15;
const LENGTH_BONUS: u32 = 10;
const LENGTH_WINDOW: usize = 50;

/// Similarity of `candidate` to `target`.
pub fn score_candidate(target: &Snippet, candidate: &Snippet) -> u32 {
    let mut score = 0;

    if candidate.language == target.language {
        score += LANGUAGE_BONUS;
    }

    score += TAG_BONUS * shared_count(&target.tags, &candidate.tags);
    score += AI_TAG_BONUS * shared_count(&target.ai_tags, &candidate.ai_tags);

    let target_len = target.code.chars().count();
    let candidate_len = candidate.code.chars().count();
    if target_len.abs_diff(candidate_len) < LENGTH_WINDOW {
        score += LENGTH_BONUS;
    }

    score
}

/// Number of entries in `target` (with repeats) that appear in `candidate`.
fn shared_count(target: &[String], candidate: &[String]) -> u32 {
    target.iter().filter(|tag| candidate.contains(tag)).count() as u32
}

/// Rank stored snippets against `target`.
///
/// The target itself (matched by id) is never included.
pub fn rank_local(target: &Snippet, candidates: &[Snippet]) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .filter(|c| c.id != target.id)
        .map(|c| ScoredCandidate::local(c.clone(), score_candidate(target, c)))
        .filter(|c| c.similarity_score > LOCAL_SCORE_THRESHOLD)
        .collect();

    sort_by_score(&mut scored);
    scored.truncate(LOCAL_RESULT_LIMIT);
    scored
}

/// Combine local and external results into one ranked list of at most six.
pub fn merge(local: &[ScoredCandidate], external: &[ScoredCandidate]) -> Vec<ScoredCandidate> {
    let mut combined: Vec<ScoredCandidate> = local
        .iter()
        .take(MERGE_TAKE_PER_SOURCE)
        .chain(external.iter().take(MERGE_TAKE_PER_SOURCE))
        .cloned()
        .collect();
    sort_by_score(&mut combined);
    combined
}

/// Descending by score; `sort_by` is stable so ties keep input order.
fn sort_by_score(items: &mut [ScoredCandidate]) {
    items.sort_by(|a, b| b.similarity_score.cmp(&a.similarity_score));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(id: &str, language: &str, code: &str, tags: &[&str], ai_tags: &[&str]) -> Snippet {
        Snippet {
            id: id.to_string(),
            title: format!("Snippet {}", id),
            code: code.to_string(),
            language: language.to_string(),
            description: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ai_tags: ai_tags.iter().map(|t| t.to_string()).collect(),
            explanation: String::new(),
            created_at: None,
        }
    }

    fn scored(id: &str, score: u32) -> ScoredCandidate {
        ScoredCandidate::local(snippet(id, "python", "", &[], &[]), score)
    }

    fn ids(items: &[ScoredCandidate]) -> Vec<&str> {
        items.iter().map(|c| c.snippet.id.as_str()).collect()
    }

    #[test]
    fn test_list_comprehension_scenario() {
        let target = snippet(
            "target",
            "python",
            "squares = [x**2 for x in range(10) if x % 2 == 0]",
            &["list"],
            &["list", "loop"],
        );
        let candidate = snippet(
            "c",
            "python",
            "evens = [n for n in range(20) if n % 2 == 0]",
            &["list", "comprehension"],
            &["list", "loop", "algorithm"],
        );
        let score = score_candidate(&target, &candidate);
        assert!(score >= 65, "score was {}", score);
        assert_eq!(score, 30 + 10 + 30 + 10);
    }

    #[test]
    fn test_exact_formula_with_identical_sets() {
        let target = snippet("t", "javascript", "abc", &["a", "b"], &["x", "y", "z"]);
        let candidate = snippet("c", "javascript", "abcdef", &["a", "b"], &["x", "y", "z"]);
        assert_eq!(score_candidate(&target, &candidate), 30 + 10 * 2 + 15 * 3 + 10);
    }

    #[test]
    fn test_language_match_is_case_sensitive() {
        let target = snippet("t", "python", "", &[], &[]);
        let candidate = snippet("c", "Python", &"x".repeat(100), &[], &[]);
        assert_eq!(score_candidate(&target, &candidate), 0);
    }

    #[test]
    fn test_duplicate_target_tags_multiply_bonus() {
        let target = snippet("t", "go", "", &["web", "web"], &["api", "api"]);
        let candidate = snippet("c", "rust", &"x".repeat(60), &["web"], &["api"]);
        assert_eq!(score_candidate(&target, &candidate), 20 + 30);
    }

    #[test]
    fn test_length_window_is_exclusive() {
        let target = snippet("t", "go", "", &[], &[]);
        let near = snippet("a", "rust", &"x".repeat(49), &[], &[]);
        let far = snippet("b", "rust", &"x".repeat(50), &[], &[]);
        assert_eq!(score_candidate(&target, &near), 10);
        assert_eq!(score_candidate(&target, &far), 0);
    }

    #[test]
    fn test_rank_local_excludes_target_and_applies_threshold() {
        let target = snippet("t", "python", "print(1)", &[], &[]);
        let candidates = vec![
            target.clone(),
            snippet("same-lang", "python", "print(2)", &[], &[]),
            snippet("only-length", "ruby", "puts 1", &[], &[]),
        ];
        let ranked = rank_local(&target, &candidates);
        assert_eq!(ids(&ranked), vec!["same-lang"]);
        assert_eq!(ranked[0].similarity_score, 40);
        assert!(!ranked[0].from_web);
    }

    #[test]
    fn test_rank_local_limits_and_sorts() {
        let target = snippet("t", "python", "x", &["a"], &["b"]);
        let candidates = vec![
            snippet("lang", "python", "y", &[], &[]),
            snippet("lang-tag", "python", "y", &["a"], &[]),
            snippet("lang-ai", "python", "y", &[], &["b"]),
            snippet("all", "python", "y", &["a"], &["b"]),
            snippet("lang-2", "python", "y", &[], &[]),
        ];
        let ranked = rank_local(&target, &candidates);
        assert_eq!(ids(&ranked), vec!["all", "lang-ai", "lang-tag"]);
        for pair in ranked.windows(2) {
            assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
        assert!(ranked.iter().all(|c| c.similarity_score > LOCAL_SCORE_THRESHOLD));
    }

    #[test]
    fn test_rank_local_ties_keep_input_order() {
        let target = snippet("t", "python", "x", &[], &[]);
        let candidates = vec![
            snippet("first", "python", "y", &[], &[]),
            snippet("second", "python", "y", &[], &[]),
            snippet("third", "python", "y", &[], &[]),
            snippet("fourth", "python", "y", &[], &[]),
        ];
        let ranked = rank_local(&target, &candidates);
        assert_eq!(ids(&ranked), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_local_empty() {
        let target = snippet("t", "python", "x", &[], &[]);
        assert!(rank_local(&target, &[]).is_empty());
    }

    #[test]
    fn test_merge_caps_each_side_and_sorts() {
        let local = vec![scored("l1", 80), scored("l2", 50), scored("l3", 40), scored("l4", 30)];
        let external = vec![
            scored("w1", 85),
            scored("w2", 50),
            scored("w3", 35),
            scored("w4", 99),
        ];
        let merged = merge(&local, &external);
        assert_eq!(merged.len(), 6);
        assert_eq!(ids(&merged), vec!["w1", "l1", "l2", "w2", "l3", "w3"]);
    }

    #[test]
    fn test_merge_with_empty_external_is_local() {
        let local = vec![scored("l1", 80), scored("l2", 50)];
        assert_eq!(merge(&local, &[]), local);
    }
}
