//! Fuzzy ranking of candidates against the live query.

use std::cmp::Ordering;

use crate::domain::model::{Candidate, RankedCandidate};

/// Score granted to every candidate when the query is empty.
pub const EMPTY_QUERY_SCORE: u32 = 1;
const MATCH_POINTS: u32 = 2;
const PREFIX_BONUS: u32 = 5;

/// Score `query` as an ordered, case-insensitive subsequence of `haystack`.
///
/// Each matched character is worth [`MATCH_POINTS`] plus the length of the streak of matches
/// directly before it, so contiguous runs outrank scattered hits. Haystacks that start with
/// the query get a flat bonus on top. Returns `None` when the query is not a subsequence.
pub fn score(query: &str, haystack: &str) -> Option<u32> {
    if query.is_empty() {
        return Some(EMPTY_QUERY_SCORE);
    }

    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    let mut next = 0;
    let mut total = 0;
    let mut streak = 0;

    for ch in haystack.chars().flat_map(char::to_lowercase) {
        if next == needle.len() {
            break;
        }
        if ch == needle[next] {
            total += MATCH_POINTS + streak;
            streak += 1;
            next += 1;
        } else {
            streak = 0;
        }
    }

    if next < needle.len() {
        return None;
    }
    if starts_with_ignore_case(haystack, query) {
        total += PREFIX_BONUS;
    }
    Some(total)
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    let mut hay = haystack.chars().flat_map(char::to_lowercase);
    prefix
        .chars()
        .flat_map(char::to_lowercase)
        .all(|ch| hay.next() == Some(ch))
}

/// Score every candidate, drop rejects and order the rest best-first.
///
/// Equal scores fall back to the candidate name, then kind and path, so the order is total
/// and repeated calls return identical sequences. `limit == 0` keeps every match.
pub fn filter_and_rank<'a>(
    candidates: &'a [Candidate],
    query: &str,
    limit: usize,
) -> Vec<RankedCandidate<'a>> {
    let mut ranked: Vec<RankedCandidate<'a>> = candidates
        .iter()
        .filter_map(|candidate| {
            score(query, &candidate.search_text()).map(|score| RankedCandidate { candidate, score })
        })
        .collect();

    ranked.sort_by(compare_ranked);
    if limit > 0 {
        ranked.truncate(limit);
    }
    ranked
}

fn compare_ranked(a: &RankedCandidate<'_>, b: &RankedCandidate<'_>) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.candidate.name().cmp(b.candidate.name()))
        .then_with(|| a.candidate.kind().cmp(&b.candidate.kind()))
        .then_with(|| a.candidate.path().cmp(&b.candidate.path()))
}
