//! Fuzzy similarity between field names.
//!
//! Names are compared after lower-casing and dropping `_`/`-` separators, so
//! `user_name`, `UserName` and `user-name` are the same name. Non-identical
//! names are scored with the longest-matching-blocks ratio, then raised for
//! containment and for well-known abbreviations.

use crate::utils::normalize_name;

/// Floor applied when one normalized name contains the other.
const CONTAINMENT_FLOOR: f64 = 0.8;
/// Floor applied to a known abbreviation pair.
const ABBREVIATION_FLOOR: f64 = 0.9;

/// Abbreviation pairs, compared on normalized names in either order.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("id", "identifier"),
    ("num", "number"),
    ("qty", "quantity"),
    ("amt", "amount"),
    ("desc", "description"),
    ("addr", "address"),
    ("tel", "telephone"),
    ("email", "emailaddress"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct NameSimilarityScorer;

impl NameSimilarityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Similarity of two field names in `0.0..=1.0`. Symmetric in its arguments.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let a = normalize_name(a);
        let b = normalize_name(b);
        if a == b {
            return 1.0;
        }

        let mut score = block_ratio(&a, &b);

        if !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a)) {
            score = score.max(CONTAINMENT_FLOOR);
        }

        let is_abbreviation = ABBREVIATIONS
            .iter()
            .any(|&(short, long)| (a == short && b == long) || (a == long && b == short));
        if is_abbreviation {
            score = score.max(ABBREVIATION_FLOOR);
        }

        score.clamp(0.0, 1.0)
    }
}

/// `2·M / (len(a) + len(b))` where `M` counts characters covered by the
/// recursively found longest common blocks.
///
/// The block search breaks ties by position, which makes the raw ratio
/// order-sensitive for some inputs. The pair is put in lexicographic order
/// first so `block_ratio(a, b) == block_ratio(b, a)`.
pub(crate) fn block_ratio(a: &str, b: &str) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();
    let total = first.len() + second.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_characters(&first, &second);
    (2 * matched) as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest common run in `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(start_in_a, start_in_b, length)`; among equally long runs the
/// one ending earliest in `a`, then earliest in `b`, wins.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    let width = bhi - blo + 1;
    // run[j - blo + 1] is the length of the run ending at (i, j).
    let mut previous = vec![0usize; width];
    for i in alo..ahi {
        let mut current = vec![0usize; width];
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let size = previous[j - blo] + 1;
            current[j - blo + 1] = size;
            if size > best_size {
                best_i = i + 1 - size;
                best_j = j + 1 - size;
                best_size = size;
            }
        }
        previous = current;
    }
    (best_i, best_j, best_size)
}
