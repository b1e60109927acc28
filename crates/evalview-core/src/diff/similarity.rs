//! Output similarity: a Ratcliff-Obershelp ratio over normalized text.
//!
//! The ratio is `2*M / T` where `M` is the total length of recursively
//! chosen longest matching blocks and `T` the combined length of both
//! inputs — the same quantity a SequenceMatcher reports. Computed on chars,
//! so multi-byte output is handled correctly.

use crate::config::DiffConfig;

/// Similarity of two strings in `[0, 1]`. Equal strings are exactly 1.0.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Similarity of two final outputs after config-driven normalization.
pub fn output_similarity(golden: &str, actual: &str, config: &DiffConfig) -> f64 {
    sequence_ratio(&normalize(golden, config), &normalize(actual, config))
}

/// Collapse whitespace runs and/or lowercase, per config.
pub fn normalize(s: &str, config: &DiffConfig) -> String {
    let s = if config.ignore_whitespace {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        s.to_string()
    };
    if config.ignore_case_in_output {
        s.to_lowercase()
    } else {
        s
    }
}

/// Total matched length across recursively chosen longest matching blocks.
/// Iterative with an explicit worklist so adversarially fragmented inputs
/// cannot exhaust the stack.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut work = vec![(0usize, a.len(), 0usize, b.len())];
    while let Some((alo, ahi, blo, bhi)) = work.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (ai, bi, len) = longest_match(&a[alo..ahi], &b[blo..bhi]);
        if len == 0 {
            continue;
        }
        let (ai, bi) = (alo + ai, blo + bi);
        total += len;
        work.push((alo, ai, blo, bi));
        work.push((ai + len, ahi, bi + len, bhi));
    }
    total
}

/// Longest common substring of `a` and `b`: (start in a, start in b, length).
/// Ties resolve to the earliest match, which keeps the ratio deterministic.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for (i, &ac) in a.iter().enumerate() {
        for (j, &bc) in b.iter().enumerate() {
            cur[j + 1] = if ac == bc { prev[j] + 1 } else { 0 };
            let len = cur[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_is_one() {
        assert_eq!(sequence_ratio("Sunny, 72°F", "Sunny, 72°F"), 1.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_is_zero() {
        assert_eq!(sequence_ratio("abc", "xyz"), 0.0);
        assert_eq!(sequence_ratio("", "xyz"), 0.0);
    }

    #[test]
    fn known_ratio() {
        // Blocks: "bcd" (3 chars) out of 4 + 4 total.
        let r = sequence_ratio("abcd", "bcde");
        assert!((r - 0.75).abs() < 1e-9);
    }

    #[test]
    fn recursive_blocks_accumulate() {
        // "ab" matches, then "d" on each side of the edit.
        let r = sequence_ratio("abXd", "abYd");
        assert!((r - 0.75).abs() < 1e-9);
    }

    #[test]
    fn whitespace_normalization_is_configurable() {
        let cfg = DiffConfig::default();
        assert_eq!(output_similarity("a  b\n c", "a b c", &cfg), 1.0);

        let strict = DiffConfig {
            ignore_whitespace: false,
            ..DiffConfig::default()
        };
        assert!(output_similarity("a  b\n c", "a b c", &strict) < 1.0);
    }

    #[test]
    fn case_folding_is_off_by_default() {
        let cfg = DiffConfig::default();
        assert!(output_similarity("Sunny", "sunny", &cfg) < 1.0);

        let folded = DiffConfig {
            ignore_case_in_output: true,
            ..DiffConfig::default()
        };
        assert_eq!(output_similarity("Sunny", "sunny", &folded), 1.0);
    }

    #[test]
    fn multibyte_chars_are_single_units() {
        let r = sequence_ratio("72°F", "72°C");
        assert!((r - 0.75).abs() < 1e-9);
    }
}
