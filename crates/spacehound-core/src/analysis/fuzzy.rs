/// Fuzzy subsequence matching for entry names.
///
/// A pattern matches when all of its characters appear in the candidate in
/// order, not necessarily adjacent. Comparison is case-insensitive and
/// works on `char`s, so multi-byte names are never split.
///
/// Scoring, per matched character:
/// - `+1` for the match itself,
/// - `+2` if the previous candidate character was also matched,
/// - `+3` if it starts a word: first character, or preceded by
///   `/`, `\`, `.`, `_` or `-`.

const MATCH: u32 = 1;
const CONSECUTIVE_BONUS: u32 = 2;
const WORD_START_BONUS: u32 = 3;

#[inline]
fn is_word_separator(c: char) -> bool {
    matches!(c, '/' | '\\' | '.' | '_' | '-')
}

/// Lower-case a single character, keeping one `char` per input `char`.
///
/// Multi-char expansions (`İ` -> `i̇`) keep only their first char so
/// character positions, and with them run bonuses, stay intact.
#[inline]
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// A lower-cased pattern, prepared once and scored against many names.
#[derive(Debug, Clone)]
pub struct FuzzyPattern {
    chars: Vec<char>,
}

impl FuzzyPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().map(fold).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Score `candidate`, or `None` if the pattern is not a subsequence.
    ///
    /// The empty pattern matches everything with score 0.
    pub fn score(&self, candidate: &str) -> Option<u32> {
        let mut next = 0;
        let mut score = 0;
        let mut prev: Option<char> = None;
        let mut prev_matched = false;

        for c in candidate.chars().map(fold) {
            if next == self.chars.len() {
                break;
            }
            if c == self.chars[next] {
                score += MATCH;
                if prev_matched {
                    score += CONSECUTIVE_BONUS;
                }
                if prev.map_or(true, is_word_separator) {
                    score += WORD_START_BONUS;
                }
                next += 1;
                prev_matched = true;
            } else {
                prev_matched = false;
            }
            prev = Some(c);
        }

        (next == self.chars.len()).then_some(score)
    }
}

/// One-shot match of `pattern` against `candidate`.
pub fn fuzzy_match(candidate: &str, pattern: &str) -> Option<u32> {
    FuzzyPattern::new(pattern).score(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsequence_matches() {
        let score = fuzzy_match("HelloWorld.txt", "hw").expect("should match");
        // h: 1 + word start 3; w: 1.
        assert_eq!(score, 5);
    }

    #[test]
    fn test_non_subsequence_does_not_match() {
        assert_eq!(fuzzy_match("abc", "xyz"), None);
        assert_eq!(fuzzy_match("abc", "cba"), None);
    }

    #[test]
    fn test_empty_pattern_matches_with_zero() {
        assert_eq!(fuzzy_match("anything", ""), Some(0));
        assert_eq!(fuzzy_match("", ""), Some(0));
    }

    #[test]
    fn test_pattern_longer_than_candidate() {
        assert_eq!(fuzzy_match("ab", "abc"), None);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(fuzzy_match("README.md", "readme"), fuzzy_match("readme.md", "README"));
        assert!(fuzzy_match("ÄPFEL", "äpf").is_some());
    }

    #[test]
    fn test_consecutive_run_scores_higher() {
        let contiguous = fuzzy_match("xlogx", "log").unwrap();
        let scattered = fuzzy_match("xlxoxgx", "log").unwrap();
        // l o g: 1, 1+2, 1+2 vs 1, 1, 1.
        assert_eq!(contiguous, 7);
        assert_eq!(scattered, 3);
    }

    #[test]
    fn test_word_start_bonus_after_separators() {
        for name in ["a.log", "a_log", "a-log", "a/log", "a\\log"] {
            // l: 1 + 3; o: 1 + 2; g: 1 + 2.
            assert_eq!(fuzzy_match(name, "log"), Some(10), "{name}");
        }
        assert_eq!(fuzzy_match("log", "log"), Some(10));
    }

    #[test]
    fn test_multibyte_names() {
        assert_eq!(fuzzy_match("日本語ファイル", "本フ"), Some(2));
        assert!(fuzzy_match("naïve_café", "nc").is_some());
    }

    #[test]
    fn test_expanding_lowercase_keeps_runs_contiguous() {
        // x: 1 + 3; i: 1 + 2; y: 1 + 2.
        assert_eq!(fuzzy_match("xİy", "xiy"), Some(10));
        assert_eq!(fuzzy_match("xiy", "XİY"), Some(10));
    }

    #[test]
    fn test_matching_is_greedy_left_to_right() {
        // The first 'a' is consumed even though a later one starts a word.
        assert_eq!(fuzzy_match("xa_a", "a"), Some(1));
    }
}
