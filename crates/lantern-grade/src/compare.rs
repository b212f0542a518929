use serde::{Deserialize, Serialize};

/// How an artifact is matched against its golden reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Every expected line must equal the corresponding actual line, in
    /// order, with the same total length.
    Exact,
    /// Every expected line must appear in the actual lines, in order, not
    /// necessarily contiguous.
    Subsequence,
}

/// Exact-sequence equality.
pub fn exact_match(expected: &[String], actual: &[String]) -> bool {
    expected == actual
}

/// Ordered-subsequence containment: advance a cursor over `actual` looking
/// for the next unmatched expected line.
///
/// Returns the index of the first expected line that could not be matched,
/// or `None` when every expected line was found in order.
pub fn subsequence_unmatched(expected: &[String], actual: &[String]) -> Option<usize> {
    let mut cursor = actual.iter();
    for (idx, want) in expected.iter().enumerate() {
        if !cursor.any(|got| got == want) {
            return Some(idx);
        }
    }
    None
}

/// Check an artifact against a golden under the given mode.
pub fn matches(mode: MatchMode, expected: &[String], actual: &[String]) -> bool {
    match mode {
        MatchMode::Exact => exact_match(expected, actual),
        MatchMode::Subsequence => subsequence_unmatched(expected, actual).is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_equal_passes() {
        let a = lines(&["A", "B", "C"]);
        assert!(exact_match(&a, &a.clone()));
    }

    #[test]
    fn test_exact_single_difference_fails() {
        let expected = lines(&["A", "B", "C"]);
        let actual = lines(&["A", "X", "C"]);
        assert!(!exact_match(&expected, &actual));
    }

    #[test]
    fn test_exact_length_mismatch_fails() {
        let expected = lines(&["A", "B"]);
        let actual = lines(&["A", "B", "C"]);
        assert!(!exact_match(&expected, &actual));
    }

    #[test]
    fn test_subsequence_with_gaps_passes() {
        let expected = lines(&["A", "B"]);
        let actual = lines(&["X", "A", "Y", "B", "Z"]);
        assert_eq!(subsequence_unmatched(&expected, &actual), None);
    }

    #[test]
    fn test_subsequence_out_of_order_fails() {
        let expected = lines(&["A", "B"]);
        let actual = lines(&["B", "A"]);
        assert_eq!(subsequence_unmatched(&expected, &actual), Some(1));
    }

    #[test]
    fn test_subsequence_empty_expected_passes() {
        let actual = lines(&["anything"]);
        assert_eq!(subsequence_unmatched(&[], &actual), None);
    }

    #[test]
    fn test_subsequence_reports_first_unmatched() {
        let expected = lines(&["A", "B", "C"]);
        let actual = lines(&["A"]);
        assert_eq!(subsequence_unmatched(&expected, &actual), Some(1));
    }
}
