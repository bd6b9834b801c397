// Score policy: pure mapping (passed, total) -> integer percentage.

/// Percentage of passed cases, rounded to the nearest integer (half away
/// from zero). A question with zero cases scores zero.
pub fn score(passed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((passed as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_cases_scores_zero() {
        assert_eq!(score(0, 0), 0);
    }

    #[test]
    fn test_full_marks() {
        assert_eq!(score(1, 1), 100);
        assert_eq!(score(7, 7), 100);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(score(2, 3), 67);
        assert_eq!(score(1, 3), 33);
        assert_eq!(score(1, 2), 50);
        assert_eq!(score(1, 8), 13);
    }

    #[test]
    fn test_always_in_range() {
        for total in 0..=20u32 {
            for passed in 0..=total {
                let s = score(passed, total);
                assert!(s <= 100, "score({}, {}) = {}", passed, total, s);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(score(5, 9), score(5, 9));
    }
}
