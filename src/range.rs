//! Inclusive integer range lists such as `1-6,9`.

use std::fmt;

use tracing::debug;

/// A set of inclusive integer intervals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeSet {
    ranges: Vec<(i32, i32)>,
}

impl RangeSet {
    /// Parse a comma-separated list of `n` or `lo-hi` tokens.
    ///
    /// Malformed tokens are skipped. A reversed pair is normalised so that
    /// `5-2` covers 2 through 5.
    pub fn parse(text: &str) -> Self {
        let mut ranges = Vec::new();
        for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match parse_token(token) {
                Some(range) => ranges.push(range),
                None => debug!(token, "skipping malformed range token"),
            }
        }
        Self { ranges }
    }

    pub fn contains(&self, n: i32) -> bool {
        self.ranges.iter().any(|&(lo, hi)| lo <= n && n <= hi)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[(i32, i32)] {
        &self.ranges
    }

    /// Every member, ascending. Overlapping intervals are reported once.
    pub fn values(&self) -> Vec<i32> {
        let mut out: Vec<i32> = self.ranges.iter().flat_map(|&(lo, hi)| lo..=hi).collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Parse a single `n` or `lo-hi` token. A leading minus is a sign, not a
/// separator.
fn parse_token(token: &str) -> Option<(i32, i32)> {
    let split_at = token
        .char_indices()
        .skip(1)
        .find(|&(_, ch)| ch == '-')
        .map(|(idx, _)| idx);
    match split_at {
        Some(idx) => {
            let lo: i32 = token[..idx].trim().parse().ok()?;
            let hi: i32 = token[idx + 1..].trim().parse().ok()?;
            Some((lo.min(hi), lo.max(hi)))
        }
        None => {
            let n: i32 = token.parse().ok()?;
            Some((n, n))
        }
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (lo, hi)) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if lo == hi {
                write!(f, "{lo}")?;
            } else {
                write!(f, "{lo}-{hi}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_contains() {
        let set = RangeSet::parse("1-3,5");
        assert!(set.contains(2));
        assert!(!set.contains(4));
        assert!(set.contains(5));
        assert!(set.contains(1));
        assert!(set.contains(3));
        assert!(!set.contains(0));
    }

    #[test]
    fn test_default_adjacency_count() {
        let set = RangeSet::parse("1-6");
        assert!(!set.contains(0));
        assert!((1..=6).all(|n| set.contains(n)));
        assert!(!set.contains(7));
    }

    #[test]
    fn test_malformed_tokens_are_skipped() {
        let set = RangeSet::parse("2, abc, 4-x, 7-9");
        assert_eq!(set.ranges(), &[(2, 2), (7, 9)]);
        assert!(RangeSet::parse("").is_empty());
    }

    #[test]
    fn test_reversed_and_negative_ranges() {
        let set = RangeSet::parse("5-2,-3");
        assert!(set.contains(3));
        assert!(set.contains(-3));
        assert!(!set.contains(-2));
        assert_eq!(set.to_string(), "2-5,-3");
    }

    #[test]
    fn test_values_dedup() {
        assert_eq!(RangeSet::parse("3-4,1,4-5").values(), vec![1, 3, 4, 5]);
    }
}
