/// Absolute frequency bounds the device hardware can tune
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuningRange {
    /// Lowest tunable frequency in Hz
    pub min_frequency: u64,
    /// Highest tunable frequency in Hz
    pub max_frequency: u64,
}

impl TuningRange {
    pub fn new(min_frequency: u64, max_frequency: u64) -> Self {
        Self {
            min_frequency,
            max_frequency,
        }
    }

    /// Check whether a frequency lies inside the range (bounds included)
    pub fn contains(&self, frequency: u64) -> bool {
        self.min_frequency <= frequency && frequency <= self.max_frequency
    }

    /// Check whether an entire span lies inside the range (bounds included)
    pub fn contains_span(&self, span: &ChannelSpan) -> bool {
        self.min_frequency <= span.min_frequency && span.max_frequency <= self.max_frequency
    }
}

/// Frequency interval a consumer wants continuously demodulated
///
/// Spans are plain values; validity (`min < max`, inside the tuning range)
/// is checked at admission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelSpan {
    /// Lower edge in Hz
    pub min_frequency: u64,
    /// Upper edge in Hz
    pub max_frequency: u64,
}

impl ChannelSpan {
    pub fn new(min_frequency: u64, max_frequency: u64) -> Self {
        Self {
            min_frequency,
            max_frequency,
        }
    }

    /// Width of the span in Hz
    pub fn width(&self) -> u64 {
        self.max_frequency.saturating_sub(self.min_frequency)
    }

    /// Center of the span in Hz
    pub fn center(&self) -> u64 {
        self.min_frequency + self.width() / 2
    }

    /// True when the span and the interval `[lo, hi]` share more than a
    /// single endpoint. Endpoint contact does not count as overlap, so a
    /// span sitting flush against a dead zone edge is legal.
    pub fn overlaps(&self, lo: u64, hi: u64) -> bool {
        self.min_frequency < hi && lo < self.max_frequency
    }

    /// True when the span keeps positive clearance from `[lo, hi]`:
    /// strictly below or strictly above, endpoint contact excluded.
    pub fn clears(&self, lo: u64, hi: u64) -> bool {
        self.max_frequency < lo || hi < self.min_frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains_bounds() {
        let range = TuningRange::new(100_000_000, 200_000_000);
        assert!(range.contains(100_000_000));
        assert!(range.contains(200_000_000));
        assert!(range.contains(150_000_000));
        assert!(!range.contains(99_999_999));
        assert!(!range.contains(200_000_001));
    }

    #[test]
    fn test_range_contains_span() {
        let range = TuningRange::new(100_000_000, 200_000_000);
        assert!(range.contains_span(&ChannelSpan::new(100_000_000, 200_000_000)));
        assert!(range.contains_span(&ChannelSpan::new(150_000_000, 150_012_500)));
        assert!(!range.contains_span(&ChannelSpan::new(99_000_000, 100_500_000)));
        assert!(!range.contains_span(&ChannelSpan::new(199_990_000, 200_010_000)));
    }

    #[test]
    fn test_span_width_and_center() {
        let span = ChannelSpan::new(150_100_000, 150_112_500);
        assert_eq!(span.width(), 12_500);
        assert_eq!(span.center(), 150_106_250);
    }

    #[test]
    fn test_overlap_is_strict_at_endpoints() {
        let span = ChannelSpan::new(150_100_000, 150_112_500);

        // Interval ending exactly at the span's lower edge does not overlap
        assert!(!span.overlaps(150_088_000, 150_100_000));
        // Interval starting exactly at the span's upper edge does not overlap
        assert!(!span.overlaps(150_112_500, 150_124_500));
        // One Hz of intrusion on either side does
        assert!(span.overlaps(150_088_000, 150_100_001));
        assert!(span.overlaps(150_112_499, 150_124_500));
        // Interval inside the span overlaps
        assert!(span.overlaps(150_105_000, 150_110_000));
        // Interval containing the span overlaps
        assert!(span.overlaps(150_000_000, 150_200_000));
    }

    #[test]
    fn test_zero_width_interval_at_span_edge_does_not_overlap() {
        let span = ChannelSpan::new(150_100_000, 150_112_500);
        assert!(!span.overlaps(150_100_000, 150_100_000));
        assert!(!span.overlaps(150_112_500, 150_112_500));
    }

    #[test]
    fn test_clears_excludes_endpoint_contact() {
        let span = ChannelSpan::new(150_100_000, 150_112_500);

        assert!(span.clears(150_000_000, 150_099_999));
        assert!(span.clears(150_112_501, 150_200_000));
        // Touching either edge is not clear
        assert!(!span.clears(150_088_000, 150_100_000));
        assert!(!span.clears(150_112_500, 150_124_500));
        assert!(!span.clears(150_105_000, 150_110_000));
    }
}
