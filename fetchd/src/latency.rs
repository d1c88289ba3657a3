/// Upper bound for a reported latency. An attempt cannot outlive its own timeout.
pub const LATENCY_CEILING_SECS: f64 = 5.0;

/// Rounds a measured latency (seconds) half-up at the resolution given by `precision`.
///
/// Latencies above [`LATENCY_CEILING_SECS`] are clamped to exactly the ceiling.
/// A negative `precision` is applied as-is, which flips the rounding direction.
pub fn normalize(elapsed: f64, precision: f64) -> f64 {
    if elapsed > LATENCY_CEILING_SECS {
        return LATENCY_CEILING_SECS;
    }
    (elapsed * precision + 0.5).floor() / precision
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_rounds_to_precision() {
        let cases = [
            (0.56642, 100.0, 0.57),
            (3.3423, 1000.0, 3.342),
            (4.56642, -10.0, 4.6),
            (5.012, 10.0, 5.0),
            (54.764534, -1000.0, 5.0),
        ];

        for (elapsed, precision, expected) in cases {
            assert_eq!(
                normalize(elapsed, precision),
                expected,
                "normalize({}, {})",
                elapsed,
                precision
            );
        }
    }

    #[test]
    fn test_normalize_clamps_above_ceiling() {
        for elapsed in [5.0000001_f64, 5.5, 6.0, 120.0, f64::MAX] {
            for precision in [1.0_f64, 10.0, 1000.0, 0.5] {
                assert_eq!(normalize(elapsed, precision), LATENCY_CEILING_SECS);
            }
        }
    }

    #[test]
    fn test_normalize_matches_formula_at_or_below_ceiling() {
        for elapsed in [0.0_f64, 0.0004, 0.3, 1.23456, 4.9999, 5.0] {
            for precision in [1000.0_f64, 100.0, -10.0, 3.0] {
                let expected = (elapsed * precision + 0.5).floor() / precision;
                assert_eq!(normalize(elapsed, precision).to_bits(), expected.to_bits());
            }
        }
    }
}
