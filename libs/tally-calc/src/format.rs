//! Canonical text rendering of evaluation results
//!
//! The rendered string is what the ledger persists, so it must be
//! bit-reproducible for a given `f64`:
//!
//! | Value | Rendering |
//! |-------|-----------|
//! | `6.0` | `6` |
//! | `-0.0` | `0` |
//! | `0.1 + 0.2` | `0.30000000000000004` |
//! | `2.5e20` | `250000000000000000000` |
//!
//! Integers within the exactly-representable range go through `itoa`
//! (stack buffer, no float formatting); everything else uses the shortest
//! round-trippable decimal form from `Display`, which never emits an
//! exponent or a trailing `.0`.

/// Largest integer magnitude an `f64` represents exactly (2^53)
pub const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(value as i64).to_string();
    }

    value.to_string()
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_values_have_no_fraction() {
        assert_eq!(format_value(6.0), "6");
        assert_eq!(format_value(-14.0), "-14");
        assert_eq!(format_value(MAX_EXACT_INTEGER), "9007199254740992");
    }

    #[test]
    fn test_negative_zero_normalized() {
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(0.0), "0");
    }

    #[test]
    fn test_shortest_round_trip() {
        let rendered = format_value(0.1 + 0.2);
        assert_eq!(rendered, "0.30000000000000004");
        assert_eq!(rendered.parse::<f64>().unwrap(), 0.1 + 0.2);
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(1.0 / 3.0), "0.3333333333333333");
    }

    #[test]
    fn test_large_integral_without_exponent() {
        assert_eq!(format_value(2.5e20), "250000000000000000000");
    }

    #[test]
    fn test_reproducible() {
        let v = 22.0 / 7.0;
        assert_eq!(format_value(v), format_value(v));
    }
}
