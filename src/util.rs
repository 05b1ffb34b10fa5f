// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" CSV/number handling so the rest of
// the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    // `?` propagates `None` early if the option is missing. Construction
    // years sometimes arrive as "1967.0", so fall back through f64.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|v| v as i32))
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn median(mut v: Vec<f64>) -> f64 {
    // Median of a list of numbers. We accept `Vec<f64>` by value so the
    // function can sort in-place without cloning at the call site.
    if v.is_empty() {
        return 0.0;
    }
    // Use `partial_cmp` to handle floating-point comparisons and fall back to
    // equality if either side is NaN.
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        v[mid]
    } else {
        (v[mid - 1] + v[mid]) / 2.0
    }
}

/// Min-max scale a batch of values into `[0, hi]`.
///
/// A constant batch (range below epsilon) maps to all zeros; non-finite
/// inputs are treated as zeros. The output is clamped so floating-point
/// noise never leaks past the bounds.
pub fn min_max_scale(values: &[f64], hi: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let (mut min_v, mut max_v) = (f64::MAX, f64::MIN);
    for v in values {
        if v.is_finite() {
            min_v = min_v.min(*v);
            max_v = max_v.max(*v);
        }
    }
    if !min_v.is_finite() || !max_v.is_finite() {
        return vec![0.0; values.len()];
    }
    let range = max_v - min_v;
    values
        .iter()
        .map(|v| {
            if !v.is_finite() || range.abs() < f64::EPSILON {
                0.0
            } else {
                (((v - min_v) / range) * hi).clamp(0.0, hi)
            }
        })
        .collect()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_strips_separators_and_rejects_text() {
        assert_eq!(parse_f64_safe(Some("1,234.5")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("  42 ")), Some(42.0));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parse_i32_accepts_float_formatted_years() {
        assert_eq!(parse_i32_safe(Some("1967")), Some(1967));
        assert_eq!(parse_i32_safe(Some("1967.0")), Some(1967));
        assert_eq!(parse_i32_safe(Some("unknown")), None);
    }

    #[test]
    fn median_handles_even_and_odd_lengths() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(vec![]), 0.0);
    }

    #[test]
    fn min_max_scale_pins_batch_extremes() {
        let scaled = min_max_scale(&[0.2, 0.8, 0.5], 100.0);
        assert_eq!(scaled[0], 0.0);
        assert_eq!(scaled[1], 100.0);
        assert!((scaled[2] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn min_max_scale_constant_batch_is_zero() {
        assert_eq!(min_max_scale(&[0.7, 0.7, 0.7], 100.0), vec![0.0; 3]);
    }

    #[test]
    fn min_max_scale_is_idempotent_on_extremes() {
        let once = min_max_scale(&[10.0, 90.0], 100.0);
        let twice = min_max_scale(&once, 100.0);
        assert_eq!(twice, vec![0.0, 100.0]);
    }
}
