//! Floating point precision handling
//!
//! Precision is a presentation policy: decoding always produces the full
//! `f64`, and the number of decimal places is only applied when a value is
//! turned into text.

/// Determine appropriate decimal places from scale factor
///
/// # Examples
/// - scale 1.0 → 0 decimal places (integers)
/// - scale 0.1 → 1 decimal place
/// - scale 0.02 → 2 decimal places
/// - scale 0.25 → 2 decimal places (1/4 needs 2 places)
pub fn precision_from_scale(scale: f64) -> u8 {
    let abs_scale = scale.abs();

    if abs_scale == 0.0 || !abs_scale.is_finite() {
        return 4;
    }

    if abs_scale >= 1.0 {
        return 0;
    }

    // Scale by 10 until we get an integer (or close enough)
    let mut temp = abs_scale;
    let mut precision = 0u8;

    while precision < 6 {
        if (temp - temp.round()).abs() < 1e-9 {
            break;
        }
        temp *= 10.0;
        precision += 1;
    }

    precision
}

/// Format a value with a fixed number of decimal places
///
/// `format_value(14.700000000000001, 1)` gives `"14.7"`.
pub fn format_value(value: f64, precision: u8) -> String {
    format!("{:.*}", precision as usize, value)
}
