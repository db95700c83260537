//! Size accounting: declared upload size vs. extracted text length.

use crate::output::SizeMetrics;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Compare `original_bytes` (the declared upload size, not a re-read) with
/// the UTF-8 length of `converted`.
///
/// An empty upload reports a reduction of 0 rather than dividing by zero.
pub fn measure(original_bytes: u64, converted: &str) -> SizeMetrics {
    let converted_bytes = converted.len() as u64;
    let reduction_percent = if original_bytes == 0 {
        0.0
    } else {
        round_to((1.0 - converted_bytes as f64 / original_bytes as f64) * 100.0, 1)
    };

    SizeMetrics {
        original_bytes,
        converted_bytes,
        original_mb: round_to(original_bytes as f64 / BYTES_PER_MB, 3),
        converted_mb: round_to(converted_bytes as f64 / BYTES_PER_MB, 3),
        reduction_percent,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
