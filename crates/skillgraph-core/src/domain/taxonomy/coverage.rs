//! Coverage percent shared by the tree export and the status report

/// Percent of `required` covered by `proficiency`
///
/// Clamped to `[0, 100]` and rounded to two decimals. A non-positive
/// requirement always yields 0.
pub fn coverage_percent(proficiency: i64, required: i64) -> f64 {
    if required <= 0 {
        return 0.0;
    }
    let ratio = (proficiency as f64 / required as f64 * 100.0).clamp(0.0, 100.0);
    round2(ratio)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
