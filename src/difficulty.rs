//! Index of difficulty (Shannon formulation)

/// Shannon index of difficulty in bits: `log2(amplitude / width + 1)`
///
/// The result is non-finite for `width == 0`; callers guarantee a positive width.
pub fn shannon_index_of_difficulty(amplitude: f64, width: f64) -> f64 {
    (amplitude / width + 1.0).log2()
}
