//! Multiple testing correction.
//!
//! Screening many variables at once inflates the number of false positives;
//! the Benjamini-Hochberg step-up procedure controls the expected proportion
//! of false discoveries instead.

use crate::error::{Result, SciToolsError};

/// Benjamini-Hochberg FDR correction.
///
/// # Algorithm
///
/// 1. Sort p-values ascending (stable, so equal p-values keep input order).
/// 2. For rank i (1-indexed): qᵢ = pᵢ × m / i, capped at 1.
/// 3. Enforce monotonicity with a cumulative minimum from the largest rank.
///
/// Returns one adjusted value per input, in input order. An empty input gives
/// an empty output.
///
/// # Errors
///
/// Returns [`SciToolsError::InvalidInput`] if any p-value is NaN or outside `[0, 1]`.
///
/// # References
///
/// Benjamini & Hochberg (1995). "Controlling the false discovery rate".
/// JRSS-B, 57(1), 289–300.
pub fn benjamini_hochberg(p_values: &[f64]) -> Result<Vec<f64>> {
    validate_p_values(p_values)?;
    let m = p_values.len();

    let mut indices: Vec<usize> = (0..m).collect();
    indices.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let mf = m as f64;
    let mut adjusted = vec![0.0; m];
    let mut cummin = f64::INFINITY;
    for (rank_rev, &orig_idx) in indices.iter().enumerate().rev() {
        let rank = (rank_rev + 1) as f64;
        let adj = (p_values[orig_idx] * mf / rank).min(1.0);
        cummin = cummin.min(adj);
        adjusted[orig_idx] = cummin;
    }

    Ok(adjusted)
}

fn validate_p_values(p_values: &[f64]) -> Result<()> {
    for (i, &p) in p_values.iter().enumerate() {
        if !(0.0..=1.0).contains(&p) {
            return Err(SciToolsError::InvalidInput(format!(
                "p-value at index {i} is out of range [0, 1]: {p}"
            )));
        }
    }
    Ok(())
}
