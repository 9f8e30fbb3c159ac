use crate::config::JtSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Trend test result for a single variable, before multiplicity correction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureResult {
    pub variable: String,
    pub statistic: f64,
    /// Absent when the exact null distribution was used.
    pub z_score: Option<f64>,
    pub p_value: f64,
    /// Number of rows that entered the test.
    pub observations: usize,
}

/// A [`FeatureResult`] with its FDR-adjusted p-value and significance flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrectedResult {
    pub variable: String,
    pub statistic: f64,
    pub z_score: Option<f64>,
    pub p_value: f64,
    pub fdr: f64,
    /// Rows that entered the test.
    pub observations: usize,
    /// `p_value < alpha`
    pub significant_raw: bool,
    /// `fdr < alpha`
    pub significant_fdr: bool,
}

impl CorrectedResult {
    pub fn new(result: FeatureResult, fdr: f64, alpha: f64) -> Self {
        Self {
            significant_raw: result.p_value < alpha,
            significant_fdr: fdr < alpha,
            variable: result.variable,
            statistic: result.statistic,
            z_score: result.z_score,
            p_value: result.p_value,
            fdr,
            observations: result.observations,
        }
    }
}

/// Everything needed to run one `jt-test` invocation.
#[derive(Clone, Debug)]
pub struct JtRequest {
    pub csv_file: PathBuf,
    pub group_column: String,
    /// Comma-separated ordered group labels, e.g. `"Low, Medium, High"`.
    pub group_order: String,
    pub settings: JtSettings,
}
