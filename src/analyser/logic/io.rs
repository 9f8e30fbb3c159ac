use super::types::CorrectedResult;
use crate::error::{Result, ResultExt as _};
use polars::prelude::*;
use std::path::Path;

pub const COL_VARIABLE: &str = "Variable";
pub const COL_P_RAW: &str = "P_value_Raw";
pub const COL_FDR: &str = "FDR";
pub const COL_Z: &str = "Z_statistic";
pub const COL_STATISTIC: &str = "JTR_Sum";

/// Cell contents read as missing values, whatever the column type.
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Header of the FDR significance column, e.g. `Sig_FDR (q<0.05)`.
pub fn sig_fdr_column(alpha: f64) -> String {
    format!("Sig_FDR (q<{alpha})")
}

/// Read a CSV file with a header row, inferring column types from every row.
///
/// Cells matching [`MISSING_TOKENS`] are null, so a numeric column with a few
/// `NA` entries still loads as numeric.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, or not valid CSV.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a readable file", path.display()),
        )
        .into());
    }

    let null_values = NullValues::AllColumns(
        MISSING_TOKENS.iter().map(|token| (*token).into()).collect(),
    );
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_null_values(Some(null_values))
        .finish()
        .and_then(LazyFrame::collect)
        .with_context(|| format!("Failed to read CSV {}", path.display()))?;

    tracing::debug!(
        rows = df.height(),
        columns = df.width(),
        "loaded {}",
        path.display()
    );
    Ok(df)
}

/// Build the output table: the fixed column subset, in the order given.
///
/// # Errors
///
/// Returns an error if Polars rejects the columns.
pub fn results_frame(results: &[CorrectedResult], alpha: f64) -> Result<DataFrame> {
    let variables: Vec<&str> = results.iter().map(|r| r.variable.as_str()).collect();
    let p_raw: Vec<f64> = results.iter().map(|r| r.p_value).collect();
    let fdr: Vec<f64> = results.iter().map(|r| r.fdr).collect();
    let sig_fdr: Vec<bool> = results.iter().map(|r| r.significant_fdr).collect();
    let z: Vec<Option<f64>> = results.iter().map(|r| r.z_score).collect();
    let statistic: Vec<f64> = results.iter().map(|r| r.statistic).collect();

    let df = DataFrame::new(vec![
        Column::new(COL_VARIABLE.into(), variables),
        Column::new(COL_P_RAW.into(), p_raw),
        Column::new(COL_FDR.into(), fdr),
        Column::new(sig_fdr_column(alpha).into(), sig_fdr),
        Column::new(COL_Z.into(), z),
        Column::new(COL_STATISTIC.into(), statistic),
    ])?;
    Ok(df)
}

/// Write results to `path` as CSV, truncating any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_results(results: &[CorrectedResult], alpha: f64, path: &Path) -> Result<()> {
    let mut df = results_frame(results, alpha)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut df)
        .context("Failed to write CSV file")?;
    tracing::info!(rows = df.height(), "results written to {}", path.display());
    Ok(())
}
