use super::grouping::{GroupOrder, OrderedGroups, filter_by_group_order};
use super::io::{load_csv, save_results};
use super::jonckheere::{Alternative, TrendTest};
use super::report::TrendReport;
use super::selection::select_target_columns;
use super::types::{FeatureResult, JtRequest};
use crate::error::{Result, ResultExt as _, SciToolsError};
use polars::prelude::*;

/// How a `jt-test` run ended. Only fatal problems are errors; an input with
/// nothing to test is a normal outcome.
#[derive(Clone, Debug)]
pub enum JtOutcome {
    /// The filtered data has no numeric column to test.
    NoNumericColumns,
    /// Every selected column was skipped.
    NoResults { tested: Vec<String> },
    /// Results were corrected and written to the output file.
    Completed {
        tested: Vec<String>,
        report: TrendReport,
    },
}

/// Rows and columns of one `jt-test` run, ready for testing.
#[derive(Clone, Debug)]
pub struct JtBatch {
    pub order: GroupOrder,
    pub grouped: OrderedGroups,
    /// Numeric columns that will be tested, in file order.
    pub targets: Vec<String>,
}

/// Load, filter, test every numeric column, correct and write the results.
///
/// Nothing is written unless validation passes and at least one column
/// produced a result.
///
/// # Errors
///
/// See [`prepare_jt_batch`] and [`run_jt_batch`].
pub fn jt_test_flow(request: &JtRequest) -> Result<JtOutcome> {
    let batch = prepare_jt_batch(request)?;
    run_jt_batch(request, batch)
}

/// Validate the request, load the input, keep the listed groups and pick the
/// columns to test. No statistic is computed and nothing is written.
///
/// # Errors
///
/// Returns an error if the settings are invalid, the input cannot be read,
/// the grouping column is missing, or the group order is invalid.
pub fn prepare_jt_batch(request: &JtRequest) -> Result<JtBatch> {
    let settings = &request.settings;
    settings.validate()?;
    let order = GroupOrder::parse(&request.group_order)?;

    let df = load_csv(&request.csv_file)?;
    if df.get_column_index(&request.group_column).is_none() {
        return Err(SciToolsError::MissingColumn(request.group_column.clone()));
    }

    let grouped = filter_by_group_order(&df, &request.group_column, &order)?;
    let targets = select_target_columns(&grouped.df, &request.group_column, &settings.id_column);

    Ok(JtBatch {
        order,
        grouped,
        targets,
    })
}

/// Test every target column of `batch`, correct and write the results.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn run_jt_batch(request: &JtRequest, batch: JtBatch) -> Result<JtOutcome> {
    let settings = &request.settings;
    let JtBatch {
        order,
        grouped,
        targets,
    } = batch;
    if targets.is_empty() {
        tracing::warn!("no numeric columns to analyse");
        return Ok(JtOutcome::NoNumericColumns);
    }
    tracing::info!(
        columns = targets.len(),
        order = ?order.labels(),
        "running Jonckheere-Terpstra tests"
    );

    let test = settings.trend_test();
    let features = test_columns(&grouped, &targets, &test, settings.alternative);
    if features.is_empty() {
        return Ok(JtOutcome::NoResults { tested: targets });
    }

    let report = TrendReport::build(features, settings.fdr_alpha)?;
    save_results(&report.results, settings.fdr_alpha, &settings.output)?;

    Ok(JtOutcome::Completed {
        tested: targets,
        report,
    })
}

/// Run `test` on every column in `columns`. A column that has no usable rows or
/// whose test fails is left out of the returned results.
pub fn test_columns<T: TrendTest + ?Sized>(
    grouped: &OrderedGroups,
    columns: &[String],
    test: &T,
    alternative: Alternative,
) -> Vec<FeatureResult> {
    let mut results = Vec::with_capacity(columns.len());
    for name in columns {
        match test_column(grouped, name, test, alternative) {
            Ok(Some(result)) => {
                tracing::debug!(
                    column = %name,
                    n = result.observations,
                    p = result.p_value,
                    "tested"
                );
                results.push(result);
            }
            Ok(None) => tracing::debug!(column = %name, "skipped: no usable rows"),
            Err(e) => tracing::debug!(column = %name, error = %e, "skipped"),
        }
    }
    results
}

fn test_column<T: TrendTest + ?Sized>(
    grouped: &OrderedGroups,
    name: &str,
    test: &T,
    alternative: Alternative,
) -> Result<Option<FeatureResult>> {
    let (values, codes) = paired_observations(grouped, name)?;
    if values.is_empty() {
        return Ok(None);
    }

    let outcome = test
        .test(&values, &codes, alternative)
        .with_context(|| format!("column {name}"))?;

    Ok(Some(FeatureResult {
        variable: name.to_owned(),
        statistic: outcome.statistic,
        z_score: outcome.z_score,
        p_value: outcome.p_value,
        observations: values.len(),
    }))
}

/// `(value, group code)` pairs of one column, without missing or NaN values.
fn paired_observations(grouped: &OrderedGroups, name: &str) -> Result<(Vec<f64>, Vec<usize>)> {
    let series = grouped
        .df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let (values, codes): (Vec<f64>, Vec<usize>) = series
        .f64()?
        .into_iter()
        .zip(grouped.codes.iter().copied())
        .filter_map(|(value, code)| value.filter(|v| v.is_finite()).map(|v| (v, code)))
        .unzip();
    Ok((values, codes))
}
