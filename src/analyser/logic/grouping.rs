use crate::error::{Result, SciToolsError};
use polars::prelude::*;

/// User-defined ordinal scale of group labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupOrder {
    labels: Vec<String>,
}

impl GroupOrder {
    /// Parse a comma-separated list such as `"Low, Medium,High"`.
    ///
    /// Elements are trimmed and empty elements are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SciToolsError::InvalidInput`] if no label remains or a label repeats.
    pub fn parse(spec: &str) -> Result<Self> {
        let labels: Vec<String> = spec
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_owned)
            .collect();

        if labels.is_empty() {
            return Err(SciToolsError::InvalidInput(
                "group order must name at least one group".to_owned(),
            ));
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(SciToolsError::InvalidInput(format!(
                    "group '{label}' appears more than once in the order"
                )));
            }
        }
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Ordinal code (0-based) of a label, if it is part of the order.
    pub fn code_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

/// Rows kept by the group filter, with the ordinal code of each row.
#[derive(Clone, Debug)]
pub struct OrderedGroups {
    pub df: DataFrame,
    /// `codes[i]` is the position of row `i`'s label in the [`GroupOrder`].
    pub codes: Vec<usize>,
}

/// Keep rows whose `group_column` value is listed in `order` and assign each
/// kept row its ordinal code. Rows with other labels or a missing label are dropped.
///
/// Group cells are compared as text, so a numeric grouping column works with
/// `--order 1,2,3`.
///
/// # Errors
///
/// Returns [`SciToolsError::MissingColumn`] if the column does not exist, or a
/// data processing error if it cannot be rendered as text.
pub fn filter_by_group_order(
    df: &DataFrame,
    group_column: &str,
    order: &GroupOrder,
) -> Result<OrderedGroups> {
    let column = df
        .column(group_column)
        .ok()
        .ok_or_else(|| SciToolsError::MissingColumn(group_column.to_owned()))?;
    let as_text = column
        .as_materialized_series()
        .cast(&DataType::String)?;

    let row_codes: Vec<Option<usize>> = as_text
        .str()?
        .into_iter()
        .map(|cell| cell.and_then(|label| order.code_of(label)))
        .collect();

    let mask: BooleanChunked = row_codes.iter().map(Option::is_some).collect();
    let filtered = df.filter(&mask)?;
    let codes: Vec<usize> = row_codes.into_iter().flatten().collect();

    tracing::info!(
        kept = filtered.height(),
        dropped = df.height() - filtered.height(),
        "filtered rows by group order"
    );

    Ok(OrderedGroups {
        df: filtered,
        codes,
    })
}
