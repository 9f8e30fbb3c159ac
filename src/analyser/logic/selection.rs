use polars::prelude::*;

/// Numeric columns eligible for trend testing, in file order.
///
/// A column qualifies when its dtype is numeric (booleans and text do not
/// count) and it is neither the grouping column nor the identifier column.
/// The identifier exclusion only applies when `id_column` exists in `df`.
pub fn select_target_columns(df: &DataFrame, group_column: &str, id_column: &str) -> Vec<String> {
    let has_id = df.get_column_index(id_column).is_some();

    df.get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric())
        .map(|col| col.name().as_str())
        .filter(|name| *name != group_column)
        .filter(|name| !(has_id && *name == id_column))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excludes_group_id_and_non_numeric() -> PolarsResult<()> {
        let df = df!(
            "Sample Name" => &[101i64, 102, 103],
            "Group" => &[1i64, 2, 3],
            "label" => &["a", "b", "c"],
            "flag" => &[true, false, true],
            "FeatureA" => &[1.0, 2.0, 3.0],
            "FeatureB" => &[3i32, 2, 1]
        )?;

        let targets = select_target_columns(&df, "Group", "Sample Name");
        assert_eq!(targets, vec!["FeatureA", "FeatureB"]);
        Ok(())
    }

    #[test]
    fn test_absent_id_column_is_ignored() -> PolarsResult<()> {
        let df = df!(
            "SampleID" => &[1i64, 2, 3],
            "Group" => &["L", "M", "H"],
            "FeatureA" => &[1.0, 2.0, 3.0]
        )?;

        // "Sample Name" is not in the file, so the numeric SampleID stays in
        let targets = select_target_columns(&df, "Group", "Sample Name");
        assert_eq!(targets, vec!["SampleID", "FeatureA"]);

        let targets = select_target_columns(&df, "Group", "SampleID");
        assert_eq!(targets, vec!["FeatureA"]);
        Ok(())
    }

    #[test]
    fn test_no_numeric_columns() -> PolarsResult<()> {
        let df = df!(
            "Group" => &["L", "M"],
            "note" => &["x", "y"]
        )?;
        assert!(select_target_columns(&df, "Group", "Sample Name").is_empty());
        Ok(())
    }
}
