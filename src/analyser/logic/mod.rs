//! Trend-screening pipeline: load, filter by group order, select columns,
//! test each column, correct for multiplicity, report.

pub mod correction;
pub mod flows;
pub mod grouping;
pub mod io;
pub mod jonckheere;
pub mod report;
pub mod selection;
pub mod types;

pub use correction::benjamini_hochberg;
pub use flows::{
    JtBatch, JtOutcome, jt_test_flow, prepare_jt_batch, run_jt_batch, test_columns,
};
pub use grouping::{GroupOrder, OrderedGroups, filter_by_group_order};
pub use io::{
    COL_FDR, COL_P_RAW, COL_STATISTIC, COL_VARIABLE, COL_Z, MISSING_TOKENS, load_csv, results_frame,
    save_results, sig_fdr_column,
};
pub use jonckheere::{Alternative, JonckheereTerpstra, TestMethod, TrendOutcome, TrendTest};
pub use report::TrendReport;
pub use selection::select_target_columns;
pub use types::{CorrectedResult, FeatureResult, JtRequest};
