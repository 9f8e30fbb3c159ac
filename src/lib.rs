//! # sci-tools - trend screening for tabular data
//!
//! Runs a Jonckheere-Terpstra trend test on every numeric column of a CSV file
//! across a user-ordered grouping, controls the false discovery rate with the
//! Benjamini-Hochberg procedure, and writes the annotated results to CSV.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sci_tools::analyser::logic::{JtOutcome, JtRequest, jt_test_flow};
//! use sci_tools::config::JtSettings;
//!
//! # fn example() -> sci_tools::error::Result<()> {
//! let request = JtRequest {
//!     csv_file: "samples.csv".into(),
//!     group_column: "Dose".to_owned(),
//!     group_order: "Low,Medium,High".to_owned(),
//!     settings: JtSettings::default(),
//! };
//!
//! if let JtOutcome::Completed { report, .. } = jt_test_flow(&request)? {
//!     for line in report.summary_lines() {
//!         println!("{line}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`analyser`]: the screening pipeline
//!   - [`analyser::logic::jonckheere`]: the trend test behind the [`analyser::logic::TrendTest`] trait
//!   - [`analyser::logic::correction`]: Benjamini-Hochberg adjustment
//! - [`config`]: settings for a run, optionally read from JSON
//! - [`error`]: error types and handling utilities
//! - [`logging`]: `tracing` subscriber setup

#![warn(clippy::all, rust_2018_idioms)]

pub mod analyser;
pub mod config;
pub mod error;
pub mod logging;
