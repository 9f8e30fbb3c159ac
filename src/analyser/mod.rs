//! Statistical analysis of tabular data.
//!
//! - [`logic`]: the Jonckheere-Terpstra screening pipeline and its building blocks

pub mod logic;
