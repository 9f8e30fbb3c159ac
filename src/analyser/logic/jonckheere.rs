//! Jonckheere-Terpstra test for an ordered alternative.
//!
//! The pipeline only talks to the [`TrendTest`] trait: values, ordinal group
//! codes and a direction go in, a [`TrendOutcome`] comes out. Everything about
//! how the statistic and its null distribution are computed stays in this file.
//!
//! # Examples
//!
//! ```
//! use sci_tools::analyser::logic::jonckheere::{Alternative, JonckheereTerpstra, TrendTest as _};
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let groups = [0, 0, 1, 1, 2, 2];
//! let outcome = JonckheereTerpstra::default()
//!     .test(&values, &groups, Alternative::Increasing)
//!     .unwrap();
//! assert_eq!(outcome.statistic, 12.0);
//! assert!(outcome.z_score.is_none()); // small sample without ties: exact distribution
//! assert!(outcome.p_value < 0.05);
//! ```

use crate::error::{Result, SciToolsError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF as _, Normal};
use std::fmt;
use std::str::FromStr;

/// Largest sample for which `TestMethod::Auto` uses the exact null distribution.
pub const EXACT_AUTO_LIMIT: usize = 100;

/// Largest sample for which `TestMethod::Exact` is honoured.
///
/// Building the exact tables for groups of sizes m and n takes about
/// (m·n)²/4 multiply-adds, so two groups of 100 cost 2.5·10⁷ per column.
pub const EXACT_HARD_LIMIT: usize = 200;

// ---------------------------------------------------------------------------
// Direction and method
// ---------------------------------------------------------------------------

/// Direction of the trend under the alternative hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Alternative {
    /// Values shift in either direction along the group order.
    #[default]
    TwoSided,
    /// Values increase along the group order.
    Increasing,
    /// Values decrease along the group order.
    Decreasing,
}

/// Every accepted spelling and the direction it selects.
const ALTERNATIVE_NAMES: &[(&str, Alternative)] = &[
    ("two_sided", Alternative::TwoSided),
    ("two-sided", Alternative::TwoSided),
    ("greater", Alternative::Increasing),
    ("increasing", Alternative::Increasing),
    ("less", Alternative::Decreasing),
    ("decreasing", Alternative::Decreasing),
];

impl Alternative {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwoSided => "two_sided",
            Self::Increasing => "greater",
            Self::Decreasing => "less",
        }
    }
}

impl FromStr for Alternative {
    type Err = SciToolsError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        ALTERNATIVE_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, alternative)| *alternative)
            .ok_or_else(|| {
                let accepted: Vec<&str> = ALTERNATIVE_NAMES.iter().map(|(name, _)| *name).collect();
                SciToolsError::InvalidInput(format!(
                    "unknown alternative '{s}', expected one of: {}",
                    accepted.join(", ")
                ))
            })
    }
}

impl TryFrom<String> for Alternative {
    type Error = SciToolsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Alternative> for String {
    fn from(value: Alternative) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the p-value is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TestMethod {
    /// Exact distribution for small samples without ties, normal approximation otherwise.
    #[default]
    Auto,
    /// Exact distribution whenever there are no ties and the sample has at
    /// most [`EXACT_HARD_LIMIT`] observations, which bounds the cost of the
    /// exact tables. Larger samples use the normal approximation.
    Exact,
    /// Always the normal approximation.
    Asymptotic,
}

// ---------------------------------------------------------------------------
// Trend test interface
// ---------------------------------------------------------------------------

/// Result of a trend test on one variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendOutcome {
    /// Test statistic (the JT count of ordered pairs).
    pub statistic: f64,
    /// Standardised statistic; `None` when the exact distribution was used.
    pub z_score: Option<f64>,
    /// p-value for the requested alternative.
    pub p_value: f64,
}

/// A test for a monotone trend of `values` across ordinal `groups` (codes `0..k`).
pub trait TrendTest {
    /// Run the test.
    ///
    /// # Errors
    ///
    /// Returns an error when the input cannot support the test, e.g. fewer
    /// than two non-empty groups or a degenerate null distribution.
    fn test(&self, values: &[f64], groups: &[usize], alternative: Alternative)
    -> Result<TrendOutcome>;
}

/// Jonckheere-Terpstra test.
///
/// # Algorithm
///
/// 1. JT = Σ_{i<j} Σ_{x∈Gᵢ, y∈Gⱼ} [x < y] + ½[x = y]
/// 2. Exact: the null distribution of JT is the convolution, over groups j,
///    of the Mann-Whitney distribution of Gⱼ against G₀ ∪ … ∪ Gⱼ₋₁.
/// 3. Asymptotic: z = (JT − μ ∓ ½) / σ with
///    μ = (N² − Σnᵢ²) / 4 and the tie-corrected variance of Hollander & Wolfe.
///
/// # References
///
/// - Jonckheere (1954). "A distribution-free k-sample test against ordered
///   alternatives". Biometrika, 41(1/2), 133–145.
/// - Hollander, Wolfe & Chicken (2014). Nonparametric Statistical Methods,
///   3rd ed., §6.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JonckheereTerpstra {
    /// Apply the ½ continuity correction in the normal approximation.
    pub continuity: bool,
    pub method: TestMethod,
}

impl Default for JonckheereTerpstra {
    fn default() -> Self {
        Self {
            continuity: true,
            method: TestMethod::Auto,
        }
    }
}

impl JonckheereTerpstra {
    pub fn new(continuity: bool, method: TestMethod) -> Self {
        Self { continuity, method }
    }

    fn use_exact(&self, sample: &GroupedSample, has_ties: bool) -> bool {
        if has_ties {
            return false;
        }
        match self.method {
            TestMethod::Auto => sample.len() <= EXACT_AUTO_LIMIT,
            TestMethod::Exact => sample.len() <= EXACT_HARD_LIMIT,
            TestMethod::Asymptotic => false,
        }
    }

    fn asymptotic(
        &self,
        sample: &GroupedSample,
        statistic: f64,
        ties: &[usize],
        alternative: Alternative,
    ) -> Result<TrendOutcome> {
        let variance = sample.null_variance(ties);
        if !(variance > 0.0) || !variance.is_finite() {
            return Err(SciToolsError::Computation(
                "null variance of the statistic is zero".to_owned(),
            ));
        }

        let diff = statistic - sample.null_mean();
        let shift = if self.continuity { 0.5 } else { 0.0 };
        let numerator = match alternative {
            Alternative::Increasing => diff - shift,
            Alternative::Decreasing => diff + shift,
            Alternative::TwoSided => diff.signum() * (diff.abs() - shift).max(0.0),
        };
        let z = numerator / variance.sqrt();

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| SciToolsError::Computation(format!("standard normal: {e}")))?;
        let p_value = match alternative {
            Alternative::Increasing => normal.sf(z),
            Alternative::Decreasing => normal.cdf(z),
            Alternative::TwoSided => (2.0 * normal.sf(z.abs())).min(1.0),
        };

        Ok(TrendOutcome {
            statistic,
            z_score: Some(z),
            p_value,
        })
    }
}

impl TrendTest for JonckheereTerpstra {
    fn test(
        &self,
        values: &[f64],
        groups: &[usize],
        alternative: Alternative,
    ) -> Result<TrendOutcome> {
        let sample = GroupedSample::new(values, groups)?;
        let statistic = sample.statistic();
        let ties = sample.tie_sizes();
        if ties.first() == Some(&sample.len()) {
            return Err(SciToolsError::Computation(
                "all observations are tied".to_owned(),
            ));
        }

        if !self.use_exact(&sample, !ties.is_empty()) {
            return self.asymptotic(&sample, statistic, &ties, alternative);
        }

        let pmf = jonckheere_pmf(&sample.sizes());
        // Without ties the statistic is a whole number.
        let observed = statistic.round() as usize;
        let upper: f64 = pmf.iter().skip(observed).sum();
        let lower: f64 = pmf.iter().take(observed + 1).sum();
        let p_value = match alternative {
            Alternative::Increasing => upper,
            Alternative::Decreasing => lower,
            Alternative::TwoSided => 2.0 * upper.min(lower),
        };

        Ok(TrendOutcome {
            statistic,
            z_score: None,
            p_value: p_value.clamp(0.0, 1.0),
        })
    }
}

// ---------------------------------------------------------------------------
// Sample bookkeeping
// ---------------------------------------------------------------------------

/// Observations split by ordinal group, each group sorted ascending.
struct GroupedSample {
    groups: Vec<Vec<f64>>,
    n: usize,
}

impl GroupedSample {
    fn new(values: &[f64], codes: &[usize]) -> Result<Self> {
        if values.len() != codes.len() {
            return Err(SciToolsError::InvalidInput(format!(
                "{} values but {} group codes",
                values.len(),
                codes.len()
            )));
        }
        if values.is_empty() {
            return Err(SciToolsError::InvalidInput("no observations".to_owned()));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SciToolsError::InvalidInput(
                "values must be finite".to_owned(),
            ));
        }

        let k = codes.iter().copied().max().unwrap_or(0) + 1;
        let mut groups: Vec<Vec<f64>> = vec![Vec::new(); k];
        for (&value, &code) in values.iter().zip(codes) {
            // -0.0 and 0.0 must count as a tie
            groups[code].push(value + 0.0);
        }
        for group in &mut groups {
            group.sort_by(f64::total_cmp);
        }

        let non_empty = groups.iter().filter(|g| !g.is_empty()).count();
        if non_empty < 2 {
            return Err(SciToolsError::Computation(format!(
                "at least two non-empty groups are required, found {non_empty}"
            )));
        }

        Ok(Self {
            groups,
            n: values.len(),
        })
    }

    fn len(&self) -> usize {
        self.n
    }

    fn sizes(&self) -> Vec<usize> {
        self.groups.iter().map(Vec::len).collect()
    }

    fn statistic(&self) -> f64 {
        let mut jt = 0.0;
        for (i, lower) in self.groups.iter().enumerate() {
            for upper in self.groups.iter().skip(i + 1) {
                for &y in upper {
                    let below = lower.partition_point(|&x| x < y);
                    let not_above = lower.partition_point(|&x| x <= y);
                    jt += below as f64 + 0.5 * (not_above - below) as f64;
                }
            }
        }
        jt
    }

    /// Sizes of all runs of tied values (runs of length one are omitted).
    fn tie_sizes(&self) -> Vec<usize> {
        let mut all: Vec<f64> = self.groups.iter().flatten().copied().collect();
        all.sort_by(f64::total_cmp);

        let mut ties = Vec::new();
        let mut start = 0;
        while start < all.len() {
            let mut end = start + 1;
            while end < all.len() && all[end] == all[start] {
                end += 1;
            }
            if end - start > 1 {
                ties.push(end - start);
            }
            start = end;
        }
        ties
    }

    fn null_mean(&self) -> f64 {
        let n = self.n as f64;
        let sum_sq: f64 = self.groups.iter().map(|g| (g.len() * g.len()) as f64).sum();
        (n * n - sum_sq) / 4.0
    }

    fn null_variance(&self, ties: &[usize]) -> f64 {
        let n = self.n as f64;
        let sizes: Vec<f64> = self.groups.iter().map(|g| g.len() as f64).collect();
        let tied: Vec<f64> = ties.iter().map(|&t| t as f64).collect();

        let lead = |x: f64| x * (x - 1.0) * (2.0 * x + 5.0);
        let cubic = |x: f64| x * (x - 1.0) * (x - 2.0);
        let square = |x: f64| x * (x - 1.0);

        let mut variance = (lead(n)
            - sizes.iter().map(|&x| lead(x)).sum::<f64>()
            - tied.iter().map(|&x| lead(x)).sum::<f64>())
            / 72.0;
        if n > 2.0 {
            variance += sizes.iter().map(|&x| cubic(x)).sum::<f64>()
                * tied.iter().map(|&x| cubic(x)).sum::<f64>()
                / (36.0 * cubic(n));
        }
        variance += sizes.iter().map(|&x| square(x)).sum::<f64>()
            * tied.iter().map(|&x| square(x)).sum::<f64>()
            / (8.0 * square(n));
        variance
    }
}

// ---------------------------------------------------------------------------
// Exact null distribution
// ---------------------------------------------------------------------------

/// Null distribution of the Mann-Whitney count #{(x, y): x < y} for `m`
/// observations x and `n` observations y without ties. Index = count.
pub(crate) fn mann_whitney_pmf(m: usize, n: usize) -> Vec<f64> {
    // row[b] holds the distribution for (a, b) at the current a.
    let mut row: Vec<Vec<f64>> = vec![vec![1.0]; n + 1];
    for a in 1..=m {
        let mut next: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        next.push(vec![1.0]);
        for b in 1..=n {
            let total = (a + b) as f64;
            let mut dist = vec![0.0; a * b + 1];
            // Largest observation is a y: it sits above all a x's.
            let from_y = b as f64 / total;
            for (u, p) in next[b - 1].iter().enumerate() {
                dist[u + a] += p * from_y;
            }
            // Largest observation is an x: it adds no pairs.
            let from_x = a as f64 / total;
            for (u, p) in row[b].iter().enumerate() {
                dist[u] += p * from_x;
            }
            next.push(dist);
        }
        row = next;
    }
    row.pop().unwrap_or_else(|| vec![1.0])
}

/// Null distribution of the JT statistic for the given group sizes.
pub(crate) fn jonckheere_pmf(sizes: &[usize]) -> Vec<f64> {
    let mut pmf = vec![1.0];
    let mut seen = 0;
    for &size in sizes {
        if size > 0 && seen > 0 {
            pmf = convolve(&pmf, &mann_whitney_pmf(seen, size));
        }
        seen += size;
    }
    pmf
}

fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]

    use super::*;

    const TOL: f64 = 1e-9;

    fn increasing_sample() -> (Vec<f64>, Vec<usize>) {
        (vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![0, 0, 1, 1, 2, 2])
    }

    #[test]
    fn alternative_synonyms() {
        assert_eq!("two_sided".parse::<Alternative>().unwrap(), Alternative::TwoSided);
        assert_eq!("two-sided".parse::<Alternative>().unwrap(), Alternative::TwoSided);
        assert_eq!("greater".parse::<Alternative>().unwrap(), Alternative::Increasing);
        assert_eq!("increasing".parse::<Alternative>().unwrap(), Alternative::Increasing);
        assert_eq!("less".parse::<Alternative>().unwrap(), Alternative::Decreasing);
        assert_eq!(" Decreasing ".parse::<Alternative>().unwrap(), Alternative::Decreasing);
        assert!("upward".parse::<Alternative>().is_err());
    }

    #[test]
    fn alternative_serde_uses_table() {
        let alt: Alternative = serde_json::from_str("\"increasing\"").unwrap();
        assert_eq!(alt, Alternative::Increasing);
        assert_eq!(serde_json::to_string(&alt).unwrap(), "\"greater\"");
        assert!(serde_json::from_str::<Alternative>("\"sideways\"").is_err());
    }

    #[test]
    fn mann_whitney_small_table() {
        // C(4,2) = 6 arrangements: counts 1,1,2,1,1 over U = 0..4
        let pmf = mann_whitney_pmf(2, 2);
        let expected = [1.0, 1.0, 2.0, 1.0, 1.0].map(|c| c / 6.0);
        assert_eq!(pmf.len(), expected.len());
        for (got, want) in pmf.iter().zip(expected) {
            assert!((got - want).abs() < TOL, "{got} vs {want}");
        }
    }

    #[test]
    fn mann_whitney_degenerate_sizes() {
        assert_eq!(mann_whitney_pmf(0, 3), vec![1.0]);
        assert_eq!(mann_whitney_pmf(4, 0), vec![1.0]);
        let pmf = mann_whitney_pmf(1, 3);
        assert_eq!(pmf.len(), 4);
        assert!(pmf.iter().all(|p| (p - 0.25).abs() < TOL));
    }

    #[test]
    fn jonckheere_pmf_sums_to_one_and_is_symmetric() {
        let pmf = jonckheere_pmf(&[3, 4, 2, 5]);
        let total: f64 = pmf.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        for (a, b) in pmf.iter().zip(pmf.iter().rev()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn exact_perfect_increase() {
        let (values, groups) = increasing_sample();
        let jt = JonckheereTerpstra::default();

        let up = jt.test(&values, &groups, Alternative::Increasing).unwrap();
        assert!((up.statistic - 12.0).abs() < TOL);
        assert!(up.z_score.is_none());
        // 6! / (2! 2! 2!) = 90 equally likely orderings, one reaches the maximum
        assert!((up.p_value - 1.0 / 90.0).abs() < TOL);

        let two = jt.test(&values, &groups, Alternative::TwoSided).unwrap();
        assert!((two.p_value - 2.0 / 90.0).abs() < TOL);

        let down = jt.test(&values, &groups, Alternative::Decreasing).unwrap();
        assert!((down.p_value - 1.0).abs() < TOL);
    }

    #[test]
    fn asymptotic_perfect_increase() {
        let (values, groups) = increasing_sample();

        // mean = (36 - 12) / 4 = 6, variance = (510 - 54) / 72
        let sd = (456.0_f64 / 72.0).sqrt();

        let corrected = JonckheereTerpstra::new(true, TestMethod::Asymptotic)
            .test(&values, &groups, Alternative::Increasing)
            .unwrap();
        let z = corrected.z_score.unwrap();
        assert!((z - 5.5 / sd).abs() < 1e-9);
        assert!(corrected.p_value > 0.01 && corrected.p_value < 0.02);

        let plain = JonckheereTerpstra::new(false, TestMethod::Asymptotic)
            .test(&values, &groups, Alternative::Increasing)
            .unwrap();
        assert!((plain.z_score.unwrap() - 6.0 / sd).abs() < 1e-9);
        assert!(plain.p_value < corrected.p_value);
    }

    #[test]
    fn ties_count_half_and_force_normal_approximation() {
        let values = [1.0, 2.0, 2.0, 3.0];
        let groups = [0, 0, 1, 1];
        let outcome = JonckheereTerpstra::new(true, TestMethod::Exact)
            .test(&values, &groups, Alternative::TwoSided)
            .unwrap();
        assert!((outcome.statistic - 3.5).abs() < TOL);
        assert!(outcome.z_score.is_some());
    }

    #[test]
    fn exact_method_falls_back_above_hard_limit() {
        let n = EXACT_HARD_LIMIT + 1;
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let groups: Vec<usize> = (0..n).map(|i| usize::from(i >= n / 2)).collect();
        let exact = JonckheereTerpstra::new(true, TestMethod::Exact);

        let large = exact
            .test(&values, &groups, Alternative::Increasing)
            .unwrap();
        assert!(large.z_score.is_some());

        let small_groups: Vec<usize> = (0..20).map(|i| usize::from(i >= 10)).collect();
        let small = exact
            .test(&values[..20], &small_groups, Alternative::Increasing)
            .unwrap();
        assert!(small.z_score.is_none());
    }

    #[test]
    fn identical_groups_give_no_evidence() {
        let values = [1.0, 5.0, 9.0, 9.0, 1.0, 5.0, 5.0, 9.0, 1.0];
        let groups = [0, 0, 0, 1, 1, 1, 2, 2, 2];
        let outcome = JonckheereTerpstra::default()
            .test(&values, &groups, Alternative::TwoSided)
            .unwrap();
        assert!((outcome.statistic - 13.5).abs() < TOL);
        assert!((outcome.z_score.unwrap()).abs() < TOL);
        assert!((outcome.p_value - 1.0).abs() < TOL);
    }

    #[test]
    fn empty_groups_in_the_middle_are_ignored() {
        let (values, _) = increasing_sample();
        let sparse = [0, 0, 2, 2, 4, 4];
        let outcome = JonckheereTerpstra::default()
            .test(&values, &sparse, Alternative::Increasing)
            .unwrap();
        assert!((outcome.p_value - 1.0 / 90.0).abs() < TOL);
    }

    #[test]
    fn invalid_inputs_are_errors() {
        let jt = JonckheereTerpstra::default();
        assert!(jt.test(&[], &[], Alternative::TwoSided).is_err());
        assert!(jt.test(&[1.0, 2.0], &[0], Alternative::TwoSided).is_err());
        assert!(jt.test(&[1.0, f64::NAN], &[0, 1], Alternative::TwoSided).is_err());
        // single group
        assert!(jt.test(&[1.0, 2.0, 3.0], &[1, 1, 1], Alternative::TwoSided).is_err());
        // all values tied: zero variance
        assert!(
            jt.test(&[4.0; 6], &[0, 0, 1, 1, 2, 2], Alternative::TwoSided)
                .is_err()
        );
    }
}
