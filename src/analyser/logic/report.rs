use super::correction::benjamini_hochberg;
use super::types::{CorrectedResult, FeatureResult};
use crate::error::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Table};

/// Corrected, sorted results of one batch.
#[derive(Clone, Debug)]
pub struct TrendReport {
    /// Sorted ascending by (FDR, raw p); file order breaks remaining ties.
    pub results: Vec<CorrectedResult>,
    pub alpha: f64,
}

impl TrendReport {
    /// Apply Benjamini-Hochberg across `features`, flag significance at
    /// `alpha` and sort.
    ///
    /// # Errors
    ///
    /// Returns an error if a raw p-value lies outside `[0, 1]`.
    pub fn build(features: Vec<FeatureResult>, alpha: f64) -> Result<Self> {
        let raw: Vec<f64> = features.iter().map(|f| f.p_value).collect();
        let adjusted = benjamini_hochberg(&raw)?;

        let mut results: Vec<CorrectedResult> = features
            .into_iter()
            .zip(adjusted)
            .map(|(feature, fdr)| CorrectedResult::new(feature, fdr, alpha))
            .collect();
        results.sort_by(|a, b| {
            a.fdr
                .total_cmp(&b.fdr)
                .then_with(|| a.p_value.total_cmp(&b.p_value))
        });

        Ok(Self { results, alpha })
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn raw_significant(&self) -> usize {
        self.results.iter().filter(|r| r.significant_raw).count()
    }

    pub fn fdr_significant(&self) -> usize {
        self.results.iter().filter(|r| r.significant_fdr).count()
    }

    /// Share of raw hits removed by the correction, in percent.
    /// `None` when nothing was significant before correction.
    pub fn reduction_pct(&self) -> Option<f64> {
        let raw = self.raw_significant();
        if raw == 0 {
            return None;
        }
        Some((1.0 - self.fdr_significant() as f64 / raw as f64) * 100.0)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let alpha = self.alpha;
        let mut lines = vec![
            format!("Total features tested: {}", self.len()),
            format!(
                "Significant by Raw P-value (<{alpha}): {}",
                self.raw_significant()
            ),
            format!(
                "Significant by FDR (<{alpha}):     {}",
                self.fdr_significant()
            ),
        ];
        if let Some(pct) = self.reduction_pct() {
            lines.push(format!(
                "FDR correction reduced significant hits by {pct:.1}%."
            ));
        }
        lines
    }

    /// Terminal table of the first `limit` results.
    pub fn preview_table(&self, limit: usize) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .apply_modifier(UTF8_ROUND_CORNERS);
        table.set_header(vec![
            Cell::new("Variable"),
            Cell::new("Raw P-value"),
            Cell::new("FDR"),
            Cell::new("Z"),
            Cell::new("JT"),
            Cell::new("N"),
        ]);

        for result in self.results.iter().take(limit) {
            let z = result
                .z_score
                .map(|z| format!("{z:.3}"))
                .unwrap_or_else(|| "exact".to_owned());
            table.add_row(vec![
                Cell::new(&result.variable),
                Cell::new(format!("{:.4}", result.p_value)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.4}", result.fdr)).set_alignment(CellAlignment::Right),
                Cell::new(z).set_alignment(CellAlignment::Right),
                Cell::new(format!("{}", result.statistic)).set_alignment(CellAlignment::Right),
                Cell::new(result.observations).set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }
}
