//! Settings for the `jt-test` command.
//!
//! Values come from three places, later ones winning: the built-in defaults,
//! an optional JSON settings file (`--config`), and explicit command-line flags.
//!
//! ```json
//! {
//!   "id_column": "SampleID",
//!   "output": "results/jt.csv",
//!   "alternative": "increasing",
//!   "continuity": false,
//!   "fdr_alpha": 0.1,
//!   "method": "asymptotic"
//! }
//! ```

use crate::analyser::logic::jonckheere::{Alternative, JonckheereTerpstra, TestMethod};
use crate::error::{Result, ResultExt as _, SciToolsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ID_COLUMN: &str = "Sample Name";
pub const DEFAULT_OUTPUT: &str = "jt_results_fdr.csv";
pub const DEFAULT_FDR_ALPHA: f64 = 0.05;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JtSettings {
    /// Identifier column excluded from testing (skipped if absent from the file)
    pub id_column: String,
    /// Destination CSV, overwritten if it exists
    pub output: PathBuf,
    pub alternative: Alternative,
    /// Continuity correction for the normal approximation
    pub continuity: bool,
    /// Significance threshold for both raw and FDR-adjusted p-values
    pub fdr_alpha: f64,
    pub method: TestMethod,
}

impl Default for JtSettings {
    fn default() -> Self {
        Self {
            id_column: DEFAULT_ID_COLUMN.to_owned(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            alternative: Alternative::TwoSided,
            continuity: true,
            fdr_alpha: DEFAULT_FDR_ALPHA,
            method: TestMethod::Auto,
        }
    }
}

/// Values given explicitly on the command line. `None` keeps the current setting.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub id_column: Option<String>,
    pub output: Option<PathBuf>,
    pub alternative: Option<Alternative>,
    pub continuity: Option<bool>,
    pub fdr_alpha: Option<f64>,
    pub method: Option<TestMethod>,
}

impl JtSettings {
    /// Read settings from a JSON file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid settings JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded settings file");
        Ok(settings)
    }

    /// Defaults, then the optional settings file.
    ///
    /// # Errors
    ///
    /// See [`JtSettings::load`].
    pub fn resolve(config: Option<&Path>) -> Result<Self> {
        match config {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(id_column) = overrides.id_column {
            self.id_column = id_column;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(alternative) = overrides.alternative {
            self.alternative = alternative;
        }
        if let Some(continuity) = overrides.continuity {
            self.continuity = continuity;
        }
        if let Some(fdr_alpha) = overrides.fdr_alpha {
            self.fdr_alpha = fdr_alpha;
        }
        if let Some(method) = overrides.method {
            self.method = method;
        }
        self
    }

    /// # Errors
    ///
    /// Returns [`SciToolsError::Config`] if alpha is outside `(0, 1)` or the
    /// output path is empty.
    pub fn validate(&self) -> Result<()> {
        if !(self.fdr_alpha > 0.0 && self.fdr_alpha < 1.0) {
            return Err(SciToolsError::Config(format!(
                "FDR threshold must lie strictly between 0 and 1, got {}",
                self.fdr_alpha
            )));
        }
        if self.output.as_os_str().is_empty() {
            return Err(SciToolsError::Config("output path is empty".to_owned()));
        }
        Ok(())
    }

    pub fn trend_test(&self) -> JonckheereTerpstra {
        JonckheereTerpstra::new(self.continuity, self.method)
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]

    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_defaults() {
        let settings = JtSettings::default();
        assert_eq!(settings.id_column, "Sample Name");
        assert_eq!(settings.output, PathBuf::from("jt_results_fdr.csv"));
        assert_eq!(settings.alternative, Alternative::TwoSided);
        assert!(settings.continuity);
        assert!((settings.fdr_alpha - 0.05).abs() < f64::EPSILON);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_and_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"alternative": "decreasing", "fdr_alpha": 0.1}}"#).unwrap();

        let settings = JtSettings::resolve(Some(file.path())).unwrap();
        assert_eq!(settings.alternative, Alternative::Decreasing);
        assert!((settings.fdr_alpha - 0.1).abs() < f64::EPSILON);
        assert_eq!(settings.id_column, DEFAULT_ID_COLUMN);

        let settings = settings.with_overrides(SettingsOverrides {
            fdr_alpha: Some(0.01),
            continuity: Some(false),
            ..Default::default()
        });
        assert!((settings.fdr_alpha - 0.01).abs() < f64::EPSILON);
        assert!(!settings.continuity);
        assert_eq!(settings.alternative, Alternative::Decreasing);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fdr": 0.1}}"#).unwrap();
        let err = JtSettings::load(file.path()).unwrap_err();
        assert!(matches!(err, SciToolsError::Config(_)), "{err}");
    }

    #[test]
    fn test_validate_alpha() {
        for alpha in [0.0, 1.0, -0.5, f64::NAN] {
            let settings = JtSettings {
                fdr_alpha: alpha,
                ..Default::default()
            };
            assert!(settings.validate().is_err(), "alpha {alpha} should be rejected");
        }
    }
}
