use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::RankError;

// ---------------------------------------------------------------------------
// Column names used by the loader
// ---------------------------------------------------------------------------

/// Header names of the exported experiment tables.
///
/// A comparison is a pair of columns `"{fold_change_prefix}{label}"` and
/// `"{p_value_prefix}{label}"` sharing the same label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub compound_id: String,
    pub name: String,
    pub calc_mw: String,
    /// Boolean curation marker; rows set to true take part in ranking.
    pub flag: String,
    pub fold_change_prefix: String,
    pub p_value_prefix: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            compound_id: "Compounds ID".to_string(),
            name: "Name".to_string(),
            calc_mw: "Calc. MW".to_string(),
            flag: "Checked".to_string(),
            fold_change_prefix: "Log2 Fold Change: ".to_string(),
            p_value_prefix: "P-value: ".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Options for one ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Drop each compound's most anomalous sample before the consensus.
    pub remove_outlier: bool,
    /// Number of compounds in the final report.
    pub top_k: usize,
    /// |log2 fold change| above which a significant row counts as regulated.
    pub fold_change_threshold: f64,
    /// p-value below which a row counts as significant.
    pub p_value_threshold: f64,
    pub columns: ColumnNames,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            remove_outlier: false,
            top_k: 50,
            fold_change_threshold: 0.5,
            p_value_threshold: 0.05,
            columns: ColumnNames::default(),
        }
    }
}

impl RankConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: RankConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RankError> {
        if self.top_k == 0 {
            return Err(RankError::InvalidConfig("top_k must be greater than 0".into()));
        }
        if !(self.fold_change_threshold.is_finite() && self.fold_change_threshold >= 0.0) {
            return Err(RankError::InvalidConfig(format!(
                "fold_change_threshold must be a non-negative number, got {}",
                self.fold_change_threshold
            )));
        }
        if !(self.p_value_threshold > 0.0 && self.p_value_threshold <= 1.0) {
            return Err(RankError::InvalidConfig(format!(
                "p_value_threshold must be in (0, 1], got {}",
                self.p_value_threshold
            )));
        }
        if self.columns.fold_change_prefix.is_empty() || self.columns.p_value_prefix.is_empty() {
            return Err(RankError::InvalidConfig(
                "comparison column prefixes must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let config = RankConfig::default();
        assert!(!config.remove_outlier);
        assert_eq!(config.top_k, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: RankConfig =
            serde_json::from_str(r#"{ "remove_outlier": true, "columns": { "flag": "Selected" } }"#)
                .unwrap();
        assert!(config.remove_outlier);
        assert_eq!(config.top_k, 50);
        assert_eq!(config.columns.flag, "Selected");
        assert_eq!(config.columns.compound_id, "Compounds ID");
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let config = RankConfig {
            top_k: 0,
            ..RankConfig::default()
        };
        assert!(matches!(config.validate(), Err(RankError::InvalidConfig(_))));
    }

    #[test]
    fn p_threshold_out_of_range_is_rejected() {
        let config = RankConfig {
            p_value_threshold: 0.0,
            ..RankConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
