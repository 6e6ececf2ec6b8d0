use thiserror::Error;

// ---------------------------------------------------------------------------
// Ranking errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the ranking pipeline.
///
/// Per-row and per-compound problems are recovered locally and only show
/// up in the logs and the experiment summaries; what reaches the caller is
/// either a bad configuration or a run with nothing left to rank.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RankError {
    /// No experiments were given, or none of them produced a distance.
    #[error("no data: {0}")]
    NoData(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a single row was left out of anchor and distance computation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RowError {
    /// −log10(p) is undefined, infinite or negative for this p-value.
    #[error("invalid significance for compound '{compound_id}': p-value {p_value}")]
    InvalidSignificance { compound_id: String, p_value: f64 },

    #[error("invalid fold change for compound '{compound_id}': {fold_change}")]
    InvalidFoldChange { compound_id: String, fold_change: f64 },
}
