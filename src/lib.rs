//! Rank compounds by how consistently extreme they are across several
//! differential-expression comparisons.
//!
//! Each comparison places its compounds on a volcano plane
//! (log2 fold change, −log10 p). A compound's distance to the most extreme
//! corner of that plane is collected across comparisons, its most anomalous
//! distance is flagged with a modified z-score, and the remaining distances
//! are averaged into the consensus used for ranking.

pub mod config;
pub mod data;
pub mod error;
pub mod rank;
pub mod report;
pub mod stats;

pub use config::{ColumnNames, RankConfig};
pub use data::model::{CompoundRow, ExperimentTable};
pub use error::RankError;
pub use rank::{RankedReport, rank_compounds};
