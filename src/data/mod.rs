/// Data layer: core types, loading, and row selection.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable → one ExperimentTable per comparison
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ ExperimentTable │  Vec<CompoundRow>, experiment id
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  flagged + valid rows → volcano points
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
