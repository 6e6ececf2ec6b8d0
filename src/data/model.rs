use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a raw input table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from CSV, JSON or Parquet, before the
/// experiment columns are resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell; numeric-looking strings are coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Text view of the cell. `Null` and blank strings are `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) if s.trim().is_empty() => None,
            CellValue::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Interpret a curation marker. Accepts booleans, 0/1 and the usual
    /// spellings of true/false.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Integer(i) => Some(*i != 0),
            CellValue::Float(v) => Some(!v.is_nan() && *v != 0.0),
            CellValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "x" => Some(true),
                "false" | "no" | "n" | "0" | "" => Some(false),
                _ => None,
            },
            CellValue::Null => Some(false),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – one input file before comparison discovery
// ---------------------------------------------------------------------------

/// Headers plus rows of cells, in file order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, column); out-of-range cells read as `Null`.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&NULL)
    }
}

// ---------------------------------------------------------------------------
// CompoundRow / ExperimentTable – what the ranking core consumes
// ---------------------------------------------------------------------------

/// One compound in one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundRow {
    /// Stable key shared by every experiment the compound appears in.
    pub compound_id: String,
    pub name: Option<String>,
    pub calc_mw: Option<f64>,
    /// Signed log2 fold change.
    pub fold_change: f64,
    pub p_value: f64,
    /// Set by upstream curation; only flagged rows are ranked.
    pub flagged: bool,
}

impl CompoundRow {
    pub fn new(compound_id: impl Into<String>, fold_change: f64, p_value: f64) -> Self {
        Self {
            compound_id: compound_id.into(),
            name: None,
            calc_mw: None,
            fold_change,
            p_value,
            flagged: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_calc_mw(mut self, calc_mw: f64) -> Self {
        self.calc_mw = Some(calc_mw);
        self
    }

    pub fn with_flagged(mut self, flagged: bool) -> Self {
        self.flagged = flagged;
        self
    }
}

/// A single pairwise comparison: a labelled, ordered list of compounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentTable {
    pub experiment_id: String,
    pub rows: Vec<CompoundRow>,
}

impl ExperimentTable {
    pub fn new(experiment_id: impl Into<String>, rows: Vec<CompoundRow>) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CompoundMeta – display metadata lookup
// ---------------------------------------------------------------------------

/// Display metadata of a compound.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundMeta {
    pub name: Option<String>,
    pub calc_mw: Option<f64>,
}

impl CompoundMeta {
    /// Name, else the calculated mass as text, else `fallback`.
    pub fn display_name(&self, fallback: &str) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match self.calc_mw {
            Some(mw) => mw.to_string(),
            None => fallback.to_string(),
        }
    }
}

/// compound_id → metadata, taken from the first experiment that lists the
/// compound (flagged or not).
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    entries: HashMap<String, CompoundMeta>,
}

impl MetadataIndex {
    pub fn from_experiments(experiments: &[ExperimentTable]) -> Self {
        let mut entries = HashMap::new();
        for exp in experiments {
            for row in &exp.rows {
                entries
                    .entry(row.compound_id.clone())
                    .or_insert_with(|| CompoundMeta {
                        name: row.name.clone(),
                        calc_mw: row.calc_mw,
                    });
            }
        }
        Self { entries }
    }

    pub fn get(&self, compound_id: &str) -> Option<&CompoundMeta> {
        self.entries.get(compound_id)
    }

    /// Display label for a compound; unknown compounds use their id.
    pub fn display_name(&self, compound_id: &str) -> String {
        match self.get(compound_id) {
            Some(meta) => meta.display_name(compound_id),
            None => compound_id.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_spellings() {
        assert_eq!(CellValue::String("TRUE".into()).as_flag(), Some(true));
        assert_eq!(CellValue::String(" no ".into()).as_flag(), Some(false));
        assert_eq!(CellValue::Integer(1).as_flag(), Some(true));
        assert_eq!(CellValue::Null.as_flag(), Some(false));
        assert_eq!(CellValue::String("maybe".into()).as_flag(), None);
    }

    #[test]
    fn nan_flag_is_unflagged() {
        assert_eq!(CellValue::Float(f64::NAN).as_flag(), Some(false));
        assert_eq!(CellValue::Float(1.0).as_flag(), Some(true));
        assert_eq!(CellValue::Float(0.0).as_flag(), Some(false));
    }

    #[test]
    fn display_name_falls_back_to_mass_then_id() {
        let exp = ExperimentTable::new(
            "a.csv",
            vec![
                CompoundRow::new("C1", 1.0, 0.01).with_name("Glucose"),
                CompoundRow::new("C2", 1.0, 0.01).with_calc_mw(180.0634),
                CompoundRow::new("C3", 1.0, 0.01),
            ],
        );
        let index = MetadataIndex::from_experiments(&[exp]);
        assert_eq!(index.display_name("C1"), "Glucose");
        assert_eq!(index.display_name("C2"), "180.0634");
        assert_eq!(index.display_name("C3"), "C3");
        assert_eq!(index.display_name("missing"), "missing");
    }

    #[test]
    fn first_experiment_wins_for_metadata() {
        let first = ExperimentTable::new("a", vec![CompoundRow::new("C1", 1.0, 0.1)]);
        let second = ExperimentTable::new(
            "b",
            vec![CompoundRow::new("C1", 1.0, 0.1).with_name("Later name")],
        );
        let index = MetadataIndex::from_experiments(&[first, second]);
        assert_eq!(index.get("C1").and_then(|m| m.name.clone()), None);
        assert_eq!(index.len(), 1);
    }
}
