//! Schema model: logical tables, flag rates, and physical variant expansion.
//!
//! The schema description is a read-only JSON file mapping each logical
//! table to an ordered column list and the set of scenarios it participates
//! in. Columns are a JSON array (not an object) because column order is
//! load-bearing for dataset files and INSERT statements.
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "name": "people",
//!       "columns": [
//!         { "name": "id", "type": "INT" },
//!         { "name": "height", "type": "REAL" },
//!         { "name": "nickname", "type": "TEXT(16)" }
//!       ],
//!       "scenarios": ["insert_small", "insert_update"]
//!     }
//!   ]
//! }
//! ```

use crate::error::GenError;
use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Column types understood by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Real,
    /// Bounded text with a maximum length in characters.
    Text(u32),
}

impl ColumnType {
    /// Parse a declared type: `INT`, `REAL`, or `TEXT(n)`.
    pub fn parse(s: &str) -> Result<Self, GenError> {
        match s {
            "INT" => Ok(ColumnType::Int),
            "REAL" => Ok(ColumnType::Real),
            _ => s
                .strip_prefix("TEXT(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|&n| n > 0)
                .map(ColumnType::Text)
                .ok_or_else(|| GenError::UnknownColumnType(s.to_string())),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Int => write!(f, "INT"),
            ColumnType::Real => write!(f, "REAL"),
            ColumnType::Text(n) => write!(f, "TEXT({})", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

/// A schema-level table definition. One logical table expands into several
/// physical variants that share identical row data.
#[derive(Debug, Clone)]
pub struct LogicalTable {
    pub name: String,
    pub columns: Vec<Column>,
    /// Scenario tags this table participates in.
    pub scenarios: Vec<String>,
}

impl LogicalTable {
    pub fn has_scenario(&self, tag: &str) -> bool {
        self.scenarios.iter().any(|s| s == tag)
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub tables: Vec<LogicalTable>,
}

#[derive(Deserialize)]
struct SchemaFile {
    tables: Vec<TableDef>,
}

#[derive(Deserialize)]
struct TableDef {
    name: String,
    columns: Vec<ColumnDef>,
    #[serde(default)]
    scenarios: Vec<String>,
}

#[derive(Deserialize)]
struct ColumnDef {
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

impl Schema {
    /// Load and validate the schema description. An unknown column type is
    /// fatal: the schema is a fixed precondition of every later step.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schema file: {}", path.display()))?;
        let file: SchemaFile = serde_json::from_str(&text)
            .with_context(|| format!("invalid schema file: {}", path.display()))?;

        let mut tables = Vec::with_capacity(file.tables.len());
        for table in file.tables {
            let mut columns = Vec::with_capacity(table.columns.len());
            for col in table.columns {
                columns.push(Column {
                    ty: ColumnType::parse(&col.ty)
                        .with_context(|| format!("table {}, column {}", table.name, col.name))?,
                    name: col.name,
                });
            }
            tables.push(LogicalTable {
                name: table.name,
                columns,
                scenarios: table.scenarios,
            });
        }
        Ok(Schema { tables })
    }

    /// Tables tagged for the given scenario, in declaration order.
    pub fn tables_for(&self, tag: &str) -> Vec<&LogicalTable> {
        self.tables.iter().filter(|t| t.has_scenario(tag)).collect()
    }
}

/// A deterministic row-selection rate, `1 / denominator`.
///
/// The flag column name and every oracle-expected count derive from the same
/// value, so the predicate and the analytic count cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagRate {
    pub denominator: u32,
}

impl FlagRate {
    /// The fixed rates appended to every physical variant, in flag-column
    /// order. Index 0 gates updates, index 1 gates deletes.
    pub const ALL: [FlagRate; 2] = [FlagRate { denominator: 100 }, FlagRate { denominator: 200 }];

    /// Rows selected by this rate out of `row_count`, i.e.
    /// `round(row_count / denominator)`.
    pub fn count(&self, row_count: u64) -> u64 {
        (row_count as f64 / self.denominator as f64).round() as u64
    }

    pub fn column_name(&self) -> String {
        format!("flag_1_in_{}", self.denominator)
    }

    pub fn column(&self) -> Column {
        Column {
            name: self.column_name(),
            ty: ColumnType::Int,
        }
    }

    /// Flag value for the row at `position` in the emission sequence. The
    /// first `count(row_count)` positions are flagged, independent of which
    /// underlying index landed there.
    pub fn flag_value(&self, position: u64, row_count: u64) -> i64 {
        i64::from(position < self.count(row_count))
    }
}

/// One concrete `CREATE TABLE` instance for a logical table. Variants differ
/// only in name and declared primary key; row data is shared, so update and
/// delete results are identical across all variants of a table.
#[derive(Debug, Clone)]
pub struct TableVariant {
    pub name: String,
    /// Base columns followed by one flag column per rate.
    pub columns: Vec<Column>,
    /// Number of leading base columns in `columns`.
    pub base_columns: usize,
    /// Index into `columns` of the primary-key column, always a base column.
    pub primary_key: Option<usize>,
}

impl TableVariant {
    pub fn primary_key_column(&self) -> Option<&Column> {
        self.primary_key.map(|i| &self.columns[i])
    }

    /// The first base column that is not the primary key. Every table has at
    /// least two columns in practice; a single-column table keyed on that
    /// column has no update target.
    pub fn first_non_key_column(&self) -> Option<&Column> {
        self.columns[..self.base_columns]
            .iter()
            .enumerate()
            .find(|(i, _)| Some(*i) != self.primary_key)
            .map(|(_, c)| c)
    }
}

/// Enumerate the physical variants of a logical table: optionally one with
/// no primary key, then one per column chosen as primary key. Flag columns
/// are appended identically to every variant.
pub fn expand_variants(
    table: &LogicalTable,
    rates: &[FlagRate],
    include_no_pk: bool,
) -> Vec<TableVariant> {
    let mut columns = table.columns.clone();
    columns.extend(rates.iter().map(FlagRate::column));
    let base_columns = table.columns.len();

    let mut variants = Vec::with_capacity(base_columns + 1);
    if include_no_pk {
        variants.push(TableVariant {
            name: table.name.clone(),
            columns: columns.clone(),
            base_columns,
            primary_key: None,
        });
    }
    for (i, col) in table.columns.iter().enumerate() {
        variants.push(TableVariant {
            name: format!("{}_pk_{}", table.name, col.name),
            columns: columns.clone(),
            base_columns,
            primary_key: Some(i),
        });
    }
    variants
}
