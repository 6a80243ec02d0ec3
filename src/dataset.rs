//! Dataset files: one flat file per (table, order mode).
//!
//! Each line holds one row, fields rendered as SQL literals in declared
//! column order and joined by commas, with no header and no flag columns
//! (flags are computed from replay position at script-generation time).
//! Because fields are already SQL literals, a dataset line can be spliced
//! verbatim into an `INSERT ... VALUES (<line>)` group.
//!
//! Seed consumption order, fixed so runs are byte-identical: tables in
//! schema declaration order; for each table the sequential dataset first,
//! then the random one; within a dataset, rows in emission order and
//! columns in declared order.

use crate::error::GenError;
use crate::rows::{OrderMode, RowComposer};
use crate::schema::LogicalTable;
use rand::Rng;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const WRITE_BUFFER_SIZE: usize = 256 * 1024;

/// File name for a table's dataset at one order mode, e.g. `people_seq.csv`.
pub fn file_name(table: &str, mode: OrderMode) -> String {
    format!("{}_{}.csv", table, mode.suffix())
}

/// Generate and persist one dataset. Returns the written path.
pub fn write_table<R: Rng>(
    dir: &Path,
    table: &LogicalTable,
    mode: OrderMode,
    row_count: u64,
    rng: &mut R,
) -> Result<PathBuf, GenError> {
    let path = dir.join(file_name(&table.name, mode));
    let file = File::create(&path)?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    let composer = RowComposer::new(&table.columns, row_count, mode, &[], rng);
    for row in composer {
        let row = row?;
        let mut line = String::new();
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&value.render());
        }
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(path)
}

/// Open a dataset for replay, yielding raw lines in file order.
pub fn open_rows(
    dir: &Path,
    table: &str,
    mode: OrderMode,
) -> std::io::Result<impl Iterator<Item = std::io::Result<String>>> {
    let path = dir.join(file_name(table, mode));
    let file = File::open(&path)?;
    Ok(BufReader::new(file).lines())
}
