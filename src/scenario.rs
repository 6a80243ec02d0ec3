//! Scenario driver: composes emitter calls into named end-to-end scenarios
//! and writes one script/oracle file pair per scenario.
//!
//! Each statement plan builds on the previous one over the same created and
//! loaded tables: insert-only, insert+update, insert+update on text columns,
//! insert+update+delete, and cascade delete (which removes everything *not*
//! in the small flagged subset, shrinking tables to a minimal residue).
//!
//! A scenario's file pair is written through temp files and persisted only
//! after the whole scenario succeeded, so a failure never leaves a
//! half-written pair behind. Previously written pairs are independent and
//! are not rolled back.

use crate::dataset;
use crate::emitter::Emitter;
use crate::error::GenError;
use crate::rows::OrderMode;
use crate::schema::{expand_variants, FlagRate, LogicalTable, Schema};
use anyhow::Context;
use rand::Rng;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default dataset size; every scenario replays a prefix of it.
pub const DATASET_ROWS: u64 = 100_000;

/// Test files are numbered from here, in matrix order.
const TEST_NUMBER_BASE: u32 = 400;

/// Statement plan for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Create + full insert for every physical variant.
    Insert,
    /// `Insert`, then one flag-gated UPDATE per variant targeting the first
    /// non-key column.
    InsertUpdate,
    /// Like `InsertUpdate`, but skips the no-primary-key variant and targets
    /// the column after the key (cyclically), so text columns get exercised.
    UpdateTexts,
    /// `InsertUpdate`, then one DELETE of the second flagged subset.
    InsertUpdateDelete,
    /// `Insert`, then one DELETE of every row *not* in the first flagged
    /// subset.
    DeleteCascade,
}

/// Immutable configuration for one script/oracle pair.
#[derive(Debug, Clone)]
pub struct ScenarioSpec {
    /// Scenario tag; selects participating tables and names the file pair.
    pub name: &'static str,
    pub rows: u64,
    pub batch: u64,
    pub order: OrderMode,
    pub plan: Plan,
}

/// Row-count and batch-size axes for the scenario matrix.
#[derive(Debug, Clone, Copy)]
pub struct Sizes {
    pub small_rows: u64,
    pub large_rows: u64,
    pub bulk_batch: u64,
}

impl Default for Sizes {
    fn default() -> Self {
        Sizes {
            small_rows: 10_000,
            large_rows: DATASET_ROWS,
            bulk_batch: 1_000,
        }
    }
}

/// The fixed scenario matrix, in emission (and numbering) order.
pub fn scenario_matrix(sizes: Sizes) -> Vec<ScenarioSpec> {
    use OrderMode::{Random, Sequential};
    let mut specs = Vec::new();
    let mut push = |name, rows, batch, order, plan| {
        specs.push(ScenarioSpec {
            name,
            rows,
            batch,
            order,
            plan,
        });
    };

    // Inserts: small tables one row at a time, large tables in bulk batches.
    for order in [Sequential, Random] {
        push("insert_small", sizes.small_rows, 1, order, Plan::Insert);
    }
    for order in [Sequential, Random] {
        push(
            "insert_large",
            sizes.large_rows,
            sizes.bulk_batch,
            order,
            Plan::Insert,
        );
    }
    for order in [Sequential, Random] {
        push(
            "insert_large_wide",
            sizes.large_rows,
            sizes.bulk_batch,
            order,
            Plan::Insert,
        );
    }

    // Updates.
    for order in [Sequential, Random] {
        push(
            "insert_update",
            sizes.large_rows,
            sizes.bulk_batch,
            order,
            Plan::InsertUpdate,
        );
    }
    push(
        "update_texts",
        sizes.large_rows,
        sizes.bulk_batch,
        Random,
        Plan::UpdateTexts,
    );

    // Deletes.
    for order in [Sequential, Random] {
        push(
            "insert_update_delete",
            sizes.large_rows,
            sizes.bulk_batch,
            order,
            Plan::InsertUpdateDelete,
        );
    }
    for order in [Sequential, Random] {
        push(
            "delete_cascade",
            sizes.large_rows,
            sizes.bulk_batch,
            order,
            Plan::DeleteCascade,
        );
    }

    specs
}

pub struct ScenarioDriver<'a, R: Rng> {
    schema: &'a Schema,
    data_dir: PathBuf,
    script_dir: PathBuf,
    output_dir: PathBuf,
    rng: &'a mut R,
    test_no: u32,
}

impl<'a, R: Rng> ScenarioDriver<'a, R> {
    pub fn new(
        schema: &'a Schema,
        data_dir: &Path,
        script_dir: &Path,
        output_dir: &Path,
        rng: &'a mut R,
    ) -> Self {
        ScenarioDriver {
            schema,
            data_dir: data_dir.to_path_buf(),
            script_dir: script_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            rng,
            test_no: 0,
        }
    }

    /// Run every scenario in the matrix; returns the written file pairs.
    pub fn run_all(&mut self, sizes: Sizes) -> anyhow::Result<Vec<(PathBuf, PathBuf)>> {
        let mut pairs = Vec::new();
        for spec in scenario_matrix(sizes) {
            pairs.push(self.run_scenario(&spec)?);
        }
        Ok(pairs)
    }

    /// Generate one script/oracle pair, e.g. `407_insert_update_random.sql`
    /// and `.out`. The test number advances even for scenarios with no
    /// tagged tables, keeping numbering stable across schema edits.
    pub fn run_scenario(&mut self, spec: &ScenarioSpec) -> anyhow::Result<(PathBuf, PathBuf)> {
        let test_name = format!(
            "{}_{}_{}",
            TEST_NUMBER_BASE + self.test_no,
            spec.name,
            spec.order.suffix()
        );
        self.test_no += 1;

        let mut script_tmp = NamedTempFile::new_in(&self.script_dir)
            .with_context(|| format!("creating script temp file for {}", test_name))?;
        let mut oracle_tmp = NamedTempFile::new_in(&self.output_dir)
            .with_context(|| format!("creating oracle temp file for {}", test_name))?;

        {
            let mut emitter = Emitter::new(
                BufWriter::new(script_tmp.as_file_mut()),
                BufWriter::new(oracle_tmp.as_file_mut()),
            );
            emitter.write_header(&test_name)?;

            let tables = self.schema.tables_for(spec.name);
            match spec.plan {
                Plan::Insert => {
                    gen_insert(&mut emitter, &self.data_dir, &tables, spec, true)?;
                }
                Plan::InsertUpdate => {
                    gen_insert(&mut emitter, &self.data_dir, &tables, spec, true)?;
                    gen_update(&mut emitter, &tables, spec, self.rng)?;
                }
                Plan::UpdateTexts => {
                    gen_insert(&mut emitter, &self.data_dir, &tables, spec, false)?;
                    gen_update_texts(&mut emitter, &tables, spec, self.rng)?;
                }
                Plan::InsertUpdateDelete => {
                    gen_insert(&mut emitter, &self.data_dir, &tables, spec, true)?;
                    gen_update(&mut emitter, &tables, spec, self.rng)?;
                    gen_delete(&mut emitter, &tables, spec, FlagRate::ALL[1], 1)?;
                }
                Plan::DeleteCascade => {
                    gen_insert(&mut emitter, &self.data_dir, &tables, spec, true)?;
                    gen_delete(&mut emitter, &tables, spec, FlagRate::ALL[0], 0)?;
                }
            }
            emitter.flush()?;
        }

        let script_path = self.script_dir.join(format!("{}.sql", test_name));
        let oracle_path = self.output_dir.join(format!("{}.out", test_name));
        script_tmp
            .persist(&script_path)
            .with_context(|| format!("writing {}", script_path.display()))?;
        oracle_tmp
            .persist(&oracle_path)
            .with_context(|| format!("writing {}", oracle_path.display()))?;
        Ok((script_path, oracle_path))
    }
}

/// Create + insert phase: one CREATE and a full batched insert per physical
/// variant, each variant preceded by a blank separator line. Every variant
/// replays the same dataset, so all variants of a table hold identical rows.
fn gen_insert<S, O>(
    emitter: &mut Emitter<S, O>,
    data_dir: &Path,
    tables: &[&LogicalTable],
    spec: &ScenarioSpec,
    include_no_pk: bool,
) -> Result<(), GenError>
where
    S: std::io::Write,
    O: std::io::Write,
{
    for table in tables {
        for variant in expand_variants(table, &FlagRate::ALL, include_no_pk) {
            emitter.blank_line()?;
            emitter.emit_create(&variant)?;
            let lines = dataset::open_rows(data_dir, &table.name, spec.order)?;
            emitter.emit_insert(&variant, lines, spec.rows, spec.batch, &FlagRate::ALL)?;
        }
    }
    Ok(())
}

/// Update phase: one UPDATE per variant, gated on the first flag rate and
/// targeting the first non-key column.
fn gen_update<S, O, R>(
    emitter: &mut Emitter<S, O>,
    tables: &[&LogicalTable],
    spec: &ScenarioSpec,
    rng: &mut R,
) -> Result<(), GenError>
where
    S: std::io::Write,
    O: std::io::Write,
    R: Rng,
{
    emitter.blank_line()?;
    for table in tables {
        for variant in expand_variants(table, &FlagRate::ALL, true) {
            if let Some(target) = variant.first_non_key_column() {
                emitter.emit_update(&variant, target, FlagRate::ALL[0], spec.rows, rng)?;
            }
        }
    }
    Ok(())
}

/// Update phase for keyed variants only, rotating the target one column past
/// the key so every column type (text included) gets updated somewhere.
fn gen_update_texts<S, O, R>(
    emitter: &mut Emitter<S, O>,
    tables: &[&LogicalTable],
    spec: &ScenarioSpec,
    rng: &mut R,
) -> Result<(), GenError>
where
    S: std::io::Write,
    O: std::io::Write,
    R: Rng,
{
    emitter.blank_line()?;
    for table in tables {
        for variant in expand_variants(table, &FlagRate::ALL, false) {
            let key = variant.primary_key.unwrap_or(0);
            let target = &variant.columns[(key + 1) % variant.base_columns];
            emitter.emit_update(&variant, target, FlagRate::ALL[0], spec.rows, rng)?;
        }
    }
    Ok(())
}

/// Delete phase: one flag-gated DELETE per variant.
fn gen_delete<S, O>(
    emitter: &mut Emitter<S, O>,
    tables: &[&LogicalTable],
    spec: &ScenarioSpec,
    rate: FlagRate,
    comparison: i64,
) -> Result<(), GenError>
where
    S: std::io::Write,
    O: std::io::Write,
{
    emitter.blank_line()?;
    for table in tables {
        for variant in expand_variants(table, &FlagRate::ALL, true) {
            emitter.emit_delete(&variant, rate, comparison, spec.rows)?;
        }
    }
    Ok(())
}
