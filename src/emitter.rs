//! Paired script/oracle emission.
//!
//! An [`Emitter`] owns two output streams and keeps them aligned 1:1 by
//! statement: every SQL statement appended to the script stream is matched
//! by exactly one expected-result line in the oracle stream. Expected counts
//! are derived analytically from [`FlagRate`] arithmetic, never by
//! re-reading or simulating the generated data; the rate type is the single
//! source both for flag values at insert time and for oracle counts, which
//! is what keeps the two streams from drifting apart.

use crate::error::GenError;
use crate::schema::{Column, ColumnType, FlagRate, TableVariant};
use crate::value::ValueGen;
use rand::Rng;
use std::io::{self, Write};

/// Oracle line for a statement affecting `n` rows.
pub fn rows_affected(n: u64) -> String {
    if n == 1 {
        "1 row affected".to_string()
    } else {
        format!("{} rows affected", n)
    }
}

pub struct Emitter<S: Write, O: Write> {
    script: S,
    oracle: O,
}

impl<S: Write, O: Write> Emitter<S, O> {
    pub fn new(script: S, oracle: O) -> Self {
        Emitter { script, oracle }
    }

    /// Two-line script header: the test name and an auto-generation warning.
    pub fn write_header(&mut self, test_name: &str) -> io::Result<()> {
        writeln!(self.script, "# {}", test_name)?;
        writeln!(
            self.script,
            "# This test was auto-generated - do not modify directly"
        )
    }

    /// Blank line separating logical phases in the script stream.
    pub fn blank_line(&mut self) -> io::Result<()> {
        writeln!(self.script)
    }

    pub fn emit_create(&mut self, variant: &TableVariant) -> io::Result<()> {
        let mut defs: Vec<String> = variant
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.ty))
            .collect();
        if let Some(pk) = variant.primary_key_column() {
            defs.push(format!("PRIMARY KEY({})", pk.name));
        }
        writeln!(
            self.script,
            "CREATE TABLE {} ({});",
            variant.name,
            defs.join(", ")
        )?;
        writeln!(self.oracle, "{}", rows_affected(0))
    }

    /// Replay `row_count` dataset lines into batched INSERT statements.
    ///
    /// Each line is a pre-rendered SQL-literal fragment; the flag values for
    /// the row's replay position are appended before splicing it into a
    /// VALUES group. A final batch shorter than `batch_size` is emitted with
    /// its own exact count rather than dropped.
    pub fn emit_insert<I>(
        &mut self,
        variant: &TableVariant,
        mut lines: I,
        row_count: u64,
        batch_size: u64,
        rates: &[FlagRate],
    ) -> Result<(), GenError>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        debug_assert!(batch_size > 0);
        let mut position: u64 = 0;
        while position < row_count {
            let batch = batch_size.min(row_count - position);
            let mut groups = Vec::with_capacity(batch as usize);
            for _ in 0..batch {
                let line = lines.next().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "dataset for {} exhausted at row {} of {}",
                            variant.name, position, row_count
                        ),
                    )
                })??;
                let mut values = line;
                for rate in rates {
                    values.push(',');
                    values.push_str(&rate.flag_value(position, row_count).to_string());
                }
                groups.push(values);
                position += 1;
            }

            if batch == 1 {
                writeln!(self.script, "INSERT INTO {} VALUES ({});", variant.name, groups[0])?;
            } else {
                writeln!(self.script, "INSERT INTO {} VALUES", variant.name)?;
                for (i, values) in groups.iter().enumerate() {
                    let terminator = if i + 1 == groups.len() { ';' } else { ',' };
                    writeln!(self.script, "\t({}){}", values, terminator)?;
                }
            }
            writeln!(self.oracle, "{}", rows_affected(batch))?;
        }
        Ok(())
    }

    /// One UPDATE gated on a flag predicate, with a type-directed SET
    /// expression:
    ///
    /// * `INT` — doubles the column.
    /// * `REAL` — adds one constant drawn here and embedded textually; the
    ///   engine applies the same constant to every matching row.
    /// * `TEXT` — sets a fresh generated string at a random index below
    ///   `row_count`, independent of any existing value (collisions with
    ///   existing rows are allowed).
    pub fn emit_update<R: Rng>(
        &mut self,
        variant: &TableVariant,
        target: &Column,
        rate: FlagRate,
        row_count: u64,
        rng: &mut R,
    ) -> Result<(), GenError> {
        let expr = match target.ty {
            ColumnType::Int => format!("{} * 2", target.name),
            ColumnType::Real => format!("{} + {}", target.name, rng.random::<f64>()),
            ColumnType::Text(_) => {
                let index = rng.random_range(0..row_count);
                ValueGen::for_type(target.ty).value(index, rng)?.render()
            }
        };
        writeln!(
            self.script,
            "UPDATE {} SET {} = {} WHERE {} = 1;",
            variant.name,
            target.name,
            expr,
            rate.column_name()
        )?;
        writeln!(self.oracle, "{}", rows_affected(rate.count(row_count)))?;
        Ok(())
    }

    /// One DELETE gated on a flag predicate. Comparing against 1 removes the
    /// flagged subset; comparing against 0 removes everything else.
    pub fn emit_delete(
        &mut self,
        variant: &TableVariant,
        rate: FlagRate,
        comparison: i64,
        row_count: u64,
    ) -> io::Result<()> {
        let flagged = rate.count(row_count);
        let expected = if comparison == 1 {
            flagged
        } else {
            row_count - flagged
        };
        writeln!(
            self.script,
            "DELETE FROM {} WHERE {} = {};",
            variant.name,
            rate.column_name(),
            comparison
        )?;
        writeln!(self.oracle, "{}", rows_affected(expected))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.script.flush()?;
        self.oracle.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{expand_variants, LogicalTable};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table() -> LogicalTable {
        LogicalTable {
            name: "people".to_string(),
            columns: vec![
                Column {
                    name: "id".to_string(),
                    ty: ColumnType::Int,
                },
                Column {
                    name: "height".to_string(),
                    ty: ColumnType::Real,
                },
                Column {
                    name: "nickname".to_string(),
                    ty: ColumnType::Text(8),
                },
            ],
            scenarios: vec![],
        }
    }

    fn emit_to_strings<F>(f: F) -> (String, String)
    where
        F: FnOnce(&mut Emitter<&mut Vec<u8>, &mut Vec<u8>>),
    {
        let mut script = Vec::new();
        let mut oracle = Vec::new();
        {
            let mut emitter = Emitter::new(&mut script, &mut oracle);
            f(&mut emitter);
            emitter.flush().unwrap();
        }
        (
            String::from_utf8(script).unwrap(),
            String::from_utf8(oracle).unwrap(),
        )
    }

    fn lines(count: u64) -> impl Iterator<Item = io::Result<String>> {
        (0..count).map(|i| Ok(format!("{},{}.5,\"x{}\"", i, i, i)))
    }

    #[test]
    fn create_statement_includes_flags_and_key() {
        let variants = expand_variants(&table(), &FlagRate::ALL, true);
        let (script, oracle) = emit_to_strings(|em| {
            em.emit_create(&variants[0]).unwrap();
            em.emit_create(&variants[1]).unwrap();
        });
        let mut it = script.lines();
        assert_eq!(
            it.next().unwrap(),
            "CREATE TABLE people (id INT, height REAL, nickname TEXT(8), \
             flag_1_in_100 INT, flag_1_in_200 INT);"
        );
        assert_eq!(
            it.next().unwrap(),
            "CREATE TABLE people_pk_id (id INT, height REAL, nickname TEXT(8), \
             flag_1_in_100 INT, flag_1_in_200 INT, PRIMARY KEY(id));"
        );
        assert_eq!(oracle, "0 rows affected\n0 rows affected\n");
    }

    #[test]
    fn single_row_batches_use_singular_oracle_lines() {
        let variants = expand_variants(&table(), &FlagRate::ALL, true);
        let (script, oracle) = emit_to_strings(|em| {
            em.emit_insert(&variants[0], lines(3), 3, 1, &[]).unwrap();
        });
        assert_eq!(
            script,
            "INSERT INTO people VALUES (0,0.5,\"x0\");\n\
             INSERT INTO people VALUES (1,1.5,\"x1\");\n\
             INSERT INTO people VALUES (2,2.5,\"x2\");\n"
        );
        assert_eq!(oracle, "1 row affected\n1 row affected\n1 row affected\n");
    }

    #[test]
    fn multi_row_batches_append_position_flags() {
        let variants = expand_variants(&table(), &FlagRate::ALL, true);
        // 200 rows at rate 1/100 flags the first 2 positions.
        let (script, oracle) = emit_to_strings(|em| {
            em.emit_insert(&variants[0], lines(200), 200, 100, &FlagRate::ALL)
                .unwrap();
        });
        let script_lines: Vec<&str> = script.lines().collect();
        assert_eq!(script_lines[0], "INSERT INTO people VALUES");
        assert_eq!(script_lines[1], "\t(0,0.5,\"x0\",1,1),");
        assert_eq!(script_lines[2], "\t(1,1.5,\"x1\",1,0),");
        assert_eq!(script_lines[3], "\t(2,2.5,\"x2\",0,0),");
        assert!(script_lines[99].ends_with("),"));
        assert!(script_lines[100].ends_with(");"));
        assert!(script_lines[101].starts_with("INSERT INTO people VALUES"));
        assert!(script_lines.last().unwrap().ends_with(");"));
        assert_eq!(oracle, "100 rows affected\n100 rows affected\n");
    }

    #[test]
    fn final_short_batch_is_emitted_with_exact_count() {
        let variants = expand_variants(&table(), &FlagRate::ALL, true);
        let (script, oracle) = emit_to_strings(|em| {
            em.emit_insert(&variants[0], lines(25), 25, 10, &[]).unwrap();
        });
        assert_eq!(
            oracle,
            "10 rows affected\n10 rows affected\n5 rows affected\n"
        );
        assert_eq!(script.matches(';').count(), 3);
    }

    #[test]
    fn exhausted_dataset_is_an_error() {
        let variants = expand_variants(&table(), &FlagRate::ALL, true);
        let mut script = Vec::new();
        let mut oracle = Vec::new();
        let mut emitter = Emitter::new(&mut script, &mut oracle);
        let result = emitter.emit_insert(&variants[0], lines(5), 10, 5, &[]);
        assert!(matches!(result, Err(GenError::Io(_))));
    }

    #[test]
    fn update_expressions_are_type_directed() {
        let variants = expand_variants(&table(), &FlagRate::ALL, false);
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let rate = FlagRate::ALL[0];
        let (script, oracle) = emit_to_strings(|em| {
            let int_col = &variants[0].columns[0];
            let real_col = &variants[0].columns[1];
            let text_col = &variants[0].columns[2];
            em.emit_update(&variants[0], int_col, rate, 10_000, &mut rng)
                .unwrap();
            em.emit_update(&variants[0], real_col, rate, 10_000, &mut rng)
                .unwrap();
            em.emit_update(&variants[0], text_col, rate, 10_000, &mut rng)
                .unwrap();
        });
        let script_lines: Vec<&str> = script.lines().collect();
        assert_eq!(
            script_lines[0],
            "UPDATE people_pk_id SET id = id * 2 WHERE flag_1_in_100 = 1;"
        );
        assert!(script_lines[1].starts_with("UPDATE people_pk_id SET height = height + 0."));
        assert!(script_lines[1].ends_with(" WHERE flag_1_in_100 = 1;"));
        assert!(script_lines[2].starts_with("UPDATE people_pk_id SET nickname = \""));
        // Analytic count: round(10_000 / 100) = 100.
        assert_eq!(
            oracle,
            "100 rows affected\n100 rows affected\n100 rows affected\n"
        );
    }

    #[test]
    fn real_update_embeds_a_single_constant() {
        // The constant is drawn once per statement at generation time; the
        // statement applies the same literal to every matching row.
        let variants = expand_variants(&table(), &FlagRate::ALL, false);
        let mut rng1 = ChaCha8Rng::seed_from_u64(32);
        let mut rng2 = ChaCha8Rng::seed_from_u64(32);
        let rate = FlagRate::ALL[0];
        let real_col = variants[0].columns[1].clone();
        let (a, _) = emit_to_strings(|em| {
            em.emit_update(&variants[0], &real_col, rate, 1000, &mut rng1)
                .unwrap();
        });
        let (b, _) = emit_to_strings(|em| {
            em.emit_update(&variants[0], &real_col, rate, 1000, &mut rng2)
                .unwrap();
        });
        assert_eq!(a, b);
        // One constant, one statement: exactly one '+' in the SET clause.
        assert_eq!(a.matches('+').count(), 1);
    }

    #[test]
    fn delete_counts_cover_both_comparisons() {
        let variants = expand_variants(&table(), &FlagRate::ALL, true);
        let (script, oracle) = emit_to_strings(|em| {
            em.emit_delete(&variants[0], FlagRate::ALL[1], 1, 10_000)
                .unwrap();
            em.emit_delete(&variants[0], FlagRate::ALL[1], 0, 10_000)
                .unwrap();
        });
        let script_lines: Vec<&str> = script.lines().collect();
        assert_eq!(
            script_lines[0],
            "DELETE FROM people WHERE flag_1_in_200 = 1;"
        );
        assert_eq!(
            script_lines[1],
            "DELETE FROM people WHERE flag_1_in_200 = 0;"
        );
        // round(10_000/200) = 50 flagged; negated predicate removes the rest.
        assert_eq!(oracle, "50 rows affected\n9950 rows affected\n");
    }
}
