//! Row composition: per-column value generators driven over a shared index.
//!
//! A composer yields `row_count` rows lazily. In sequential mode the shared
//! index runs `0..row_count`, so every column of row `i+1` is greater than
//! the same column of row `i`. In random mode the indices are a seeded
//! uniform permutation of the same range.
//!
//! Flag values are computed from the row's *position in the emission
//! sequence*, not from the underlying index: in sequential mode the flagged
//! rows are therefore the value-smallest rows, while in random mode they
//! carry arbitrary values. Scenarios rely on this to select a known-size
//! subset via the flag predicate regardless of order mode.
//!
//! A composer is finite and not restartable; regenerating identical rows
//! requires re-invoking with the same seed state.

use crate::error::GenError;
use crate::schema::{Column, FlagRate};
use crate::value::{SqlValue, ValueGen};
use rand::seq::SliceRandom;
use rand::Rng;

/// Row emission order for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMode {
    Sequential,
    Random,
}

impl OrderMode {
    pub const BOTH: [OrderMode; 2] = [OrderMode::Sequential, OrderMode::Random];

    /// File-name suffix for this mode.
    pub fn suffix(&self) -> &'static str {
        match self {
            OrderMode::Sequential => "seq",
            OrderMode::Random => "random",
        }
    }
}

enum IndexOrder {
    Sequential,
    Shuffled(Vec<u64>),
}

/// Lazy sequence of composed rows.
pub struct RowComposer<'a, R: Rng> {
    gens: Vec<ValueGen>,
    rates: Vec<FlagRate>,
    order: IndexOrder,
    row_count: u64,
    position: u64,
    rng: &'a mut R,
}

impl<'a, R: Rng> RowComposer<'a, R> {
    /// Build a composer over `columns`. In random mode the permutation is
    /// drawn from `rng` up front; `REAL` draws then consume the same source
    /// row by row during iteration.
    pub fn new(
        columns: &[Column],
        row_count: u64,
        mode: OrderMode,
        rates: &[FlagRate],
        rng: &'a mut R,
    ) -> Self {
        let gens = columns.iter().map(|c| ValueGen::for_type(c.ty)).collect();
        let order = match mode {
            OrderMode::Sequential => IndexOrder::Sequential,
            OrderMode::Random => {
                let mut indices: Vec<u64> = (0..row_count).collect();
                indices.shuffle(rng);
                IndexOrder::Shuffled(indices)
            }
        };
        RowComposer {
            gens,
            rates: rates.to_vec(),
            order,
            row_count,
            position: 0,
            rng,
        }
    }

    fn compose(&mut self, index: u64, position: u64) -> Result<Vec<SqlValue>, GenError> {
        let mut row = Vec::with_capacity(self.gens.len() + self.rates.len());
        for gen in &self.gens {
            row.push(gen.value(index, self.rng)?);
        }
        for rate in &self.rates {
            row.push(SqlValue::Int(rate.flag_value(position, self.row_count)));
        }
        Ok(row)
    }
}

impl<'a, R: Rng> Iterator for RowComposer<'a, R> {
    type Item = Result<Vec<SqlValue>, GenError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.row_count {
            return None;
        }
        let position = self.position;
        let index = match &self.order {
            IndexOrder::Sequential => position,
            IndexOrder::Shuffled(indices) => indices[position as usize],
        };
        self.position += 1;
        Some(self.compose(index, position))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.row_count - self.position) as usize;
        (remaining, Some(remaining))
    }
}
