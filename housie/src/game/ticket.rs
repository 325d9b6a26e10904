//! Ticket generation.
//!
//! A ticket is built in four passes: spread the fixed column distribution
//! over the nine columns, fill each column from its band, rebalance rows
//! to five numbers each, and sort every column. The result is validated
//! and the whole attempt is retried a bounded number of times.

use log::{debug, error};
use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};

use super::{
    constants::{
        COLUMN_DISTRIBUTION, COLUMNS, DEFAULT_MAX_GENERATION_ATTEMPTS, DEFAULT_MAX_REPAIR_STEPS,
        NUMBERS_PER_ROW, ROWS,
    },
    entities::{CalledNumbers, Grid, Number, Ticket, column_band},
    errors::{GameError, GameResult, TicketError},
};

/// Produces fresh, independent tickets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TicketGenerator {
    max_attempts: usize,
    max_repair_steps: usize,
}

impl Default for TicketGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_GENERATION_ATTEMPTS, DEFAULT_MAX_REPAIR_STEPS)
    }
}

impl TicketGenerator {
    #[must_use]
    pub const fn new(max_attempts: usize, max_repair_steps: usize) -> Self {
        Self {
            max_attempts,
            max_repair_steps,
        }
    }

    /// Generates one valid ticket.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GenerationInvariantFailure`] if no valid
    /// layout was found within the attempt bound.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> GameResult<Ticket> {
        let mut last = TicketError::RepairStalled { steps: 0 };
        for attempt in 1..=self.max_attempts {
            match self.attempt(rng) {
                Ok(ticket) => return Ok(ticket),
                Err(e) => {
                    debug!("ticket attempt {attempt} rejected: {e}");
                    last = e;
                }
            }
        }

        error!(
            "ticket generation gave up after {} attempts: {last}",
            self.max_attempts
        );
        Err(GameError::GenerationInvariantFailure {
            attempts: self.max_attempts,
            last,
        })
    }

    fn attempt<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Ticket, TicketError> {
        let mut layout = Layout::default();

        let mut counts = COLUMN_DISTRIBUTION;
        counts.shuffle(rng);

        for (c, &count) in counts.iter().enumerate() {
            let mut free_rows: Vec<usize> = (0..ROWS).collect();
            for _ in 0..count {
                let number = layout.unused_in_band(c, rng)?;
                let row = free_rows.swap_remove(rng.random_range(0..free_rows.len()));
                layout.place(row, c, number);
            }
        }

        self.repair(&mut layout, rng)?;
        layout.sort_columns();

        Ticket::try_from(layout.grid)
    }

    /// Rebalances rows until each holds exactly five numbers. Over-full
    /// rows hand numbers down to under-full rows first; under-full rows
    /// that can't be topped up that way get fresh numbers.
    fn repair<R: Rng + ?Sized>(&self, layout: &mut Layout, rng: &mut R) -> Result<(), TicketError> {
        for _ in 0..self.max_repair_steps {
            let counts = layout.row_counts();
            if counts.iter().all(|&n| n == NUMBERS_PER_ROW) {
                return Ok(());
            }

            if let Some(over) = (0..ROWS).find(|&r| counts[r] > NUMBERS_PER_ROW) {
                let moves: Vec<(usize, usize)> = (0..COLUMNS)
                    .filter(|&c| layout.grid[over][c].is_some())
                    .flat_map(|c| {
                        (0..ROWS)
                            .filter(move |&t| t != over && counts[t] < NUMBERS_PER_ROW)
                            .map(move |t| (c, t))
                    })
                    .filter(|&(c, t)| layout.grid[t][c].is_none())
                    .collect();

                if let Some(&(c, target)) = moves.choose(rng) {
                    layout.grid[target][c] = layout.grid[over][c].take();
                    continue;
                }
            }

            if let Some(under) = (0..ROWS).find(|&r| counts[r] < NUMBERS_PER_ROW) {
                let open: Vec<usize> = (0..COLUMNS)
                    .filter(|&c| layout.grid[under][c].is_none() && layout.column_count(c) < ROWS)
                    .collect();

                if let Some(&c) = open.choose(rng) {
                    let number = layout.unused_in_band(c, rng)?;
                    layout.place(under, c, number);
                    continue;
                }
            }

            break;
        }

        if layout.row_counts().iter().all(|&n| n == NUMBERS_PER_ROW) {
            Ok(())
        } else {
            Err(TicketError::RepairStalled {
                steps: self.max_repair_steps,
            })
        }
    }
}

/// Grid under construction plus the numbers already placed on it.
#[derive(Debug, Default)]
struct Layout {
    grid: Grid,
    used: CalledNumbers,
}

impl Layout {
    fn place(&mut self, row: usize, column: usize, number: Number) {
        self.used.insert(number);
        self.grid[row][column] = Some(number);
    }

    fn unused_in_band<R: Rng + ?Sized>(
        &self,
        column: usize,
        rng: &mut R,
    ) -> Result<Number, TicketError> {
        let (low, high) = column_band(column);
        let candidates: Vec<Number> = (low..=high).filter(|&n| !self.used.contains(n)).collect();
        candidates
            .choose(rng)
            .copied()
            .ok_or(TicketError::BandExhausted { column })
    }

    fn row_counts(&self) -> [usize; ROWS] {
        self.grid.map(|row| row.iter().flatten().count())
    }

    fn column_count(&self, column: usize) -> usize {
        self.grid.iter().filter(|row| row[column].is_some()).count()
    }

    fn sort_columns(&mut self) {
        for c in 0..COLUMNS {
            let mut values: Vec<Number> = self.grid.iter().filter_map(|row| row[c]).collect();
            values.sort_unstable();
            let mut values = values.into_iter();
            for row in &mut self.grid {
                if row[c].is_some() {
                    row[c] = values.next();
                }
            }
        }
    }
}
