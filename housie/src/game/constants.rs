//! Fixed dimensions and limits of a Housie game.

use std::time::Duration;

/// Ticket rows.
pub const ROWS: usize = 3;

/// Ticket columns, one per band of ten numbers.
pub const COLUMNS: usize = 9;

/// Filled cells in every ticket row.
pub const NUMBERS_PER_ROW: usize = 5;

/// Filled cells in a whole ticket.
pub const NUMBERS_PER_TICKET: usize = ROWS * NUMBERS_PER_ROW;

/// Highest number in the pool. The pool is `1..=MAX_NUMBER`.
pub const MAX_NUMBER: u8 = 90;

/// How many filled cells each column gets before shuffling. Sums to 15.
pub const COLUMN_DISTRIBUTION: [usize; COLUMNS] = [1, 1, 1, 1, 1, 1, 1, 2, 3];

pub const DEFAULT_CAPACITY: usize = 20;
pub const DEFAULT_COUNTDOWN: Duration = Duration::from_secs(60);
pub const DEFAULT_AUTO_DRAW_INTERVAL: Duration = Duration::from_secs(5);

pub const DEFAULT_MAX_GENERATION_ATTEMPTS: usize = 64;
pub const DEFAULT_MAX_REPAIR_STEPS: usize = 64;
