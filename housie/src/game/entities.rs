use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    constants::{COLUMNS, MAX_NUMBER, NUMBERS_PER_ROW, NUMBERS_PER_TICKET, ROWS},
    errors::{CalledNumbersError, GameError, TicketError},
};

/// A number from the pool, `1..=90`.
pub type Number = u8;

/// Points awarded for a claimed prize.
pub type Points = u32;

/// Identifies a ticket (and so a player) within one session.
pub type TicketId = u64;

/// Inclusive range of numbers allowed in a ticket column.
///
/// Columns past the last one are clamped to it, matching [`column_of`].
#[must_use]
pub const fn column_band(column: usize) -> (Number, Number) {
    let column = if column >= COLUMNS { COLUMNS - 1 } else { column };
    let low = (column * 10 + 1) as Number;
    if column >= COLUMNS - 1 {
        (low, MAX_NUMBER)
    } else {
        (low, low + 9)
    }
}

/// Column a number belongs to.
#[must_use]
pub const fn column_of(number: Number) -> usize {
    let column = number.saturating_sub(1) as usize / 10;
    if column >= COLUMNS { COLUMNS - 1 } else { column }
}

pub type Grid = [[Option<Number>; COLUMNS]; ROWS];

/// A 3x9 Housie ticket holding 15 numbers.
///
/// Tickets can only be built through [`Ticket::from_grid`] or the
/// ticket generator, so every value of this type satisfies the layout
/// rules: five numbers per row, one to three per column, values inside
/// the column band, ascending down each column and no duplicates.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Ticket {
    rows: Grid,
}

impl Ticket {
    /// Builds a ticket from a grid where `0` marks a blank cell.
    pub fn from_grid(grid: [[Number; COLUMNS]; ROWS]) -> Result<Self, TicketError> {
        let mut rows: Grid = [[None; COLUMNS]; ROWS];
        for (r, row) in grid.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if value != 0 {
                    rows[r][c] = Some(value);
                }
            }
        }
        Self::try_from(rows)
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<Number> {
        self.rows.get(row)?.get(column).copied().flatten()
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.rows
    }

    /// Filled values of one row, left to right. Empty past the last row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = Number> + '_ {
        self.rows.get(row).into_iter().flatten().flatten().copied()
    }

    /// Filled values of one column, top to bottom. Empty past the last
    /// column.
    pub fn column(&self, column: usize) -> impl Iterator<Item = Number> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.get(column).copied().flatten())
    }

    /// All 15 values, row by row.
    pub fn numbers(&self) -> impl Iterator<Item = Number> + '_ {
        self.rows.iter().flatten().flatten().copied()
    }

    #[must_use]
    pub fn contains(&self, number: Number) -> bool {
        self.numbers().any(|n| n == number)
    }

    /// How many of this ticket's numbers have been called.
    #[must_use]
    pub fn marked(&self, called: &CalledNumbers) -> usize {
        self.numbers().filter(|&n| called.contains(n)).count()
    }

    /// Checks every layout rule, reporting the first one broken.
    pub fn validate(grid: &Grid) -> Result<(), TicketError> {
        let total = grid.iter().flatten().flatten().count();
        if total != NUMBERS_PER_TICKET {
            return Err(TicketError::WrongTotal { found: total });
        }

        for (r, row) in grid.iter().enumerate() {
            let found = row.iter().flatten().count();
            if found != NUMBERS_PER_ROW {
                return Err(TicketError::RowCount { row: r, found });
            }
        }

        let mut seen = CalledNumbers::new();
        for c in 0..COLUMNS {
            let (low, high) = column_band(c);
            let values: Vec<Number> = grid.iter().filter_map(|row| row[c]).collect();
            if values.is_empty() || values.len() > ROWS {
                return Err(TicketError::ColumnCount {
                    column: c,
                    found: values.len(),
                });
            }
            for &value in &values {
                if !(low..=high).contains(&value) {
                    return Err(TicketError::OutOfBand { column: c, value });
                }
                if !seen.insert(value) {
                    return Err(TicketError::Duplicate(value));
                }
            }
            if values.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(TicketError::NotAscending { column: c });
            }
        }

        Ok(())
    }
}

impl TryFrom<Grid> for Ticket {
    type Error = TicketError;

    fn try_from(rows: Grid) -> Result<Self, Self::Error> {
        Self::validate(&rows)?;
        Ok(Self { rows })
    }
}

impl<'de> Deserialize<'de> for Ticket {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            rows: Grid,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::try_from(raw.rows).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}", "----+".repeat(COLUMNS));
        writeln!(f, "{border}")?;
        for row in &self.rows {
            write!(f, "|")?;
            for cell in row {
                match cell {
                    Some(n) => write!(f, " {n:>2} |")?,
                    None => write!(f, "    |")?,
                }
            }
            writeln!(f)?;
            writeln!(f, "{border}")?;
        }
        Ok(())
    }
}

/// Numbers called so far, in the order they were called.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "Vec<Number>", into = "Vec<Number>")]
pub struct CalledNumbers {
    order: Vec<Number>,
    /// Bit `n` is set when `n` has been called.
    mask: u128,
}

impl CalledNumbers {
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: Vec::with_capacity(MAX_NUMBER as usize),
            mask: 0,
        }
    }

    #[must_use]
    pub fn contains(&self, number: Number) -> bool {
        number <= MAX_NUMBER && self.mask & (1u128 << number) != 0
    }

    /// Adds a number, returning `false` if it was already called or is
    /// outside the pool.
    pub(crate) fn insert(&mut self, number: Number) -> bool {
        if number == 0 || number > MAX_NUMBER || self.contains(number) {
            return false;
        }
        self.mask |= 1u128 << number;
        self.order.push(number);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        MAX_NUMBER as usize - self.order.len()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    #[must_use]
    pub fn last(&self) -> Option<Number> {
        self.order.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Number> + '_ {
        self.order.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Number] {
        &self.order
    }
}

/// Collects numbers, skipping repeats and values outside the pool.
impl FromIterator<Number> for CalledNumbers {
    fn from_iter<I: IntoIterator<Item = Number>>(iter: I) -> Self {
        let mut called = Self::new();
        for number in iter {
            called.insert(number);
        }
        called
    }
}

impl TryFrom<Vec<Number>> for CalledNumbers {
    type Error = CalledNumbersError;

    fn try_from(value: Vec<Number>) -> Result<Self, Self::Error> {
        let mut called = Self::new();
        for number in value {
            if number == 0 || number > MAX_NUMBER {
                return Err(CalledNumbersError::OutOfPool(number));
            }
            if !called.insert(number) {
                return Err(CalledNumbersError::Repeated(number));
            }
        }
        Ok(called)
    }
}

impl From<CalledNumbers> for Vec<Number> {
    fn from(value: CalledNumbers) -> Self {
        value.order
    }
}

/// Winning patterns, in the order they are usually announced.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Prize {
    EarlyFive,
    TopLine,
    MiddleLine,
    BottomLine,
    FullHouse,
}

impl Prize {
    pub const ALL: [Prize; 5] = [
        Prize::EarlyFive,
        Prize::TopLine,
        Prize::MiddleLine,
        Prize::BottomLine,
        Prize::FullHouse,
    ];

    #[must_use]
    pub const fn points(self) -> Points {
        match self {
            Self::EarlyFive => 25,
            Self::TopLine | Self::MiddleLine | Self::BottomLine => 50,
            Self::FullHouse => 100,
        }
    }

    /// Ticket row this prize is about, for the three line prizes.
    #[must_use]
    pub const fn line(self) -> Option<usize> {
        match self {
            Self::TopLine => Some(0),
            Self::MiddleLine => Some(1),
            Self::BottomLine => Some(2),
            Self::EarlyFive | Self::FullHouse => None,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Prize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::EarlyFive => "Early Five",
            Self::TopLine => "Top Line",
            Self::MiddleLine => "Middle Line",
            Self::BottomLine => "Bottom Line",
            Self::FullHouse => "Full House",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizeStatus {
    #[default]
    Unclaimed,
    Available,
    Claimed,
}

impl fmt::Display for PrizeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Unclaimed => "unclaimed",
            Self::Available => "available",
            Self::Claimed => "claimed",
        };
        write!(f, "{repr}")
    }
}

/// Status of every prize for a single ticket.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClaimState {
    statuses: [PrizeStatus; Prize::ALL.len()],
}

impl ClaimState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self, prize: Prize) -> PrizeStatus {
        self.statuses[prize.index()]
    }

    /// Moves an unclaimed prize to available. Returns `true` only when
    /// the status actually changed.
    pub(crate) fn make_available(&mut self, prize: Prize) -> bool {
        let status = &mut self.statuses[prize.index()];
        if *status == PrizeStatus::Unclaimed {
            *status = PrizeStatus::Available;
            true
        } else {
            false
        }
    }

    /// Claims an available prize and returns its points.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnclaimablePrize`] and leaves the state
    /// untouched if the prize is not currently available.
    pub fn claim(&mut self, prize: Prize) -> Result<Points, GameError> {
        let status = &mut self.statuses[prize.index()];
        match *status {
            PrizeStatus::Available => {
                *status = PrizeStatus::Claimed;
                Ok(prize.points())
            }
            other => Err(GameError::UnclaimablePrize {
                prize,
                status: other,
            }),
        }
    }

    pub fn available(&self) -> impl Iterator<Item = Prize> + '_ {
        Prize::ALL
            .into_iter()
            .filter(|&prize| self.status(prize) == PrizeStatus::Available)
    }

    #[must_use]
    pub fn points(&self) -> Points {
        Prize::ALL
            .into_iter()
            .filter(|&prize| self.status(prize) == PrizeStatus::Claimed)
            .map(Prize::points)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [[Number; COLUMNS]; ROWS] = [
        [5, 12, 0, 34, 0, 56, 0, 71, 0],
        [0, 15, 23, 0, 41, 0, 62, 0, 85],
        [7, 0, 29, 0, 0, 58, 0, 78, 90],
    ];

    // === Band Tests ===

    #[test]
    fn test_column_bands_cover_pool() {
        let mut covered = Vec::new();
        for c in 0..COLUMNS {
            let (low, high) = column_band(c);
            covered.extend(low..=high);
        }
        let expected: Vec<Number> = (1..=MAX_NUMBER).collect();
        assert_eq!(covered, expected);
    }

    #[test]
    fn test_column_of_edges() {
        assert_eq!(column_of(1), 0);
        assert_eq!(column_of(10), 0);
        assert_eq!(column_of(11), 1);
        assert_eq!(column_of(80), 7);
        assert_eq!(column_of(81), 8);
        assert_eq!(column_of(90), 8);
    }

    // === Ticket Tests ===

    #[test]
    fn test_ticket_from_valid_grid() {
        let ticket = Ticket::from_grid(SAMPLE).unwrap();
        assert_eq!(ticket.numbers().count(), 15);
        assert_eq!(ticket.row(0).collect::<Vec<_>>(), vec![5, 12, 34, 56, 71]);
        assert_eq!(ticket.column(0).collect::<Vec<_>>(), vec![5, 7]);
        assert_eq!(ticket.cell(1, 8), Some(85));
        assert_eq!(ticket.cell(0, 2), None);
        assert!(ticket.contains(90));
        assert!(!ticket.contains(1));
    }

    #[test]
    fn test_ticket_out_of_range_lookups_are_empty() {
        let ticket = Ticket::from_grid(SAMPLE).unwrap();
        assert_eq!(ticket.row(ROWS).count(), 0);
        assert_eq!(ticket.column(COLUMNS).count(), 0);
        assert_eq!(ticket.cell(ROWS, 0), None);
        assert_eq!(column_band(COLUMNS), column_band(COLUMNS - 1));
        assert_eq!(column_band(usize::MAX / 20), (81, 90));
    }

    #[test]
    fn test_ticket_rejects_sparse_grid() {
        let mut grid = [[0; COLUMNS]; ROWS];
        grid[0][0] = 1;
        grid[1][1] = 11;
        let err = Ticket::from_grid(grid).unwrap_err();
        assert_eq!(err, TicketError::WrongTotal { found: 2 });
    }

    #[test]
    fn test_ticket_rejects_unbalanced_rows() {
        let grid = [
            [5, 12, 0, 34, 41, 56, 0, 71, 0],
            [0, 15, 23, 0, 0, 0, 62, 0, 85],
            [7, 0, 29, 0, 0, 58, 0, 78, 90],
        ];
        let err = Ticket::from_grid(grid).unwrap_err();
        assert_eq!(err, TicketError::RowCount { row: 0, found: 6 });
    }

    #[test]
    fn test_ticket_rejects_out_of_band_value() {
        let mut grid = SAMPLE;
        grid[0][1] = 21;
        let err = Ticket::from_grid(grid).unwrap_err();
        assert_eq!(err, TicketError::OutOfBand { column: 1, value: 21 });
    }

    #[test]
    fn test_ticket_rejects_descending_column() {
        let mut grid = SAMPLE;
        grid[0][0] = 7;
        grid[2][0] = 5;
        let err = Ticket::from_grid(grid).unwrap_err();
        assert_eq!(err, TicketError::NotAscending { column: 0 });
    }

    #[test]
    fn test_ticket_rejects_duplicates() {
        let mut grid = SAMPLE;
        grid[2][0] = 5;
        let err = Ticket::from_grid(grid).unwrap_err();
        assert_eq!(err, TicketError::Duplicate(5));
    }

    #[test]
    fn test_ticket_rejects_empty_column() {
        let grid = [
            [5, 12, 0, 34, 0, 56, 0, 71, 0],
            [0, 13, 23, 0, 41, 0, 62, 75, 0],
            [7, 0, 29, 0, 44, 58, 0, 78, 0],
        ];
        let err = Ticket::from_grid(grid).unwrap_err();
        assert_eq!(err, TicketError::ColumnCount { column: 8, found: 0 });
    }

    #[test]
    fn test_ticket_display_shows_every_number() {
        let ticket = Ticket::from_grid(SAMPLE).unwrap();
        let rendered = ticket.to_string();
        assert_eq!(rendered.lines().count(), 7);
        for n in ticket.numbers() {
            assert!(rendered.contains(&format!("{n:>2}")));
        }
    }

    #[test]
    fn test_ticket_deserialize_validates() {
        let ticket = Ticket::from_grid(SAMPLE).unwrap();
        let json = serde_json::to_string(&ticket).unwrap();
        let back: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ticket);

        let bad = json.replacen("5", "9", 1);
        assert!(serde_json::from_str::<Ticket>(&bad).is_err());
    }

    // === CalledNumbers Tests ===

    #[test]
    fn test_called_numbers_keeps_order() {
        let called: CalledNumbers = [42, 7, 90].into_iter().collect();
        assert_eq!(called.as_slice(), &[42, 7, 90]);
        assert_eq!(called.last(), Some(90));
        assert_eq!(called.remaining(), 87);
    }

    #[test]
    fn test_called_numbers_rejects_repeats_and_out_of_pool() {
        let mut called = CalledNumbers::new();
        assert!(called.insert(1));
        assert!(!called.insert(1));
        assert!(!called.insert(0));
        assert!(!called.insert(91));
        assert_eq!(called.len(), 1);
        assert!(!called.contains(0));
        assert!(!called.contains(200));
    }

    #[test]
    fn test_called_numbers_deserialize_validates() {
        let called: CalledNumbers = serde_json::from_str("[42,7,90]").unwrap();
        assert_eq!(called.as_slice(), &[42, 7, 90]);
        assert!(called.contains(7));

        for bad in ["[5,5,7]", "[5,200]", "[0,7]"] {
            assert!(
                serde_json::from_str::<CalledNumbers>(bad).is_err(),
                "{bad} should be rejected"
            );
        }
        assert_eq!(
            CalledNumbers::try_from(vec![5, 5, 200, 0, 7]).unwrap_err(),
            CalledNumbersError::Repeated(5)
        );
        assert_eq!(
            CalledNumbers::try_from(vec![200]).unwrap_err(),
            CalledNumbersError::OutOfPool(200)
        );
    }

    #[test]
    fn test_called_numbers_exhausts_at_ninety() {
        let called: CalledNumbers = (1..=MAX_NUMBER).collect();
        assert!(called.is_exhausted());
        assert!(called.contains(90));
    }

    // === Prize Tests ===

    #[test]
    fn test_prize_points() {
        assert_eq!(Prize::EarlyFive.points(), 25);
        assert_eq!(Prize::TopLine.points(), 50);
        assert_eq!(Prize::MiddleLine.points(), 50);
        assert_eq!(Prize::BottomLine.points(), 50);
        assert_eq!(Prize::FullHouse.points(), 100);
    }

    #[test]
    fn test_prize_display() {
        assert_eq!(Prize::EarlyFive.to_string(), "Early Five");
        assert_eq!(Prize::FullHouse.to_string(), "Full House");
    }

    #[test]
    fn test_claim_requires_available() {
        let mut claims = ClaimState::new();
        let err = claims.claim(Prize::FullHouse).unwrap_err();
        assert!(matches!(
            err,
            GameError::UnclaimablePrize {
                prize: Prize::FullHouse,
                status: PrizeStatus::Unclaimed
            }
        ));
        assert_eq!(claims, ClaimState::new());

        assert!(claims.make_available(Prize::FullHouse));
        assert_eq!(claims.claim(Prize::FullHouse).unwrap(), 100);
        assert_eq!(claims.status(Prize::FullHouse), PrizeStatus::Claimed);
    }

    #[test]
    fn test_claimed_prize_never_regresses() {
        let mut claims = ClaimState::new();
        claims.make_available(Prize::TopLine);
        claims.claim(Prize::TopLine).unwrap();
        assert!(!claims.make_available(Prize::TopLine));
        assert!(claims.claim(Prize::TopLine).is_err());
        assert_eq!(claims.points(), 50);
    }
}
