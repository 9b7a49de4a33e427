//! Board topology: three 4x8 sections joined at the centre

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rows per section
pub const ROWS: u8 = 4;
/// Columns per section
pub const COLUMNS: u8 = 8;
/// Squares per section
pub const SECTION_SIZE: u8 = ROWS * COLUMNS;
/// Squares on the whole board
pub const BOARD_SIZE: usize = 3 * SECTION_SIZE as usize;

// ============================================================================
// COLOUR
// ============================================================================

/// Player colour, also naming the section of the board that player starts in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Colour {
    Blue = 0,
    Green = 1,
    Red = 2,
}

impl Colour {
    /// Fixed enumeration order, which is also the turn order
    pub const ALL: [Colour; 3] = [Colour::Blue, Colour::Green, Colour::Red];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Colour that moves after this one
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % 3]
    }

    /// Section letter used in position codes
    pub fn letter(self) -> char {
        match self {
            Colour::Blue => 'B',
            Colour::Green => 'G',
            Colour::Red => 'R',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'B' => Some(Colour::Blue),
            'G' => Some(Colour::Green),
            'R' => Some(Colour::Red),
            _ => None,
        }
    }

    /// Section reached `offset` steps further along the cycle
    fn offset(self, offset: usize) -> Self {
        Self::ALL[(self.index() + offset) % 3]
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Colour::Blue => "BLUE",
            Colour::Green => "GREEN",
            Colour::Red => "RED",
        };
        f.write_str(name)
    }
}

// ============================================================================
// DIRECTION
// ============================================================================

/// Rectilinear direction relative to a section's own orientation.
/// FORWARD always heads toward the centre of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    /// Mirror image used once a path has crossed into another section
    pub fn reverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

// ============================================================================
// POSITION
// ============================================================================

/// Errors from constructing or walking positions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("no such position: row {row}, column {column}")]
    OutOfRange { row: i32, column: i32 },

    #[error("moved off the board from {from} going {direction:?}")]
    OffBoard { from: Position, direction: Direction },

    #[error("invalid position code: {0:?}")]
    InvalidCode(String),
}

/// One of the 96 squares.
///
/// The wrapped value is the square's index `row + 4*column + 32*section`, so
/// a `Position` can only be obtained from the validated constructors below.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Position(u8);

/// Every position, indexed by `Position::index`
static ALL_POSITIONS: [Position; BOARD_SIZE] = {
    let mut table = [Position(0); BOARD_SIZE];
    let mut i = 0;
    while i < BOARD_SIZE {
        table[i] = Position(i as u8);
        i += 1;
    }
    table
};

impl Position {
    /// Position of the given section, row (0-3) and column (0-7)
    pub fn new(colour: Colour, row: i32, column: i32) -> Result<Self, PositionError> {
        if !(0..ROWS as i32).contains(&row) || !(0..COLUMNS as i32).contains(&column) {
            return Err(PositionError::OutOfRange { row, column });
        }
        Ok(Self::at(colour, row as u8, column as u8))
    }

    /// Unchecked constructor for coordinates already known to be on the board
    pub(crate) const fn at(colour: Colour, row: u8, column: u8) -> Self {
        Position(row + ROWS * column + SECTION_SIZE * colour as u8)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        ALL_POSITIONS.get(index).copied()
    }

    /// All positions in index order
    pub fn all() -> impl Iterator<Item = Position> {
        ALL_POSITIONS.iter().copied()
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn colour(self) -> Colour {
        Colour::ALL[(self.0 / SECTION_SIZE) as usize]
    }

    pub fn row(self) -> u8 {
        self.0 % ROWS
    }

    pub fn column(self) -> u8 {
        (self.0 % SECTION_SIZE) / ROWS
    }

    /// True on the squares a traditional board would colour dark
    pub fn is_even_parity(self) -> bool {
        (self.row() + self.column()) % 2 == 0
    }

    /// Adjacent square in `direction`.
    ///
    /// FORWARD from the centre row crosses into one of the other two sections,
    /// chosen by which half of the row the square is in, with the column
    /// mirrored.
    pub fn neighbour(self, direction: Direction) -> Result<Position, PositionError> {
        let (colour, row, column) = (self.colour(), self.row(), self.column());
        let off_board = PositionError::OffBoard { from: self, direction };
        match direction {
            Direction::Forward if row < ROWS - 1 => Ok(Self::at(colour, row + 1, column)),
            Direction::Forward => {
                let section = if column < COLUMNS / 2 { colour.offset(1) } else { colour.offset(2) };
                Ok(Self::at(section, ROWS - 1, COLUMNS - 1 - column))
            }
            Direction::Backward if row == 0 => Err(off_board),
            Direction::Backward => Ok(Self::at(colour, row - 1, column)),
            Direction::Left if column == 0 => Err(off_board),
            Direction::Left => Ok(Self::at(colour, row, column - 1)),
            Direction::Right if column == COLUMNS - 1 => Err(off_board),
            Direction::Right => Ok(Self::at(colour, row, column + 1)),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.colour().letter(),
            (b'A' + self.column()) as char,
            self.row() + 1
        )
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Position {
    type Err = PositionError;

    /// Parse a code such as `BD2`: section, column A-H, row 1-4
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PositionError::InvalidCode(s.to_string());
        let mut chars = s.trim().chars();
        let (Some(section), Some(column), Some(row), None) =
            (chars.next(), chars.next(), chars.next(), chars.next())
        else {
            return Err(invalid());
        };

        let colour = Colour::from_letter(section).ok_or_else(invalid)?;
        let column = column.to_ascii_uppercase();
        if !column.is_ascii_uppercase() {
            return Err(invalid());
        }
        let row = row.to_digit(10).ok_or_else(invalid)? as i32 - 1;
        Position::new(colour, row, column as i32 - 'A' as i32).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Position {
    type Error = PositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.to_string()
    }
}
