use thiserror::Error;

use crate::maze::Pos;

/// Failures while reading the packet bit stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("cannot read {requested} bits, only {available} available")]
    OutOfBits { requested: usize, available: usize },

    /// A length-bounded sub-packet group ran past its declared size.
    #[error("sub-packet group declared as {declared} bits overruns its length")]
    MalformedPacket {
        declared: usize,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("cannot read {width} bits at once, at most 64 fit")]
    BitWidth { width: usize },

    #[error("operator type {type_id} cannot take {found} operands")]
    OperandCount { type_id: u8, found: usize },

    #[error("invalid hex input: {0}")]
    InvalidHex(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("maze has no cells")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged { row: usize, found: usize, expected: usize },

    #[error("unexpected cell {cell:?} at ({row}, {col})")]
    BadCell { row: usize, col: usize, cell: char },

    #[error("position {pos:?} lies outside the {rows}x{cols} maze")]
    OutOfBounds { pos: Pos, rows: usize, cols: usize },

    #[error("no open nodes left, but {goal:?} was never reached")]
    NoPathFound { goal: Pos },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Maze(#[from] MazeError),

    #[error("day {0} has no solver")]
    UnknownDay(u8),

    #[error("part must be 1 or 2, got {0}")]
    UnknownPart(u8),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
