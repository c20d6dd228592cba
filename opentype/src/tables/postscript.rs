//! PostScript (CFF and CFF2) common structures.

use std::fmt;

use crate::ReadError;

mod blend;
pub mod charstring;
pub mod dict;
mod fd_select;
mod index;
mod stack;

pub use blend::BlendState;
pub use charstring::{CommandSink, PenSink};
pub use fd_select::{FdSelect, Range3, Range4};
pub use index::Index;
pub use stack::{Number, Stack};

/// Errors that are specific to PostScript processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The `off_size` field in an INDEX contained an invalid value.
    InvalidIndexOffsetSize(u8),
    /// An INDEX contained a zero offset.
    ZeroOffset,
    InvalidDictOperator(u8),
    InvalidNumber,
    StackOverflow,
    StackUnderflow,
    InvalidStackAccess(usize),
    ExpectedI32StackEntry(usize),
    InvalidCharstringOperator(u8),
    CharstringNestingDepthLimitExceeded,
    MissingSubroutines,
    MissingBlendState,
    MissingPrivateDict,
    MissingCharstrings,
    InvalidVariationStoreIndex(u16),
    /// Underlying parsing error.
    Read(ReadError),
}

impl From<ReadError> for Error {
    fn from(value: ReadError) -> Self {
        Self::Read(value)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndexOffsetSize(size) => {
                write!(f, "invalid offset size of {size} for INDEX (expected 1-4)")
            }
            Self::ZeroOffset => write!(f, "invalid offset of 0 in INDEX (must be >= 1)"),
            Self::InvalidDictOperator(op) => write!(f, "invalid DICT operator {op}"),
            Self::InvalidNumber => write!(f, "invalid number in DICT or charstring"),
            Self::StackOverflow => write!(f, "operand stack overflow"),
            Self::StackUnderflow => write!(f, "operand stack underflow"),
            Self::InvalidStackAccess(index) => {
                write!(f, "invalid operand stack access at index {index}")
            }
            Self::ExpectedI32StackEntry(index) => {
                write!(f, "expected an integer operand at stack index {index}")
            }
            Self::InvalidCharstringOperator(op) => write!(f, "invalid charstring operator {op}"),
            Self::CharstringNestingDepthLimitExceeded => {
                write!(f, "exceeded subroutine nesting depth limit")
            }
            Self::MissingSubroutines => write!(f, "callsubr with no local subroutines"),
            Self::MissingBlendState => write!(f, "blend operator with no variation store"),
            Self::MissingPrivateDict => write!(f, "missing Private DICT"),
            Self::MissingCharstrings => write!(f, "missing charstrings INDEX"),
            Self::InvalidVariationStoreIndex(index) => {
                write!(f, "invalid variation store index {index}")
            }
            Self::Read(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Converts this error into a [`ReadError`] for table loading.
    pub(crate) fn into_read_error(self) -> ReadError {
        match self {
            Self::Read(err) => err,
            Self::InvalidIndexOffsetSize(_) | Self::ZeroOffset => {
                ReadError::MalformedData("invalid INDEX")
            }
            _ => ReadError::MalformedData("invalid PostScript data"),
        }
    }
}
