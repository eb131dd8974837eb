//! Error types
//!
//! Errors are organized by source. Programmer preconditions (indices out of
//! range, malformed variable orders, domain mismatches) are not represented
//! here; those panic immediately. The recoverable errors come from parsing
//! external input, where a typed variant with the offending line number is
//! returned and no partial result is surfaced.

use std::fmt;
use std::io;

/// Errors produced while reading or validating a PLA file.
#[derive(Debug)]
pub enum PlaError {
    /// Underlying I/O failure.
    Io(io::Error),
    /// A required header directive never appeared.
    MissingDirective {
        /// The directive, e.g. `.i`.
        directive: &'static str,
    },
    /// A directive carried a value that could not be parsed.
    InvalidDirective {
        /// 1-based line number.
        line: usize,
        /// The directive, e.g. `.i`.
        directive: String,
        /// The raw value that failed to parse.
        value: String,
    },
    /// An input cube contained an unknown character.
    InvalidInputCharacter {
        /// 1-based line number.
        line: usize,
        /// 0-based position within the cube.
        position: usize,
        character: char,
    },
    /// An output pattern contained an unknown character.
    InvalidOutputCharacter {
        /// 1-based line number.
        line: usize,
        /// 0-based position within the pattern.
        position: usize,
        character: char,
    },
    /// A cube line did not match the declared dimensions.
    DimensionMismatch {
        /// 1-based line number.
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A multi-valued group was not one-hot.
    InvalidGroup {
        /// 1-based line number.
        line: usize,
        /// 0-based group number within the line.
        group: usize,
    },
    /// `.ilb` or `.ob` named a different number of labels than declared.
    LabelCountMismatch {
        /// Either `"input"` or `"output"`.
        kind: &'static str,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for PlaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaError::Io(err) => write!(f, "I/O error while reading PLA file: {err}"),
            PlaError::MissingDirective { directive } => {
                write!(f, "missing required PLA directive {directive}")
            }
            PlaError::InvalidDirective {
                line,
                directive,
                value,
            } => write!(
                f,
                "line {line}: invalid value {value:?} for directive {directive}"
            ),
            PlaError::InvalidInputCharacter {
                line,
                position,
                character,
            } => write!(
                f,
                "line {line}: invalid input character {character:?} at position {position}"
            ),
            PlaError::InvalidOutputCharacter {
                line,
                position,
                character,
            } => write!(
                f,
                "line {line}: invalid output character {character:?} at position {position}"
            ),
            PlaError::DimensionMismatch {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {line}: cube has {found} entries, the header declares {expected}"
            ),
            PlaError::InvalidGroup { line, group } => write!(
                f,
                "line {line}: multi-valued group {group} is not one-hot"
            ),
            PlaError::LabelCountMismatch {
                kind,
                expected,
                found,
            } => write!(
                f,
                "{kind} label count {found} does not match the declared {expected}"
            ),
        }
    }
}

impl std::error::Error for PlaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlaError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PlaError {
    fn from(err: io::Error) -> Self {
        PlaError::Io(err)
    }
}
