use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// The ways a reference file can be unsuitable for random access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformation {
    /// A line other than the last of a sequence has a different byte width.
    MismatchedLineLengths,
    /// A blank line is followed by more residues of the same sequence.
    EmbeddedNewline,
    /// Residue data appears before the first header line.
    OrphanSequence,
    /// A header line carries no name.
    EmptyName,
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Malformation::MismatchedLineLengths => "mismatched line lengths",
            Malformation::EmbeddedNewline => "embedded newline",
            Malformation::OrphanSequence => "sequence data before first header",
            Malformation::EmptyName => "empty sequence name",
        };
        write!(f, "{}", s)
    }
}

/// Errors raised while building, loading, persisting or querying an index.
#[derive(Error, Debug)]
pub enum FaidxError {
    #[error("could not open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(
        "malformed fasta index file {}: expected 5 fields, found {found} @ line {line}",
        .path.display()
    )]
    MalformedIndex {
        path: PathBuf,
        line: u64,
        found: usize,
    },

    #[error("malformed fasta index file {} @ line {line}: {source}", .path.display())]
    IndexField {
        path: PathBuf,
        line: u64,
        source: csv::Error,
    },

    #[error(
        "{kind} at line {line} within sequence {name}; file not suitable for fasta index generation"
    )]
    MalformedReference {
        kind: Malformation,
        line: u64,
        name: String,
    },

    #[error("unable to find FASTA index entry for '{0}'")]
    NotFound(String),

    #[error("invalid region '{region}': {reason}")]
    InvalidRegion { region: String, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl FaidxError {
    pub(crate) fn open<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed_reference(kind: Malformation, line: u64, name: &str) -> Self {
        Self::MalformedReference {
            kind,
            line,
            name: name.to_string(),
        }
    }

    pub(crate) fn invalid_region<S: Into<String>>(region: &str, reason: S) -> Self {
        Self::InvalidRegion {
            region: region.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FaidxError>;
