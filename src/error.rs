//! Error types for adjacency construction and artifact I/O.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Which policy family a rejected name was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Abstention,
    Obstruction,
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyKind::Abstention => f.write_str("abstention"),
            PolicyKind::Obstruction => f.write_str("obstruction"),
        }
    }
}

/// Rejected policy names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("the {kind} policy `{name}` is not supported")]
    UnsupportedPolicy { kind: PolicyKind, name: String },
}

/// Invalid incidence matrix contents.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IncidenceError {
    #[error("vote `{vote}` has unrecognized code {value} for legislator {legislator}")]
    UnrecognizedVoteCode {
        vote: String,
        legislator: i64,
        value: f64,
    },

    #[error("legislator {0} appears in more than one column")]
    DuplicateLegislator(i64),

    #[error("column header `{0}` is not a legislator id")]
    InvalidLegislatorId(String),

    #[error("expected a {expected_rows}x{expected_cols} matrix, got {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
}

/// Invalid adjacency matrix contents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdjacencyError {
    #[error("adjacency matrix over {legislators} legislators must be square, got {rows}x{cols}")]
    NotSquare {
        legislators: usize,
        rows: usize,
        cols: usize,
    },
}

/// Top-level error for the library.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Incidence(#[from] IncidenceError),

    #[error(transparent)]
    Adjacency(#[from] AdjacencyError),

    #[error("adjacency artifact {0} is malformed: {1}")]
    MalformedAdjacency(String, String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
