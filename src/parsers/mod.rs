//! Endpoint-specific parsers built on the graph engine.
//!
//! Each parser owns its projection maps and post-processing. Shape
//! irregularities are absorbed as absent fields; only a genuinely missing
//! entity the caller asked for surfaces as a [`ParseError`].

pub mod company;
pub mod positions;
pub mod posts;
pub mod profile;
pub mod search;
pub mod sections;

use thiserror::Error;

/// Errors raised by domain parsers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Search result is missing {0}")]
    IncompleteResult(&'static str),
}
