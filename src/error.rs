//! Error taxonomy for the alignment engine.
//!
//! Two classes only: bad sequence data (per call) and bad configuration
//! (at profile construction). Numeric overflow inside the DP kernels is not
//! an error — it is absorbed by the 8-bit to 16-bit width escalation and
//! never reaches the caller.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignError {
    /// A symbol in the query or target does not belong to the configured
    /// alphabet. Reported immediately; no partial result is produced.
    #[error("invalid symbol {symbol:?} at position {position} for the {alphabet} alphabet")]
    InvalidSequence {
        symbol: char,
        position: usize,
        alphabet: &'static str,
    },

    /// Inconsistent scoring or gap parameters, detected at profile
    /// construction time, never during alignment.
    #[error("configuration error: {0}")]
    Configuration(String),
}
