//! Striped Smith-Waterman local pairwise alignment.
//!
//! The engine computes, for a query/target pair over a nucleotide or protein
//! alphabet: the optimal local alignment score, a suboptimal score at a
//! distinct locus, the aligned coordinate ranges in both sequences, and a
//! run-length CIGAR describing the path.
//!
//! The DP matrix is striped into fixed-width lanes and evaluated with
//! saturating 8-bit arithmetic; when a lane saturates, the affected pass is
//! re-run exactly in 16-bit lanes. A query is preprocessed once into a
//! [`QueryProfile`] and then aligned against any number of targets:
//!
//! ```
//! use striped_align::{Alphabet, Filters, QueryProfile, Scoring};
//!
//! let scoring = Scoring::simple(Alphabet::Nucleotide, 2, -3, 5, 2)?;
//! let profile = QueryProfile::build("ACGT", Alphabet::Nucleotide, scoring)?;
//! let result = profile.align("ACGT", &Filters::default())?;
//! assert_eq!(result.optimal_alignment_score(), 8);
//! assert_eq!(result.cigar(), Some("4M"));
//! # Ok::<(), striped_align::AlignError>(())
//! ```

pub mod alphabet;
pub mod cigar;
pub mod error;
pub mod filters;
pub mod profile;
pub mod result;
pub mod scoring;

mod banded;
mod engine;
mod striped;

pub use alphabet::{Alphabet, EncodedSequence};
pub use error::AlignError;
pub use filters::Filters;
pub use profile::QueryProfile;
pub use result::{AlignmentResult, FieldValue};
pub use scoring::Scoring;
