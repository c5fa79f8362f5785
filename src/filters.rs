//! Gates around the reverse and traceback passes.
//!
//! Filters never change the optimal-score computation; they only decide how
//! much of the rest of the pipeline runs for a given target.

/// Default exclusion radius around the optimal end column.
pub const DEFAULT_MASK_LEN: usize = 15;

/// Below this radius the second-best locus is too entangled with the optimal
/// one to mean anything, and the suboptimal fields are not reported.
pub(crate) const MIN_MASK_LEN: usize = 15;

#[derive(Debug, Clone)]
pub struct Filters {
    /// Skip the reverse pass and traceback when the optimal score falls below
    /// this; scores and end coordinates are still reported.
    pub score_filter: Option<i32>,
    /// Run the traceback only when `optimal - suboptimal` is at least this
    /// large. When the suboptimal score is not reported the gate passes.
    pub distance_filter: Option<i32>,
    /// Candidates closer than this to the optimal end column are excluded
    /// from the suboptimal search. Values below 15 disable suboptimal
    /// reporting entirely.
    pub mask_length: usize,
    /// Report scores and end coordinates only, skipping the reverse pass and
    /// traceback unconditionally.
    pub score_only: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Filters {
            score_filter: None,
            distance_filter: None,
            mask_length: DEFAULT_MASK_LEN,
            score_only: false,
        }
    }
}

impl Filters {
    /// Widen the mask to half the query length for long queries, the usual
    /// choice when the same filter set serves queries of varying size.
    pub fn with_auto_mask(mut self, query_len: usize) -> Self {
        self.mask_length = self.mask_length.max(query_len / 2);
        self
    }
}
