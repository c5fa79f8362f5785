//! The alignment result record.
//!
//! One immutable bundle of scores, coordinates, CIGAR and the two input
//! strings. The only mutation allowed after construction is the coordinate
//! base toggle, which shifts every reported coordinate in place without
//! touching the underlying alignment. Fields are reachable both through
//! named getters and through the [`AlignmentResult::get`] key lookup; both
//! views read the same storage.

/// Begin/end coordinates are inclusive positions in the reported base
/// (0-based by default). `query_begin`, `target_begin` and `cigar` are absent
/// when the filter policy skipped the reverse/traceback passes; the
/// suboptimal fields are absent when the mask policy disabled the suboptimal
/// search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    optimal_alignment_score: i32,
    suboptimal_alignment_score: Option<i32>,
    query_begin: Option<i32>,
    query_end: i32,
    target_begin: Option<i32>,
    target_end_optimal: i32,
    target_end_suboptimal: Option<i32>,
    cigar: Option<String>,
    query_sequence: String,
    target_sequence: String,
    zero_based: bool,
}

/// A borrowed view of one result field, for the key-lookup access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Int(i32),
    Text(&'a str),
    /// The field exists but was skipped by the filter/mask policy.
    Absent,
}

impl AlignmentResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        optimal_alignment_score: i32,
        suboptimal: Option<(i32, i32)>,
        query_begin: Option<i32>,
        query_end: i32,
        target_begin: Option<i32>,
        target_end_optimal: i32,
        cigar: Option<String>,
        query_sequence: String,
        target_sequence: String,
        zero_index: bool,
    ) -> Self {
        let (suboptimal_alignment_score, target_end_suboptimal) = match suboptimal {
            Some((score, end)) => (Some(score), Some(end)),
            None => (None, None),
        };
        let mut result = AlignmentResult {
            optimal_alignment_score,
            suboptimal_alignment_score,
            query_begin,
            query_end,
            target_begin,
            target_end_optimal,
            target_end_suboptimal,
            cigar,
            query_sequence,
            target_sequence,
            zero_based: true,
        };
        if !zero_index {
            result.set_zero_based(false);
        }
        result
    }

    pub fn optimal_alignment_score(&self) -> i32 {
        self.optimal_alignment_score
    }

    pub fn suboptimal_alignment_score(&self) -> Option<i32> {
        self.suboptimal_alignment_score
    }

    pub fn query_begin(&self) -> Option<i32> {
        self.query_begin
    }

    pub fn query_end(&self) -> i32 {
        self.query_end
    }

    pub fn target_begin(&self) -> Option<i32> {
        self.target_begin
    }

    pub fn target_end_optimal(&self) -> i32 {
        self.target_end_optimal
    }

    pub fn target_end_suboptimal(&self) -> Option<i32> {
        self.target_end_suboptimal
    }

    pub fn cigar(&self) -> Option<&str> {
        self.cigar.as_deref()
    }

    pub fn query_sequence(&self) -> &str {
        &self.query_sequence
    }

    pub fn target_sequence(&self) -> &str {
        &self.target_sequence
    }

    /// Whether coordinates are currently reported 0-based.
    pub fn is_zero_based(&self) -> bool {
        self.zero_based
    }

    /// Switch every reported coordinate between 0-based and 1-based.
    /// Idempotent: setting the base it already has changes nothing.
    pub fn set_zero_based(&mut self, zero_based: bool) {
        if zero_based == self.zero_based {
            return;
        }
        let delta = if zero_based { -1 } else { 1 };
        self.query_end += delta;
        self.target_end_optimal += delta;
        if let Some(v) = self.query_begin.as_mut() {
            *v += delta;
        }
        if let Some(v) = self.target_begin.as_mut() {
            *v += delta;
        }
        if let Some(v) = self.target_end_suboptimal.as_mut() {
            *v += delta;
        }
        self.zero_based = zero_based;
    }

    /// Key lookup over the same fields the named getters expose. Returns
    /// `None` for unknown keys and `FieldValue::Absent` for fields the
    /// filter/mask policy skipped.
    pub fn get(&self, key: &str) -> Option<FieldValue<'_>> {
        let opt_int = |v: Option<i32>| v.map_or(FieldValue::Absent, FieldValue::Int);
        Some(match key {
            "optimal_alignment_score" => FieldValue::Int(self.optimal_alignment_score),
            "suboptimal_alignment_score" => opt_int(self.suboptimal_alignment_score),
            "query_begin" => opt_int(self.query_begin),
            "query_end" => FieldValue::Int(self.query_end),
            "target_begin" => opt_int(self.target_begin),
            "target_end_optimal" => FieldValue::Int(self.target_end_optimal),
            "target_end_suboptimal" => opt_int(self.target_end_suboptimal),
            "cigar" => self
                .cigar
                .as_deref()
                .map_or(FieldValue::Absent, FieldValue::Text),
            "query_sequence" => FieldValue::Text(&self.query_sequence),
            "target_sequence" => FieldValue::Text(&self.target_sequence),
            _ => return None,
        })
    }
}
