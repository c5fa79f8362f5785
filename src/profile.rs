//! Precomputed, striped query profiles.
//!
//! A profile folds the scoring matrix and the encoded query into per-symbol
//! lookup stripes: for every alphabet symbol, a row of lane vectors whose
//! lane `k`, slot `j` holds the substitution score of that symbol against
//! query position `k * segments + j`. Both widths are built up front — biased
//! `u8` lanes for the narrow kernel and `i16` lanes for the escalated one —
//! so a profile built once can be aligned against any number of targets.
//!
//! The profile is immutable after construction and safe to share read-only
//! across threads; every alignment call allocates its own DP rows.

use crate::alphabet::{Alphabet, EncodedSequence};
use crate::engine;
use crate::error::AlignError;
use crate::filters::Filters;
use crate::result::AlignmentResult;
use crate::scoring::Scoring;
use crate::striped::{VByte, VWord, BYTE_LANES, WORD_LANES};

/// Reusable alignment state for one query under one scoring configuration.
#[derive(Debug)]
pub struct QueryProfile {
    pub(crate) query: EncodedSequence,
    pub(crate) scoring: Scoring,
    pub(crate) bias: u8,
    pub(crate) seg_byte: usize,
    pub(crate) seg_word: usize,
    pub(crate) profile_byte: Vec<VByte>,
    pub(crate) profile_word: Vec<VWord>,
    pub(crate) zero_index: bool,
    pub(crate) suppress_sequences: bool,
}

impl QueryProfile {
    /// Encode the query and precompute both striped score tables.
    ///
    /// Fails with `InvalidSequence` for out-of-alphabet symbols and with
    /// `Configuration` when the scoring was built for a different alphabet.
    pub fn build(
        query: &str,
        alphabet: Alphabet,
        scoring: Scoring,
    ) -> Result<Self, AlignError> {
        if scoring.alphabet() != alphabet {
            return Err(AlignError::Configuration(format!(
                "scoring is configured for the {} alphabet but the profile was requested for {}",
                scoring.alphabet().name(),
                alphabet.name()
            )));
        }
        let query = alphabet.encode(query)?;
        let bias = scoring.bias();
        let (profile_byte, seg_byte) = striped_bytes(query.codes(), &scoring, bias);
        let (profile_word, seg_word) = striped_words(query.codes(), &scoring);
        log::debug!(
            "query profile: {} symbols, {} byte stripes / {} word stripes, bias {}",
            query.len(),
            seg_byte,
            seg_word,
            bias
        );
        Ok(QueryProfile {
            query,
            scoring,
            bias,
            seg_byte,
            seg_word,
            profile_byte,
            profile_word,
            zero_index: true,
            suppress_sequences: false,
        })
    }

    /// Coordinate base for results produced by this profile: 0-based when
    /// true (the default), 1-based otherwise. Results can still be toggled
    /// afterwards via [`AlignmentResult::set_zero_based`].
    pub fn zero_index(mut self, flag: bool) -> Self {
        self.zero_index = flag;
        self
    }

    /// Omit the echo of query/target strings from results.
    pub fn suppress_sequences(mut self, flag: bool) -> Self {
        self.suppress_sequences = flag;
        self
    }

    /// Align this query against a target. The profile is not mutated and may
    /// be reused for arbitrarily many targets.
    pub fn align(&self, target: &str, filters: &Filters) -> Result<AlignmentResult, AlignError> {
        let target = self.scoring.alphabet().encode(target)?;
        Ok(engine::run_alignment(self, &target, filters))
    }

    pub fn query(&self) -> &str {
        self.query.raw()
    }

    pub fn scoring(&self) -> &Scoring {
        &self.scoring
    }
}

/// Striped biased byte table: one stripe row per alphabet symbol, entries
/// `score + bias` so the narrow kernel can run fully unsigned. Padding lanes
/// past the query length hold the bias (score zero).
pub(crate) fn striped_bytes(codes: &[u8], scoring: &Scoring, bias: u8) -> (Vec<VByte>, usize) {
    let n = scoring.alphabet().size();
    let seg = codes.len().div_ceil(BYTE_LANES);
    let mut table = vec![VByte::ZERO; n * seg];
    for sym in 0..n {
        for slot in 0..seg {
            let mut lanes = [bias; BYTE_LANES];
            let mut pos = slot;
            for lane in lanes.iter_mut() {
                if pos < codes.len() {
                    *lane = (scoring.score(sym as u8, codes[pos]) as i16 + bias as i16) as u8;
                }
                pos += seg;
            }
            table[sym * seg + slot] = VByte(lanes);
        }
    }
    (table, seg)
}

/// Striped word table, plain signed scores, zero padding.
pub(crate) fn striped_words(codes: &[u8], scoring: &Scoring) -> (Vec<VWord>, usize) {
    let n = scoring.alphabet().size();
    let seg = codes.len().div_ceil(WORD_LANES);
    let mut table = vec![VWord::ZERO; n * seg];
    for sym in 0..n {
        for slot in 0..seg {
            let mut lanes = [0i16; WORD_LANES];
            let mut pos = slot;
            for lane in lanes.iter_mut() {
                if pos < codes.len() {
                    *lane = scoring.score(sym as u8, codes[pos]) as i16;
                }
                pos += seg;
            }
            table[sym * seg + slot] = VWord(lanes);
        }
    }
    (table, seg)
}
