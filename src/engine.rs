//! Striped DP engine.
//!
//! Two kernels compute the local-alignment recurrence over striped lanes:
//! a 16-lane unsigned 8-bit kernel with the scoring bias folded into the
//! profile, and an 8-lane signed 16-bit kernel the engine escalates to when
//! the narrow lanes saturate. Saturation is detected exactly (best + bias
//! reaching the lane ceiling) and the affected pass is re-run whole in the
//! wider width; it is never reported to the caller.
//!
//! A full alignment is up to three passes: the forward score-only pass over
//! the whole target (optimal score, end coordinates, per-column maxima for
//! the suboptimal scan), a reverse pass over the reversed query prefix
//! against the target prefix (begin coordinates, terminating early once the
//! known optimal score reappears), and the banded traceback that yields the
//! CIGAR. The filter policy decides how many of those run.

use crate::alphabet::EncodedSequence;
use crate::banded;
use crate::cigar;
use crate::filters::{Filters, MIN_MASK_LEN};
use crate::profile::{striped_bytes, striped_words, QueryProfile};
use crate::result::AlignmentResult;
use crate::striped::{VByte, VWord, BYTE_LANES, WORD_LANES};

/// Coordinates of a DP maximum. Inclusive, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellEnd {
    pub score: i32,
    pub target: i32,
    pub query: i32,
}

impl CellEnd {
    const ZERO: CellEnd = CellEnd {
        score: 0,
        target: 0,
        query: 0,
    };
}

/// Outcome of one score pass: the optimal end cell and the best column
/// outside the mask window (query coordinate unused for the latter).
#[derive(Debug, Clone, Copy)]
pub(crate) struct PassResult {
    pub best: CellEnd,
    pub second: CellEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Forward,
    /// Walk the target back-to-front; reported target coordinates stay in
    /// the original orientation.
    Reverse,
}

/// Narrow kernel: 16 unsigned byte lanes, scores biased into the profile.
/// Returns `None` when any lane saturates, which tells the caller to re-run
/// in 16-bit lanes.
#[allow(clippy::too_many_arguments)]
fn sw_striped_byte(
    target: &[u8],
    scan: Scan,
    profile: &[VByte],
    seg_len: usize,
    query_len: usize,
    gap_open: u8,
    gap_extend: u8,
    bias: u8,
    terminate: u8,
    mask_len: usize,
) -> Option<PassResult> {
    let tlen = target.len();
    let v_gap_open = VByte::splat(gap_open);
    let v_gap_extend = VByte::splat(gap_extend);
    let v_bias = VByte::splat(bias);

    let mut h_store = vec![VByte::ZERO; seg_len];
    let mut h_load = vec![VByte::ZERO; seg_len];
    let mut e_cols = vec![VByte::ZERO; seg_len];
    let mut h_best_col = vec![VByte::ZERO; seg_len];
    let mut col_max = vec![0i32; tlen];

    let mut best = 0u8;
    let mut end_target = -1i32;

    for step in 0..tlen {
        let i = match scan {
            Scan::Forward => step,
            Scan::Reverse => tlen - 1 - step,
        };
        let stripe = &profile[target[i] as usize * seg_len..][..seg_len];

        // H of the last stripe feeds the next column shifted one lane up.
        let mut v_h = h_store[seg_len - 1].shift_in_zero();
        let mut v_f = VByte::ZERO;
        std::mem::swap(&mut h_load, &mut h_store);

        let mut v_col_max = VByte::ZERO;
        for j in 0..seg_len {
            // Saturating-at-zero subtraction after the biased add is the
            // local-alignment clamp.
            v_h = v_h.adds(stripe[j]).subs(v_bias);
            let mut v_e = e_cols[j];
            v_h = v_h.max(v_e).max(v_f);
            v_col_max = v_col_max.max(v_h);
            h_store[j] = v_h;

            let open = v_h.subs(v_gap_open);
            v_e = v_e.subs(v_gap_extend).max(open);
            e_cols[j] = v_e;
            v_f = v_f.subs(v_gap_extend).max(open);

            v_h = h_load[j];
        }

        // Lazy-F: push F across stripe boundaries until no lane can still
        // improve its H. Bounded by the lane count since every wrap shifts a
        // zero into the carry.
        'lazy_f: for _wrap in 0..BYTE_LANES {
            v_f = v_f.shift_in_zero();
            for j in 0..seg_len {
                let h = h_store[j];
                if !v_f.any_gt(h.subs(v_gap_open)) {
                    break 'lazy_f;
                }
                let h = h.max(v_f);
                v_col_max = v_col_max.max(h);
                h_store[j] = h;
                v_f = v_f.subs(v_gap_extend);
            }
        }

        let col_best = v_col_max.hmax();
        col_max[i] = col_best as i32;
        if col_best > best {
            if col_best as u16 + bias as u16 >= u8::MAX as u16 {
                // A lane hit the ceiling; the true score may be larger.
                return None;
            }
            best = col_best;
            end_target = i as i32;
            h_best_col.copy_from_slice(&h_store);
        }
        if terminate > 0 && col_best >= terminate {
            break;
        }
    }

    if best == 0 {
        return Some(PassResult {
            best: CellEnd::ZERO,
            second: CellEnd::ZERO,
        });
    }

    let end_query = locate_query_end(query_len, seg_len, |slot, lane| {
        h_best_col[slot].0[lane] as i32 == best as i32
    });

    Some(PassResult {
        best: CellEnd {
            score: best as i32,
            target: end_target,
            query: end_query as i32,
        },
        second: second_best(&col_max, end_target, mask_len),
    })
}

/// Wide kernel: 8 signed 16-bit lanes, unbiased profile. H, E and F stay
/// non-negative by construction, so the max against them doubles as the
/// local clamp.
#[allow(clippy::too_many_arguments)]
fn sw_striped_word(
    target: &[u8],
    scan: Scan,
    profile: &[VWord],
    seg_len: usize,
    query_len: usize,
    gap_open: u8,
    gap_extend: u8,
    terminate: i16,
    mask_len: usize,
) -> PassResult {
    let tlen = target.len();
    let v_gap_open = VWord::splat(gap_open as i16);
    let v_gap_extend = VWord::splat(gap_extend as i16);

    let mut h_store = vec![VWord::ZERO; seg_len];
    let mut h_load = vec![VWord::ZERO; seg_len];
    let mut e_cols = vec![VWord::ZERO; seg_len];
    let mut h_best_col = vec![VWord::ZERO; seg_len];
    let mut col_max = vec![0i32; tlen];

    let mut best = 0i16;
    let mut end_target = -1i32;

    for step in 0..tlen {
        let i = match scan {
            Scan::Forward => step,
            Scan::Reverse => tlen - 1 - step,
        };
        let stripe = &profile[target[i] as usize * seg_len..][..seg_len];

        let mut v_h = h_store[seg_len - 1].shift_in_zero();
        let mut v_f = VWord::ZERO;
        std::mem::swap(&mut h_load, &mut h_store);

        let mut v_col_max = VWord::ZERO;
        for j in 0..seg_len {
            v_h = v_h.adds(stripe[j]);
            let mut v_e = e_cols[j];
            v_h = v_h.max(v_e).max(v_f);
            v_col_max = v_col_max.max(v_h);
            h_store[j] = v_h;

            let open = v_h.subs0(v_gap_open);
            v_e = v_e.subs0(v_gap_extend).max(open);
            e_cols[j] = v_e;
            v_f = v_f.subs0(v_gap_extend).max(open);

            v_h = h_load[j];
        }

        'lazy_f: for _wrap in 0..WORD_LANES {
            v_f = v_f.shift_in_zero();
            for j in 0..seg_len {
                let h = h_store[j];
                if !v_f.any_gt(h.subs0(v_gap_open)) {
                    break 'lazy_f;
                }
                let h = h.max(v_f);
                v_col_max = v_col_max.max(h);
                h_store[j] = h;
                v_f = v_f.subs0(v_gap_extend);
            }
        }

        let col_best = v_col_max.hmax();
        col_max[i] = col_best as i32;
        if col_best > best {
            best = col_best;
            end_target = i as i32;
            h_best_col.copy_from_slice(&h_store);
        }
        if terminate > 0 && col_best >= terminate {
            break;
        }
    }

    if best == i16::MAX {
        // Inputs this large are outside the supported envelope; the score
        // is reported saturated rather than failing the call.
        log::warn!(
            "16-bit lanes saturated at {}; scores this large exceed the supported input size",
            best
        );
    }

    if best == 0 {
        return PassResult {
            best: CellEnd::ZERO,
            second: CellEnd::ZERO,
        };
    }

    let end_query = locate_query_end(query_len, seg_len, |slot, lane| {
        h_best_col[slot].0[lane] == best
    });

    PassResult {
        best: CellEnd {
            score: best as i32,
            target: end_target,
            query: end_query as i32,
        },
        second: second_best(&col_max, end_target, mask_len),
    }
}

/// Smallest query position holding the maximum inside the winning column's
/// striped H row. Padding lanes are skipped; ties resolve to the earliest
/// query index.
fn locate_query_end(
    query_len: usize,
    seg_len: usize,
    is_max: impl Fn(usize, usize) -> bool,
) -> usize {
    let lanes = query_len.div_ceil(seg_len).max(1);
    let mut end_query = query_len - 1;
    for slot in 0..seg_len {
        for lane in 0..lanes {
            if is_max(slot, lane) {
                let pos = lane * seg_len + slot;
                if pos < query_len && pos < end_query {
                    end_query = pos;
                }
            }
        }
    }
    end_query
}

/// Best column outside the mask window around the optimal end column.
/// Strictly-greater updates keep the earliest target index on ties.
fn second_best(col_max: &[i32], end_target: i32, mask_len: usize) -> CellEnd {
    let tlen = col_max.len() as i32;
    let margin = mask_len as i32;
    let mut second = CellEnd::ZERO;
    let left_edge = (end_target - margin).max(0);
    for i in 0..left_edge as usize {
        if col_max[i] > second.score {
            second.score = col_max[i];
            second.target = i as i32;
        }
    }
    let right_edge = (end_target + margin).min(tlen);
    for i in right_edge as usize..col_max.len() {
        if col_max[i] > second.score {
            second.score = col_max[i];
            second.target = i as i32;
        }
    }
    second
}

/// Full alignment pipeline: forward pass, filter gates, reverse pass, banded
/// traceback.
pub(crate) fn run_alignment(
    profile: &QueryProfile,
    target: &EncodedSequence,
    filters: &Filters,
) -> AlignmentResult {
    let scoring = &profile.scoring;
    let gap_open = scoring.gap_open();
    let gap_extend = scoring.gap_extend();
    let bias = profile.bias;
    let query_len = profile.query.len();
    let t = target.codes();

    let (forward, wide) = match sw_striped_byte(
        t,
        Scan::Forward,
        &profile.profile_byte,
        profile.seg_byte,
        query_len,
        gap_open,
        gap_extend,
        bias,
        0,
        filters.mask_length,
    ) {
        Some(pass) => (pass, false),
        None => {
            log::debug!(
                "8-bit lanes saturated against a {}-symbol target; re-running in 16-bit lanes",
                t.len()
            );
            let pass = sw_striped_word(
                t,
                Scan::Forward,
                &profile.profile_word,
                profile.seg_word,
                query_len,
                gap_open,
                gap_extend,
                0,
                filters.mask_length,
            );
            (pass, true)
        }
    };

    let opt = forward.best;
    let (query_seq, target_seq) = if profile.suppress_sequences {
        (String::new(), String::new())
    } else {
        (profile.query.raw().to_string(), target.raw().to_string())
    };
    let assemble = |query_begin: Option<i32>,
                    target_begin: Option<i32>,
                    suboptimal: Option<(i32, i32)>,
                    cigar_str: Option<String>| {
        AlignmentResult::from_parts(
            opt.score,
            suboptimal,
            query_begin,
            opt.query,
            target_begin,
            opt.target,
            cigar_str,
            query_seq.clone(),
            target_seq.clone(),
            profile.zero_index,
        )
    };

    // Nothing scored: there is no alignment to locate or trace.
    if opt.score == 0 {
        return assemble(None, None, None, None);
    }

    // A mask shorter than the minimum makes the second-best locus
    // meaningless and the suboptimal fields are withheld.
    let suboptimal = if filters.mask_length >= MIN_MASK_LEN {
        Some((forward.second.score, forward.second.target))
    } else {
        None
    };

    let passes_score_gate = filters.score_filter.map_or(true, |min| opt.score >= min);
    if filters.score_only || !passes_score_gate {
        return assemble(None, None, suboptimal, None);
    }

    // Reverse pass over the reversed query prefix against the target prefix,
    // in the width the forward pass settled on, stopping at the first column
    // that reproduces the optimal score.
    let query_end = opt.query as usize;
    let target_end = opt.target as usize;
    let reversed_query: Vec<u8> = profile.query.codes()[..=query_end]
        .iter()
        .rev()
        .copied()
        .collect();
    let target_prefix = &t[..=target_end];

    let rev_best = if !wide {
        let (rev_profile, rev_seg) = striped_bytes(&reversed_query, scoring, bias);
        match sw_striped_byte(
            target_prefix,
            Scan::Reverse,
            &rev_profile,
            rev_seg,
            reversed_query.len(),
            gap_open,
            gap_extend,
            bias,
            opt.score as u8,
            filters.mask_length,
        ) {
            Some(pass) => pass.best,
            None => {
                // The prefix region's optimum equals the forward score, so
                // this should be unreachable; escalate all the same.
                log::warn!("reverse pass saturated unexpectedly; re-running in 16-bit lanes");
                let (rev_words, rev_seg_w) = striped_words(&reversed_query, scoring);
                sw_striped_word(
                    target_prefix,
                    Scan::Reverse,
                    &rev_words,
                    rev_seg_w,
                    reversed_query.len(),
                    gap_open,
                    gap_extend,
                    opt.score.min(i16::MAX as i32) as i16,
                    filters.mask_length,
                )
                .best
            }
        }
    } else {
        let (rev_words, rev_seg_w) = striped_words(&reversed_query, scoring);
        sw_striped_word(
            target_prefix,
            Scan::Reverse,
            &rev_words,
            rev_seg_w,
            reversed_query.len(),
            gap_open,
            gap_extend,
            opt.score.min(i16::MAX as i32) as i16,
            filters.mask_length,
        )
        .best
    };

    let target_begin = rev_best.target;
    let query_begin = opt.query - rev_best.query;

    let passes_distance_gate = match (filters.distance_filter, suboptimal) {
        (Some(min_distance), Some((sub_score, _))) => opt.score - sub_score >= min_distance,
        _ => true,
    };
    if !passes_distance_gate {
        return assemble(Some(query_begin), Some(target_begin), suboptimal, None);
    }

    let ops = banded::traceback(
        &t[target_begin as usize..=target_end],
        &profile.query.codes()[query_begin as usize..=query_end],
        opt.score,
        scoring,
    );
    debug_assert_eq!(
        cigar::query_length(&ops) as usize,
        query_end - query_begin as usize + 1
    );
    debug_assert_eq!(
        cigar::target_length(&ops) as usize,
        target_end - target_begin as usize + 1
    );

    assemble(
        Some(query_begin),
        Some(target_begin),
        suboptimal,
        Some(cigar::to_string(&ops)),
    )
}
