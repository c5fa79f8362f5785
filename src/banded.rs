//! Banded affine-gap DP and traceback for CIGAR reconstruction.
//!
//! Runs only over the region the score passes pinned down:
//! `target[target_begin..=target_end]` against `query[query_begin..=query_end]`.
//! The band starts at the length difference of the two regions plus one and
//! doubles until the DP reproduces the known optimal score, so the traceback
//! never walks a path worse than the one the striped kernels found. Three
//! direction planes (H, E, F) record, per cell, which state produced each
//! value; the backward walk follows them from the far corner to the origin.

use crate::cigar;
use crate::scoring::Scoring;

// Direction codes stored in the planes.
const DIAG: u8 = 1; // H came from the diagonal
const E_EXT: u8 = 2; // E extended an existing gap in the target
const E_OPEN: u8 = 3; // E opened from H
const F_EXT: u8 = 4; // F extended an existing gap in the query
const F_OPEN: u8 = 5; // F opened from H

/// Reconstruct the alignment path for a region whose local optimum is
/// `score`. Returns forward-ordered, merged `(op, len)` runs consuming the
/// query region with M/I and the target region with M/D exactly.
pub(crate) fn traceback(
    target: &[u8],
    query: &[u8],
    score: i32,
    scoring: &Scoring,
) -> Vec<(u8, i32)> {
    let tlen = target.len() as i32;
    let qlen = query.len() as i32;
    let gap_open = scoring.gap_open() as i32;
    let gap_extend = scoring.gap_extend() as i32;
    let n = scoring.alphabet().size();
    let mat = scoring.matrix();

    let mut band_width = (tlen - qlen).abs() + 1;

    loop {
        let w = band_width;
        let width = (w * 2 + 3) as usize;
        let width_d = (w * 2 + 1) as usize;
        // Band-relative column index; the band slides one column right per
        // query row, which the `(i - w).max(0)` origin compensates for.
        let cell = move |i: i32, j: i32| -> usize { (j - (i - w).max(0) + 1) as usize };
        let plane = move |i: i32, j: i32, p: usize| -> usize {
            ((j - (i - w).max(0)) * 3) as usize + p
        };

        let mut h_prev = vec![0i32; width];
        let mut h_curr = vec![0i32; width];
        let mut e_row = vec![0i32; width];
        let mut direction = vec![0u8; width_d * 3 * qlen as usize];
        let mut max = 0i32;

        for i in 0..qlen {
            let beg = (i - w).max(0);
            let end = (i + w).min(tlen - 1);
            let edge = ((end + 1) as usize).min(width - 1);
            let mut f = 0i32;
            h_prev[0] = 0;
            e_row[0] = 0;
            h_prev[edge] = 0;
            e_row[edge] = 0;
            h_curr[edge] = 0;
            h_curr[0] = 0;
            let dline = &mut direction[width_d * 3 * i as usize..][..width_d * 3];

            let mut last = 0usize;
            for j in beg..=end {
                let u = cell(i, j);
                let de = plane(i, j, 0);
                let df = plane(i, j, 1);
                let dh = plane(i, j, 2);

                // E: gap in the target (consumes query), fed by the previous
                // query row. Ties prefer extension.
                let (open_e, ext_e) = if i == 0 {
                    (-gap_open, -gap_extend)
                } else {
                    let up = cell(i - 1, j);
                    (h_prev[up] - gap_open, e_row[up] - gap_extend)
                };
                let e_val = open_e.max(ext_e);
                dline[de] = if open_e > ext_e { E_OPEN } else { E_EXT };
                e_row[u] = e_val;

                // F: gap in the query (consumes target), fed by the cell to
                // the left in this row.
                let open_f = h_curr[cell(i, j - 1)] - gap_open;
                let ext_f = f - gap_extend;
                f = open_f.max(ext_f);
                dline[df] = if open_f > ext_f { F_OPEN } else { F_EXT };

                let e_clamped = e_val.max(0);
                let f_clamped = f.max(0);
                let best_gap = e_clamped.max(f_clamped);
                let diag = h_prev[cell(i - 1, j - 1)]
                    + mat[target[j as usize] as usize * n + query[i as usize] as usize] as i32;
                let h = best_gap.max(diag);
                h_curr[u] = h;
                if h > max {
                    max = h;
                }
                // Diagonal wins H-ties; otherwise inherit the winning gap
                // plane's direction (F on E/F ties).
                dline[dh] = if best_gap <= diag {
                    DIAG
                } else if e_clamped > f_clamped {
                    dline[de]
                } else {
                    dline[df]
                };
                last = u;
            }
            h_prev[1..=last].copy_from_slice(&h_curr[1..=last]);
        }

        if max < score {
            if w >= tlen.max(qlen) {
                log::error!(
                    "banded traceback could not reproduce score {score} (reached {max}) \
                     even at full width; returning an empty path"
                );
                return Vec::new();
            }
            band_width *= 2;
            continue;
        }

        // Backward walk from the far corner to the region origin, which is
        // always an aligned pair.
        let mut ops_rev: Vec<(u8, i32)> = Vec::new();
        let mut i = qlen - 1;
        let mut j = tlen - 1;
        let mut p = 2usize; // start in the H plane
        let mut run_op = cigar::OP_MATCH;
        let mut run_len = 0i32;
        while i > 0 || j > 0 {
            let dir = direction[width_d * 3 * i as usize + plane(i, j, p)];
            let op = match dir {
                DIAG if i > 0 && j > 0 => {
                    i -= 1;
                    j -= 1;
                    p = 2;
                    cigar::OP_MATCH
                }
                E_EXT if i > 0 => {
                    i -= 1;
                    p = 0;
                    cigar::OP_INS
                }
                E_OPEN if i > 0 => {
                    i -= 1;
                    p = 2;
                    cigar::OP_INS
                }
                F_EXT if j > 0 => {
                    j -= 1;
                    p = 1;
                    cigar::OP_DEL
                }
                F_OPEN if j > 0 => {
                    j -= 1;
                    p = 2;
                    cigar::OP_DEL
                }
                _ => {
                    log::error!(
                        "traceback hit an inconsistent direction cell at ({i}, {j}), code {dir}; \
                         truncating the path"
                    );
                    break;
                }
            };
            if op == run_op {
                run_len += 1;
            } else {
                cigar::push(&mut ops_rev, run_op, run_len);
                run_op = op;
                run_len = 1;
            }
        }
        // Account for the origin cell itself.
        if run_op == cigar::OP_MATCH {
            cigar::push(&mut ops_rev, cigar::OP_MATCH, run_len + 1);
        } else {
            cigar::push(&mut ops_rev, run_op, run_len);
            cigar::push(&mut ops_rev, cigar::OP_MATCH, 1);
        }
        cigar::reverse(&mut ops_rev);
        return ops_rev;
    }
}
