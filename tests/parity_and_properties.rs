// Randomized parity of the striped kernels against a plain scalar DP, the
// shared-profile concurrency contract, and the filter/mask gates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use striped_align::{AlignError, Alphabet, Filters, QueryProfile, Scoring};

const MATCH: i32 = 2;
const MISMATCH: i32 = -3;
const GAP_OPEN: i32 = 5;
const GAP_EXTEND: i32 = 2;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn nt_profile(query: &str) -> QueryProfile {
    let scoring = Scoring::simple(
        Alphabet::Nucleotide,
        MATCH as i8,
        MISMATCH as i8,
        GAP_OPEN as u8,
        GAP_EXTEND as u8,
    )
    .unwrap();
    QueryProfile::build(query, Alphabet::Nucleotide, scoring).unwrap()
}

fn random_seq(rng: &mut StdRng, len: usize) -> String {
    const BASES: [char; 4] = ['A', 'C', 'G', 'T'];
    (0..len).map(|_| BASES[rng.gen_range(0..4)]).collect()
}

/// Reference kernel: the textbook O(mn) affine-gap local DP with full
/// matrices. Slow, obviously correct, used only to check scores.
fn scalar_score(query: &str, target: &str) -> i32 {
    const NEG: i32 = i32::MIN / 2;
    let q = query.as_bytes();
    let t = target.as_bytes();
    let qn = q.len();
    let tn = t.len();

    let mut h = vec![vec![0i32; tn + 1]; qn + 1];
    let mut e = vec![vec![NEG; tn + 1]; qn + 1];
    let mut f = vec![vec![NEG; tn + 1]; qn + 1];
    let mut best = 0i32;

    for i in 1..=qn {
        for j in 1..=tn {
            e[i][j] = (h[i][j - 1] - GAP_OPEN).max(e[i][j - 1] - GAP_EXTEND);
            f[i][j] = (h[i - 1][j] - GAP_OPEN).max(f[i - 1][j] - GAP_EXTEND);
            let s = if q[i - 1] == t[j - 1] { MATCH } else { MISMATCH };
            h[i][j] = (h[i - 1][j - 1] + s).max(e[i][j]).max(f[i][j]).max(0);
            best = best.max(h[i][j]);
        }
    }
    best
}

#[test]
fn striped_score_matches_scalar_on_random_pairs() {
    init_logs();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let filters = Filters {
        score_only: true,
        ..Filters::default()
    };
    for round in 0..200 {
        let qlen = rng.gen_range(1..=80);
        let tlen = rng.gen_range(1..=120);
        let query = random_seq(&mut rng, qlen);
        let target = random_seq(&mut rng, tlen);
        let expected = scalar_score(&query, &target);
        let result = nt_profile(&query).align(&target, &filters).unwrap();
        assert_eq!(
            result.optimal_alignment_score(),
            expected,
            "round {round}: {query} vs {target}"
        );
    }
}

#[test]
fn escalated_pass_matches_scalar_past_the_byte_ceiling() {
    init_logs();
    // Mutate a 300-base sequence lightly; the score stays far above what
    // 8-bit lanes can hold, forcing the 16-bit re-run.
    let mut rng = StdRng::seed_from_u64(42);
    let query = random_seq(&mut rng, 300);
    let mut target_bytes = query.clone().into_bytes();
    for _ in 0..6 {
        let pos = rng.gen_range(0..target_bytes.len());
        target_bytes[pos] = match target_bytes[pos] {
            b'A' => b'C',
            b'C' => b'G',
            b'G' => b'T',
            _ => b'A',
        };
    }
    let target = String::from_utf8(target_bytes).unwrap();

    let expected = scalar_score(&query, &target);
    assert!(expected > 255, "test premise: score must exceed 8-bit range");
    let result = nt_profile(&query).align(&target, &Filters::default()).unwrap();
    assert_eq!(result.optimal_alignment_score(), expected);
}

#[test]
fn optimal_dominates_suboptimal_and_is_non_negative() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let query_len = rng.gen_range(16..=64);
        let query = random_seq(&mut rng, query_len);
        let target_len = rng.gen_range(30..=150);
        let target = random_seq(&mut rng, target_len);
        let result = nt_profile(&query).align(&target, &Filters::default()).unwrap();
        assert!(result.optimal_alignment_score() >= 0);
        if let Some(sub) = result.suboptimal_alignment_score() {
            assert!(
                result.optimal_alignment_score() >= sub,
                "{query} vs {target}: opt {} < sub {sub}",
                result.optimal_alignment_score()
            );
        }
    }
}

#[test]
fn one_profile_is_shareable_across_threads() {
    let mut rng = StdRng::seed_from_u64(99);
    let query = random_seq(&mut rng, 48);
    let targets: Vec<String> = (0..64)
        .map(|_| {
            let len = rng.gen_range(40..=200);
            random_seq(&mut rng, len)
        })
        .collect();

    let profile = nt_profile(&query);
    let filters = Filters::default();

    let sequential: Vec<_> = targets
        .iter()
        .map(|t| profile.align(t, &filters).unwrap())
        .collect();
    let concurrent: Vec<_> = targets
        .par_iter()
        .map(|t| profile.align(t, &filters).unwrap())
        .collect();
    assert_eq!(sequential, concurrent);
}

#[test]
fn score_filter_skips_begins_and_cigar() {
    let profile = nt_profile("AGGGTAATTAGGCGTGTTCACCTA");
    let target = "AGTCGAAGGGTAATATAGGCGTGTCACCTA";

    let gated = profile
        .align(
            target,
            &Filters {
                score_filter: Some(50),
                ..Filters::default()
            },
        )
        .unwrap();
    assert_eq!(gated.optimal_alignment_score(), 36);
    assert_eq!(gated.suboptimal_alignment_score(), Some(16));
    assert_eq!(gated.target_end_optimal(), 29);
    assert_eq!(gated.query_begin(), None);
    assert_eq!(gated.target_begin(), None);
    assert_eq!(gated.cigar(), None);

    let passed = profile
        .align(
            target,
            &Filters {
                score_filter: Some(30),
                ..Filters::default()
            },
        )
        .unwrap();
    assert_eq!(passed.query_begin(), Some(0));
    assert_eq!(passed.cigar(), Some("8M1D8M1I7M"));
}

#[test]
fn distance_filter_skips_cigar_only() {
    let profile = nt_profile("AGGGTAATTAGGCGTGTTCACCTA");
    let target = "AGTCGAAGGGTAATATAGGCGTGTCACCTA"; // opt 36, sub 16

    let gated = profile
        .align(
            target,
            &Filters {
                distance_filter: Some(25),
                ..Filters::default()
            },
        )
        .unwrap();
    assert_eq!(gated.query_begin(), Some(0));
    assert_eq!(gated.target_begin(), Some(6));
    assert_eq!(gated.cigar(), None);

    let passed = profile
        .align(
            target,
            &Filters {
                distance_filter: Some(20),
                ..Filters::default()
            },
        )
        .unwrap();
    assert_eq!(passed.cigar(), Some("8M1D8M1I7M"));
}

#[test]
fn short_mask_withholds_the_suboptimal_locus() {
    let profile = nt_profile("AGGGTAATTAGGCGTGTTCACCTA");
    let result = profile
        .align(
            "AGTCGAAGGGTAATATAGGCGTGTCACCTA",
            &Filters {
                mask_length: 5,
                ..Filters::default()
            },
        )
        .unwrap();
    assert_eq!(result.optimal_alignment_score(), 36);
    assert_eq!(result.suboptimal_alignment_score(), None);
    assert_eq!(result.target_end_suboptimal(), None);
    // With no suboptimal to compare, a distance filter cannot gate the
    // traceback.
    assert_eq!(result.cigar(), Some("8M1D8M1I7M"));
}

#[test]
fn score_only_reports_scores_and_ends() {
    let profile = nt_profile("AGGGTAATTAGGCGTGTTCACCTA");
    let result = profile
        .align(
            "AGTCGAAGGGTAATATAGGCGTGTCACCTA",
            &Filters {
                score_only: true,
                ..Filters::default()
            },
        )
        .unwrap();
    assert_eq!(result.optimal_alignment_score(), 36);
    assert_eq!(result.suboptimal_alignment_score(), Some(16));
    assert_eq!(result.query_end(), 23);
    assert_eq!(result.target_end_optimal(), 29);
    assert_eq!(result.query_begin(), None);
    assert_eq!(result.cigar(), None);
}

#[test]
fn protein_alignment_uses_a_substitution_matrix() {
    // Identity-style matrix: +4 on the diagonal, -2 off it.
    let n = Alphabet::Protein.size();
    let mut matrix = vec![-2i8; n * n];
    for i in 0..n {
        matrix[i * n + i] = 4;
    }
    let scoring = Scoring::with_matrix(Alphabet::Protein, &matrix, 5, 2).unwrap();
    let profile = QueryProfile::build("MKVLAW", Alphabet::Protein, scoring).unwrap();
    let result = profile.align("GGMKVLAWRR", &Filters::default()).unwrap();
    assert_eq!(result.optimal_alignment_score(), 24);
    assert_eq!(result.cigar(), Some("6M"));
    assert_eq!(result.query_begin(), Some(0));
    assert_eq!(result.target_begin(), Some(2));
    assert_eq!(result.target_end_optimal(), 7);
}

#[test]
fn invalid_target_symbols_fail_the_call() {
    let profile = nt_profile("ACGT");
    let err = profile.align("ACGJ", &Filters::default()).unwrap_err();
    assert!(matches!(err, AlignError::InvalidSequence { position: 3, .. }));
}

#[test]
fn suppressed_sequences_are_not_echoed() {
    let scoring = Scoring::simple(Alphabet::Nucleotide, 2, -3, 5, 2).unwrap();
    let profile = QueryProfile::build("ACGT", Alphabet::Nucleotide, scoring)
        .unwrap()
        .suppress_sequences(true);
    let result = profile.align("ACGT", &Filters::default()).unwrap();
    assert_eq!(result.optimal_alignment_score(), 8);
    assert_eq!(result.query_sequence(), "");
    assert_eq!(result.target_sequence(), "");
}
