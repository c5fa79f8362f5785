//! Substitution scores and gap penalties.
//!
//! A `Scoring` always holds a full `n x n` substitution matrix over the
//! alphabet codes, whether it was built from (match, mismatch) scalars or
//! supplied whole. Gap penalties are magnitudes subtracted from scores: a gap
//! of length L costs `gap_open + (L - 1) * gap_extend`.

use crate::alphabet::Alphabet;
use crate::error::AlignError;

#[derive(Debug, Clone)]
pub struct Scoring {
    alphabet: Alphabet,
    /// Row-major `n * n` matrix indexed by `[a * n + b]` over alphabet codes.
    matrix: Vec<i8>,
    gap_open: u8,
    gap_extend: u8,
}

impl Scoring {
    /// Scoring from match/mismatch scalars. The ambiguity row and column
    /// (code `N` for nucleotides) score zero against everything, so ambiguous
    /// positions neither reward nor punish an alignment.
    ///
    /// Protein alignment needs a real substitution matrix; scalars are
    /// rejected there.
    pub fn simple(
        alphabet: Alphabet,
        match_score: i8,
        mismatch_score: i8,
        gap_open: u8,
        gap_extend: u8,
    ) -> Result<Self, AlignError> {
        if alphabet == Alphabet::Protein {
            return Err(AlignError::Configuration(
                "protein alignment requires a substitution matrix, \
                 not match/mismatch scalars"
                    .to_string(),
            ));
        }
        validate_gaps(gap_open, gap_extend)?;
        let n = alphabet.size();
        let ambiguity = n - 1;
        let mut matrix = vec![0i8; n * n];
        for a in 0..n {
            for b in 0..n {
                matrix[a * n + b] = if a == ambiguity || b == ambiguity {
                    0
                } else if a == b {
                    match_score
                } else {
                    mismatch_score
                };
            }
        }
        Ok(Scoring {
            alphabet,
            matrix,
            gap_open,
            gap_extend,
        })
    }

    /// Scoring from a caller-supplied substitution matrix, row-major over the
    /// alphabet's code order. The matrix must cover the whole alphabet
    /// (`n * n` entries); symmetry is not required.
    pub fn with_matrix(
        alphabet: Alphabet,
        matrix: &[i8],
        gap_open: u8,
        gap_extend: u8,
    ) -> Result<Self, AlignError> {
        validate_gaps(gap_open, gap_extend)?;
        let n = alphabet.size();
        if matrix.len() != n * n {
            return Err(AlignError::Configuration(format!(
                "substitution matrix must have {} entries ({}x{} over the {} alphabet), got {}",
                n * n,
                n,
                n,
                alphabet.name(),
                matrix.len()
            )));
        }
        Ok(Scoring {
            alphabet,
            matrix: matrix.to_vec(),
            gap_open,
            gap_extend,
        })
    }

    /// Resolve a possibly over-specified configuration: when both scalars and
    /// a matrix are given, the matrix wins. This is a deterministic override,
    /// not an error.
    pub fn from_parts(
        alphabet: Alphabet,
        match_score: i8,
        mismatch_score: i8,
        matrix: Option<&[i8]>,
        gap_open: u8,
        gap_extend: u8,
    ) -> Result<Self, AlignError> {
        match matrix {
            Some(m) => Self::with_matrix(alphabet, m, gap_open, gap_extend),
            None => Self::simple(alphabet, match_score, mismatch_score, gap_open, gap_extend),
        }
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Substitution score for a pair of alphabet codes.
    #[inline]
    pub fn score(&self, a: u8, b: u8) -> i8 {
        self.matrix[a as usize * self.alphabet.size() + b as usize]
    }

    pub fn gap_open(&self) -> u8 {
        self.gap_open
    }

    pub fn gap_extend(&self) -> u8 {
        self.gap_extend
    }

    pub(crate) fn matrix(&self) -> &[i8] {
        &self.matrix
    }

    /// Bias added to every profile entry so the 8-bit kernel can run in
    /// unsigned saturating arithmetic: the magnitude of the most negative
    /// matrix entry, 0 for all-positive matrices.
    pub(crate) fn bias(&self) -> u8 {
        self.matrix
            .iter()
            .copied()
            .min()
            .filter(|&m| m < 0)
            .map(|m| (m as i16).unsigned_abs() as u8)
            .unwrap_or(0)
    }
}

fn validate_gaps(gap_open: u8, gap_extend: u8) -> Result<(), AlignError> {
    // A free gap opening combined with a paid extension inverts the affine
    // model (longer gaps would be opened repeatedly for free). Accepted
    // ranges: 0..=255 for both, gap_open > 0 whenever gap_extend > 0.
    if gap_open == 0 && gap_extend > 0 {
        return Err(AlignError::Configuration(format!(
            "gap_extend = {gap_extend} with gap_open = 0 is nonsensical; \
             a paid extension requires a paid opening"
        )));
    }
    Ok(())
}
