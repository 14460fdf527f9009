use super::config::PenaltyMode;

/// Partial geometric sum `S(m) = Σ_{j=0}^{m-1} (1/2)^j`, with `S(0) = 0`.
///
/// Strictly increasing and below 2 for `m < 54`. In `f64`, `S(54)` rounds to
/// exactly `2.0` and every longer sum stays there, so sequences longer than
/// that can no longer tell apart counts past 53. Terms are accumulated in
/// order so that the same `m` always produces the same bits, which keeps
/// `1 - S(n)/S(n)` at exactly zero.
pub fn partial_geometric_sum(m: usize) -> f64 {
    if m >= SATURATION_LEN {
        return 2.0;
    }
    decay_weights().take(m).sum()
}

/// First `m` at which the `f64` partial sum equals 2.0
const SATURATION_LEN: usize = 54;

/// `(1/2)^j` for `j = 0, 1, 2, ...`
fn decay_weights() -> impl Iterator<Item = f64> {
    std::iter::successors(Some(1.0_f64), |w| Some(w * 0.5))
}

/// Consistency from the wrong-answer count alone: `1 - S(k) / S(n)`.
///
/// Only *how many* answers are wrong matters, not *where* they are.
/// `n = 0` cannot come out of the sequence builder; it scores 1.0.
pub fn consistency_from_counts(num_incorrect: usize, total_questions: usize) -> f64 {
    if total_questions == 0 {
        return 1.0;
    }
    let k = num_incorrect.min(total_questions);
    1.0 - partial_geometric_sum(k) / partial_geometric_sum(total_questions)
}

/// Consistency where a wrong answer at 0-based position `p` costs `(1/2)^p`.
pub fn positional_consistency(correct: &[bool]) -> f64 {
    if correct.is_empty() {
        return 1.0;
    }
    let penalty: f64 = correct
        .iter()
        .zip(decay_weights())
        .filter(|(ok, _)| !**ok)
        .map(|(_, w)| w)
        .sum();
    1.0 - penalty / partial_geometric_sum(correct.len())
}

/// Score one ordered correctness sequence under the given penalty mode.
pub fn score_sequence(correct: &[bool], mode: PenaltyMode) -> f64 {
    match mode {
        PenaltyMode::Count => {
            let num_incorrect = correct.iter().filter(|ok| !**ok).count();
            consistency_from_counts(num_incorrect, correct.len())
        }
        PenaltyMode::Position => positional_consistency(correct),
    }
}
