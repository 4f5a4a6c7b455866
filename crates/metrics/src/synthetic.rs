//! Synthetic attack scores for demos and tests.

use mia_audit_core::{LabelVector, MiaError, Result, ScoreVector};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Draw Gaussian attack scores with a controllable member/non-member gap.
///
/// Member scores follow `N(separation, 1)` and non-member scores `N(0, 1)`.
/// Members come first in the returned vectors.
pub fn synthetic_scores<R: Rng>(
    rng: &mut R,
    separation: f64,
    num_members: usize,
    num_non_members: usize,
) -> Result<(ScoreVector, LabelVector)> {
    if !separation.is_finite() {
        return Err(MiaError::invalid("separation must be finite"));
    }
    let member_dist = Normal::new(separation, 1.0)
        .map_err(|e| MiaError::invalid(format!("invalid member distribution: {e}")))?;
    let non_member_dist = Normal::new(0.0, 1.0)
        .map_err(|e| MiaError::invalid(format!("invalid non-member distribution: {e}")))?;

    let mut scores = Vec::with_capacity(num_members + num_non_members);
    scores.extend((0..num_members).map(|_| member_dist.sample(rng)));
    scores.extend((0..num_non_members).map(|_| non_member_dist.sample(rng)));

    let mut labels = vec![1u8; num_members];
    labels.resize(num_members + num_non_members, 0);
    Ok((scores, LabelVector::new(labels)?))
}
