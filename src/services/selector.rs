use crate::models::Recommendation;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Shuffle `candidates` and keep at most `limit` of them, one per restaurant.
///
/// Order is random on every call, so callers should only rely on membership.
pub fn select_diverse<R: Rng + ?Sized>(
    mut candidates: Vec<Recommendation>,
    limit: usize,
    rng: &mut R,
) -> Vec<Recommendation> {
    candidates.shuffle(rng);

    let mut seen_restaurants = HashSet::new();
    let mut selected = Vec::with_capacity(limit.min(candidates.len()));

    for candidate in candidates {
        if selected.len() >= limit {
            break;
        }
        if seen_restaurants.insert(candidate.restaurant_id()) {
            selected.push(candidate);
        }
    }

    selected
}
