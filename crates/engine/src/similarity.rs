//! Pearson-correlation similarity between users
//!
//! Similarity is computed over the co-rated movie set only, against every
//! other user in the store. A pair yields a record only when both users
//! show rating variance over that set; a user with no ratings can never be
//! a neighbor. Each per-user computation is an independent unit of the
//! worker-pool fan-out and writes its own output slot.

use crate::store::RatingStore;
use rayon::prelude::*;
use recommender_core::NeighborRecord;
use std::cmp::Ordering;
use tracing::debug;

/// Compute the full neighbor list for a user, sorted by similarity descending
///
/// Returns every other user for which Pearson similarity is defined. Ties
/// keep the user-relation order (the sort is stable). The caller decides how
/// much of the list to expose; the whole list is what gets cached.
pub fn compute_neighbors(
    store: &RatingStore,
    pool: &rayon::ThreadPool,
    user_id: u32,
) -> Vec<NeighborRecord> {
    let target_ratings = store.ratings_of(user_id);
    let target_avg = store.average_rating(user_id);

    let mut neighbors: Vec<NeighborRecord> = pool.install(|| {
        store
            .users()
            .par_iter()
            .filter_map(|other| {
                pearson_neighbor(store, user_id, target_ratings, target_avg, other.id)
            })
            .collect()
    });

    neighbors.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });

    debug!(
        user_id,
        candidates = store.users().len(),
        neighbors = neighbors.len(),
        "similarity fan-out complete"
    );

    neighbors
}

/// Pearson similarity of one candidate against the target user
///
/// `None` when the candidate is the target itself, has no ratings, or shows
/// no rating variance over the co-rated set (either denominator zero).
fn pearson_neighbor(
    store: &RatingStore,
    target_id: u32,
    target_ratings: &[(u32, f64)],
    target_avg: f64,
    other_id: u32,
) -> Option<NeighborRecord> {
    if other_id == target_id {
        return None;
    }

    let other_avg = store.average_rating(other_id);
    if other_avg.is_nan() {
        return None;
    }

    let mut numerator = 0.0;
    let mut denom1 = 0.0;
    let mut denom2 = 0.0;

    for &(movie_id, target_score) in target_ratings {
        let other_score = store.rating_for(other_id, movie_id);
        if target_score.is_nan() || other_score.is_nan() {
            continue;
        }
        let target_dev = target_score - target_avg;
        let other_dev = other_score - other_avg;
        numerator += target_dev * other_dev;
        denom1 += target_dev * target_dev;
        denom2 += other_dev * other_dev;
    }

    if denom1 <= 0.0 || denom2 <= 0.0 {
        return None;
    }

    Some(NeighborRecord {
        user_id: other_id,
        similarity: numerator / (denom1.sqrt() * denom2.sqrt()),
        avg_rating: other_avg,
    })
}
