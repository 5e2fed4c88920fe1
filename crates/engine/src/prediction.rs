//! Rating prediction from a neighborhood
//!
//! Predicts a target user's rating for one movie as the user's own average
//! plus the similarity-weighted average deviation of the neighbors. A
//! neighbor contributes only when both its average and its rating for the
//! movie are defined; it is skipped entirely otherwise, not counted as a
//! zero contribution.

use crate::store::RatingStore;
use recommender_core::NeighborRecord;

/// Predicted score when no usable neighbor contributes
///
/// Signals "insufficient data to personalize"; a full-catalog ranking built
/// from it is total and stable rather than empty.
pub const DEFAULT_SCORE: f64 = 0.0;

/// Predict the user's rating for a movie from the given neighborhood
///
/// With an empty or entirely unusable neighborhood the result is
/// [`DEFAULT_SCORE`].
pub fn predict_rating(
    store: &RatingStore,
    user_id: u32,
    movie_id: u32,
    neighbors: &[NeighborRecord],
) -> f64 {
    let target_avg = store.average_rating(user_id);

    let mut weighted_deviation = 0.0;
    let mut weight_total = 0.0;

    for neighbor in neighbors {
        if neighbor.avg_rating.is_nan() {
            continue;
        }
        let neighbor_score = store.rating_for(neighbor.user_id, movie_id);
        if neighbor_score.is_nan() {
            continue;
        }
        weighted_deviation += neighbor.similarity * (neighbor_score - neighbor.avg_rating);
        weight_total += neighbor.similarity;
    }

    if weight_total == 0.0 {
        return DEFAULT_SCORE;
    }

    target_avg + weighted_deviation / weight_total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use recommender_core::{Movie, Rating, User};

    fn movie(id: u32) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            genres: "Drama".to_string(),
        }
    }

    fn user(id: u32) -> User {
        User {
            id,
            gender: "M".to_string(),
            age: 35,
            occupation: 7,
            zip: "12345".to_string(),
        }
    }

    fn rating(user_id: u32, movie_id: u32, score: f64) -> Rating {
        Rating {
            user_id,
            movie_id,
            score,
            timestamp: Utc.timestamp_opt(978_300_760, 0).unwrap(),
        }
    }

    fn neighbor(user_id: u32, similarity: f64, avg_rating: f64) -> NeighborRecord {
        NeighborRecord {
            user_id,
            similarity,
            avg_rating,
        }
    }

    fn store() -> RatingStore {
        RatingStore::from_parts(
            vec![movie(1), movie(2), movie(3)],
            vec![user(1), user(2), user(3)],
            vec![
                rating(1, 1, 5.0),
                rating(1, 2, 3.0),
                rating(2, 1, 4.0),
                rating(2, 3, 5.0),
                rating(3, 1, 2.0),
                rating(3, 2, 2.0),
            ],
        )
    }

    #[test]
    fn test_empty_neighborhood_returns_default() {
        let store = store();
        assert_eq!(predict_rating(&store, 1, 3, &[]), DEFAULT_SCORE);
    }

    #[test]
    fn test_weighted_deviation_added_to_target_average() {
        let store = store();
        // U1 average is 4. U2 averages 4.5 and rated movie 3 with 5:
        // prediction = 4 + 1.0 * (5 - 4.5) / 1.0 = 4.5
        let neighbors = [neighbor(2, 1.0, 4.5)];
        let predicted = predict_rating(&store, 1, 3, &neighbors);
        assert!((predicted - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_neighbor_without_rating_is_skipped() {
        let store = store();
        // U3 never rated movie 3, so only U2 contributes.
        let neighbors = [neighbor(2, 1.0, 4.5), neighbor(3, 0.9, 2.0)];
        let predicted = predict_rating(&store, 1, 3, &neighbors);
        assert!((predicted - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_neighbor_with_undefined_average_is_skipped() {
        let store = store();
        let neighbors = [neighbor(2, 1.0, f64::NAN)];
        assert_eq!(predict_rating(&store, 1, 3, &neighbors), DEFAULT_SCORE);
    }

    #[test]
    fn test_all_neighbors_unusable_returns_default() {
        let store = store();
        // Movie 99 was rated by nobody.
        let neighbors = [neighbor(2, 1.0, 4.5), neighbor(3, 0.5, 2.0)];
        let predicted = predict_rating(&store, 1, 99, &neighbors);
        assert_eq!(predicted, DEFAULT_SCORE);
    }

    #[test]
    fn test_opposite_weights_cancel_to_default() {
        let store = store();
        // Both neighbors rated movie 1 but their weights sum to zero: the
        // defined result is the sentinel, not a division by zero.
        let neighbors = [neighbor(2, 1.0, 4.5), neighbor(3, -1.0, 2.0)];
        let predicted = predict_rating(&store, 1, 1, &neighbors);
        assert_eq!(predicted, DEFAULT_SCORE);
    }
}
