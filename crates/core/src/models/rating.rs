//! Rating model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user-movie rating
///
/// Immutable once loaded. A (user, movie) pair is expected to be unique in
/// the dataset; scores are conventionally on the 1-5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Identifier of the rating user
    pub user_id: u32,
    /// Identifier of the rated movie
    pub movie_id: u32,
    /// Rating score, conventionally 1-5
    pub score: f64,
    /// When the rating was produced
    pub timestamp: DateTime<Utc>,
}
