//! Neighbor record model

use serde::{Deserialize, Serialize};

/// One entry of a user's neighborhood
///
/// Produced per (target user, other user) pair when Pearson similarity is
/// defined for the pair; absent otherwise. The neighbor's average rating is
/// carried along so prediction never has to recompute it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborRecord {
    /// Identifier of the neighboring user
    pub user_id: u32,
    /// Pearson correlation similarity, in [-1, 1]
    pub similarity: f64,
    /// The neighbor's average rating over everything they rated
    pub avg_rating: f64,
}
