//! Recommendation result rows
//!
//! Structured records handed to the front end. The engine never renders;
//! these types are the whole of its output surface, with an optional
//! enrichment step attaching per-movie catalog aggregates before display.

use crate::store::RatingStore;
use serde::Serialize;

/// One ranked recommendation row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Movie identifier
    pub movie_id: u32,
    /// Movie title
    pub title: String,
    /// Raw genre tag string
    pub genres: String,
    /// Predicted rating for the requesting user
    pub predicted_score: f64,
}

/// A recommendation row with per-movie catalog metadata attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecommendation {
    /// Movie identifier
    pub movie_id: u32,
    /// Movie title
    pub title: String,
    /// Genre tags split out of the raw string
    pub genre_tags: Vec<String>,
    /// Predicted rating for the requesting user
    pub predicted_score: f64,
    /// How many users rated the movie
    pub rating_count: usize,
    /// Catalog-wide mean rating, `None` when nobody rated the movie
    pub mean_rating: Option<f64>,
}

/// One row of a user's rated-movie listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedMovie {
    /// Movie identifier
    pub movie_id: u32,
    /// Movie title
    pub title: String,
    /// Raw genre tag string
    pub genres: String,
    /// The score the user gave
    pub score: f64,
}

/// Attach catalog aggregates to ranked rows
pub fn enrich(store: &RatingStore, rows: &[Recommendation]) -> Vec<EnrichedRecommendation> {
    rows.iter()
        .map(|row| {
            let stats = store.movie_stats(row.movie_id);
            let genre_tags = store
                .movie(row.movie_id)
                .map(|movie| movie.genre_tags().iter().map(|t| t.to_string()).collect())
                .unwrap_or_default();
            EnrichedRecommendation {
                movie_id: row.movie_id,
                title: row.title.clone(),
                genre_tags,
                predicted_score: row.predicted_score,
                rating_count: stats.rating_count,
                mean_rating: (!stats.mean_rating.is_nan()).then_some(stats.mean_rating),
            }
        })
        .collect()
}

/// The movies a user rated, with titles and genres, in rating order
pub fn rated_movies(store: &RatingStore, user_id: u32) -> Vec<RatedMovie> {
    store
        .ratings_of(user_id)
        .iter()
        .filter_map(|&(movie_id, score)| {
            store.movie(movie_id).map(|movie| RatedMovie {
                movie_id,
                title: movie.title.clone(),
                genres: movie.genres.clone(),
                score,
            })
        })
        .collect()
}
