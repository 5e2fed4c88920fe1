//! # Recommender Engine
//!
//! User-based collaborative filtering over the flat-file rating dataset:
//! k-nearest-neighbor selection with Pearson correlation similarity, a
//! persisted neighbor cache, and weighted-average rating prediction.
//!
//! The engine is the library surface consumed by the (external) web front
//! end: it accepts a user identifier and returns ranked, structured rows.
//! One engine instance owns one rating-store snapshot, one cache handle,
//! and one bounded worker pool; there is no implicit cross-instance state.

pub mod cache;
pub mod prediction;
pub mod recommendation;
pub mod similarity;
pub mod store;

// Re-export key types
pub use cache::NeighborCache;
pub use prediction::{predict_rating, DEFAULT_SCORE};
pub use recommendation::{EnrichedRecommendation, RatedMovie, Recommendation};
pub use store::{MovieStats, RatingStore};

use rayon::prelude::*;
use recommender_core::{
    ConfigLoader, DatasetConfig, EngineConfig, NeighborRecord, RecommenderError, Result,
};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// The recommendation engine
///
/// Owns a read-only [`RatingStore`] snapshot, a [`NeighborCache`] handle,
/// and the worker pool used for the similarity and prediction fan-outs.
pub struct RecommenderEngine {
    config: EngineConfig,
    store: RatingStore,
    cache: NeighborCache,
    pool: rayon::ThreadPool,
}

impl RecommenderEngine {
    /// Build an engine from explicit configuration
    ///
    /// Loads the dataset and the neighbor cache; a missing or unreadable
    /// dataset file is fatal here.
    pub fn new(config: EngineConfig, dataset: &DatasetConfig) -> Result<Self> {
        let store = RatingStore::load(dataset)?;
        let cache = NeighborCache::open(&config.cache_path)?;
        Self::with_parts(config, store, cache)
    }

    /// Build an engine from environment-driven configuration
    pub fn from_env() -> Result<Self> {
        let dataset = DatasetConfig::from_env()?;
        dataset.validate()?;
        let config = EngineConfig::from_env()?;
        config.validate()?;
        Self::new(config, &dataset)
    }

    /// Build an engine around an existing store and cache
    pub fn with_parts(
        config: EngineConfig,
        store: RatingStore,
        cache: NeighborCache,
    ) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .map_err(|e| RecommenderError::Configuration {
                message: format!("cannot build worker pool: {}", e),
                key: Some("RECOMMENDER_WORKERS".to_string()),
            })?;

        Ok(Self {
            config,
            store,
            cache,
            pool,
        })
    }

    /// The neighborhood of a user: its `k` most similar users
    ///
    /// A cached entry is served as-is (its first `k` records, no
    /// recomputation, no write) unless `cache_refresh` is enabled.
    /// Otherwise the full neighbor list is computed, persisted in its
    /// entirety, and the first `k` records returned — persisting the whole
    /// list lets later requests with a larger `k` still hit the cache.
    pub fn neighborhood(&self, user_id: u32, k: usize) -> Result<Vec<NeighborRecord>> {
        if !self.config.cache_refresh {
            if let Some(mut records) = self.cache.lookup(user_id) {
                debug!(user_id, k, "neighborhood served from cache");
                records.truncate(k);
                return Ok(records);
            }
        }

        let neighbors = similarity::compute_neighbors(&self.store, &self.pool, user_id);
        self.cache.store(user_id, neighbors.clone())?;

        let mut top = neighbors;
        top.truncate(k);
        Ok(top)
    }

    /// Predict the user's rating for one movie from a given neighborhood
    pub fn predict_rating(
        &self,
        user_id: u32,
        movie_id: u32,
        neighbors: &[NeighborRecord],
    ) -> f64 {
        prediction::predict_rating(&self.store, user_id, movie_id, neighbors)
    }

    /// Rank the whole catalog for a user, returning the configured top-N
    pub fn recommend(&self, user_id: u32) -> Result<Vec<Recommendation>> {
        self.recommend_top(user_id, self.config.top_n)
    }

    /// Rank the whole catalog for a user, returning the first `top_n` rows
    ///
    /// Every catalog movie gets a predicted score; a per-movie prediction
    /// that fails yields the default sentinel so the ranking stays total.
    /// Rows are sorted by score descending with catalog order breaking
    /// ties, so the result is independent of fan-out completion order.
    pub fn recommend_top(&self, user_id: u32, top_n: usize) -> Result<Vec<Recommendation>> {
        let neighbors = self.neighborhood(user_id, self.config.neighborhood_size)?;
        let movies = self.store.movies();

        let scores: Vec<f64> = self.pool.install(|| {
            movies
                .par_iter()
                .map(|movie| {
                    let score =
                        prediction::predict_rating(&self.store, user_id, movie.id, &neighbors);
                    if score.is_finite() {
                        score
                    } else {
                        warn!(
                            user_id,
                            movie_id = movie.id,
                            "prediction undefined, using default score"
                        );
                        DEFAULT_SCORE
                    }
                })
                .collect()
        });

        let mut rows: Vec<Recommendation> = movies
            .iter()
            .zip(scores)
            .map(|(movie, predicted_score)| Recommendation {
                movie_id: movie.id,
                title: movie.title.clone(),
                genres: movie.genres.clone(),
                predicted_score,
            })
            .collect();

        rows.sort_by(|a, b| {
            b.predicted_score
                .partial_cmp(&a.predicted_score)
                .unwrap_or(Ordering::Equal)
        });
        rows.truncate(top_n);
        Ok(rows)
    }

    /// Attach per-movie catalog aggregates to ranked rows
    pub fn enrich(&self, rows: &[Recommendation]) -> Vec<EnrichedRecommendation> {
        recommendation::enrich(&self.store, rows)
    }

    /// The movies a user rated, with titles and genres
    pub fn rated_movies(&self, user_id: u32) -> Vec<RatedMovie> {
        recommendation::rated_movies(&self.store, user_id)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn cache(&self) -> &NeighborCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use recommender_core::{Movie, Rating, User};
    use tempfile::TempDir;

    fn movie(id: u32, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            genres: "Drama".to_string(),
        }
    }

    fn user(id: u32) -> User {
        User {
            id,
            gender: "F".to_string(),
            age: 25,
            occupation: 0,
            zip: "00000".to_string(),
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

    fn engine_with(
        dir: &TempDir,
        movies: Vec<Movie>,
        users: Vec<User>,
        ratings: Vec<Rating>,
    ) -> RecommenderEngine {
        let store = RatingStore::from_parts(movies, users, ratings);
        let cache = NeighborCache::open(dir.path().join("neighbors.cache")).unwrap();
        let config = EngineConfig {
            cache_path: dir.path().join("neighbors.cache"),
            workers: 2,
            ..EngineConfig::default()
        };
        RecommenderEngine::with_parts(config, store, cache).unwrap()
    }

    /// A zero-variance co-rater yields no neighbor, so the full catalog
    /// comes back with default scores in catalog order.
    #[test]
    fn test_zero_variance_scenario_ranks_catalog_in_order() {
        let dir = TempDir::new().unwrap();
        let engine = engine_with(
            &dir,
            vec![movie(1, "M1"), movie(2, "M2")],
            vec![user(1), user(2)],
            vec![
                rating(1, 1, 5.0),
                rating(1, 2, 3.0),
                rating(2, 1, 4.0),
                rating(2, 2, 4.0),
            ],
        );

        let neighbors = engine.neighborhood(1, 10).unwrap();
        assert!(neighbors.is_empty());

        let rows = engine.recommend_top(1, 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].movie_id, 1);
        assert_eq!(rows[1].movie_id, 2);
        assert_eq!(rows[0].predicted_score, DEFAULT_SCORE);
        assert_eq!(rows[1].predicted_score, DEFAULT_SCORE);
    }

    #[test]
    fn test_unknown_user_gets_full_default_ranking() {
        let dir = TempDir::new().unwrap();
        let engine = engine_with(
            &dir,
            vec![movie(1, "M1"), movie(2, "M2"), movie(3, "M3")],
            vec![user(1)],
            vec![rating(1, 1, 5.0)],
        );

        let rows = engine.recommend_top(999, 10).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.predicted_score == DEFAULT_SCORE));
        let ids: Vec<u32> = rows.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_recommend_returns_min_of_top_n_and_catalog() {
        let dir = TempDir::new().unwrap();
        let engine = engine_with(
            &dir,
            vec![movie(1, "M1"), movie(2, "M2")],
            vec![user(1)],
            vec![rating(1, 1, 5.0)],
        );

        assert_eq!(engine.recommend_top(1, 10).unwrap().len(), 2);
        assert_eq!(engine.recommend_top(1, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_neighborhood_is_idempotent_once_cached() {
        let dir = TempDir::new().unwrap();
        let engine = engine_with(
            &dir,
            vec![movie(1, "M1"), movie(2, "M2"), movie(3, "M3")],
            vec![user(1), user(2), user(3)],
            vec![
                rating(1, 1, 5.0),
                rating(1, 2, 3.0),
                rating(2, 1, 4.0),
                rating(2, 2, 2.0),
                rating(3, 1, 1.0),
                rating(3, 2, 5.0),
            ],
        );

        let first = engine.neighborhood(1, 2).unwrap();
        assert!(engine.cache().contains(1));
        let second = engine.neighborhood(1, 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cached_full_list_serves_larger_k() {
        let dir = TempDir::new().unwrap();
        let engine = engine_with(
            &dir,
            vec![movie(1, "M1"), movie(2, "M2")],
            vec![user(1), user(2), user(3)],
            vec![
                rating(1, 1, 5.0),
                rating(1, 2, 3.0),
                rating(2, 1, 4.0),
                rating(2, 2, 2.0),
                rating(3, 1, 1.0),
                rating(3, 2, 5.0),
            ],
        );

        // First request caches the full list even though only one record
        // is returned.
        let narrow = engine.neighborhood(1, 1).unwrap();
        assert_eq!(narrow.len(), 1);

        let wide = engine.neighborhood(1, 10).unwrap();
        assert_eq!(wide.len(), 2);
    }

    #[test]
    fn test_ranking_orders_by_predicted_score() {
        let dir = TempDir::new().unwrap();
        // U2 and U3 both track U1 perfectly over movies 1 and 2 and have
        // rated movies 3 and 4, pulling their predictions apart.
        let engine = engine_with(
            &dir,
            vec![
                movie(1, "M1"),
                movie(2, "M2"),
                movie(3, "M3"),
                movie(4, "M4"),
            ],
            vec![user(1), user(2), user(3)],
            vec![
                rating(1, 1, 5.0),
                rating(1, 2, 1.0),
                rating(2, 1, 5.0),
                rating(2, 2, 1.0),
                rating(2, 3, 5.0),
                rating(3, 1, 4.0),
                rating(3, 2, 2.0),
                rating(3, 4, 1.0),
            ],
        );

        let rows = engine.recommend_top(1, 4).unwrap();
        let m3_pos = rows.iter().position(|r| r.movie_id == 3).unwrap();
        let m4_pos = rows.iter().position(|r| r.movie_id == 4).unwrap();
        assert!(m3_pos < m4_pos);
        for window in rows.windows(2) {
            assert!(window[0].predicted_score >= window[1].predicted_score);
        }
    }

    #[test]
    fn test_cache_refresh_recomputes() {
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("neighbors.cache");

        let store = RatingStore::from_parts(
            vec![movie(1, "M1"), movie(2, "M2")],
            vec![user(1), user(2)],
            vec![
                rating(1, 1, 5.0),
                rating(1, 2, 3.0),
                rating(2, 1, 4.0),
                rating(2, 2, 2.0),
            ],
        );
        let cache = NeighborCache::open(&cache_path).unwrap();
        // Seed a stale entry that computation would never produce.
        cache
            .store(
                1,
                vec![NeighborRecord {
                    user_id: 99,
                    similarity: 0.123,
                    avg_rating: 3.0,
                }],
            )
            .unwrap();

        let config = EngineConfig {
            cache_path: cache_path.clone(),
            workers: 2,
            cache_refresh: true,
            ..EngineConfig::default()
        };
        let engine = RecommenderEngine::with_parts(config, store, cache).unwrap();

        let refreshed = engine.neighborhood(1, 10).unwrap();
        assert_eq!(refreshed.len(), 1);
        assert_eq!(refreshed[0].user_id, 2);
    }
}
