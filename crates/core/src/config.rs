//! Configuration loading for the recommender engine
//!
//! Environment-driven configuration with validation and `.env` file support.
//! All variables use the `RECOMMENDER_` prefix. The override hierarchy is
//! defaults < .env < environment.

use crate::error::RecommenderError;
use std::path::PathBuf;

/// Configuration loader trait
///
/// Standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    ///
    /// Reads variables with the `RECOMMENDER_` prefix and fills defaults for
    /// anything unset.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if a set variable cannot be parsed.
    fn from_env() -> Result<Self, RecommenderError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if any validation check fails.
    fn validate(&self) -> Result<(), RecommenderError>;
}

/// Dataset configuration
///
/// Locates the three flat data files and bounds how many rows of each are
/// loaded. Limits exist so a deployment can run against a truncated dataset
/// deliberately; they default to unlimited.
///
/// # Environment Variables
///
/// - `RECOMMENDER_DATA_DIR` (optional): directory holding `movies.dat`,
///   `ratings.dat`, and `users.dat` (default: `./data`)
/// - `RECOMMENDER_MAX_MOVIES` (optional): cap on movie rows loaded
/// - `RECOMMENDER_MAX_RATINGS` (optional): cap on rating rows loaded
/// - `RECOMMENDER_MAX_USERS` (optional): cap on user rows loaded
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Directory containing the dataset files
    pub data_dir: PathBuf,
    /// Maximum number of movie rows to load, unlimited when `None`
    pub max_movies: Option<usize>,
    /// Maximum number of rating rows to load, unlimited when `None`
    pub max_ratings: Option<usize>,
    /// Maximum number of user rows to load, unlimited when `None`
    pub max_users: Option<usize>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            max_movies: None,
            max_ratings: None,
            max_users: None,
        }
    }
}

impl DatasetConfig {
    /// Path of the movies file
    pub fn movies_path(&self) -> PathBuf {
        self.data_dir.join("movies.dat")
    }

    /// Path of the ratings file
    pub fn ratings_path(&self) -> PathBuf {
        self.data_dir.join("ratings.dat")
    }

    /// Path of the users file
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.dat")
    }
}

impl ConfigLoader for DatasetConfig {
    fn from_env() -> Result<Self, RecommenderError> {
        let data_dir = std::env::var("RECOMMENDER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| DatasetConfig::default().data_dir);

        Ok(Self {
            data_dir,
            max_movies: parse_optional_env_var("RECOMMENDER_MAX_MOVIES")?,
            max_ratings: parse_optional_env_var("RECOMMENDER_MAX_RATINGS")?,
            max_users: parse_optional_env_var("RECOMMENDER_MAX_USERS")?,
        })
    }

    fn validate(&self) -> Result<(), RecommenderError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(RecommenderError::Configuration {
                message: "data_dir must not be empty".to_string(),
                key: Some("RECOMMENDER_DATA_DIR".to_string()),
            });
        }

        for (limit, key) in [
            (self.max_movies, "RECOMMENDER_MAX_MOVIES"),
            (self.max_ratings, "RECOMMENDER_MAX_RATINGS"),
            (self.max_users, "RECOMMENDER_MAX_USERS"),
        ] {
            if limit == Some(0) {
                return Err(RecommenderError::Configuration {
                    message: format!("{} must be greater than 0 when set", key),
                    key: Some(key.to_string()),
                });
            }
        }

        Ok(())
    }
}

/// Engine configuration
///
/// Tuning knobs for neighborhood selection, result sizing, the worker pool,
/// and the neighbor cache.
///
/// # Environment Variables
///
/// - `RECOMMENDER_CACHE_PATH` (optional): neighbor cache file
///   (default: `<data_dir>/neighbors.cache`)
/// - `RECOMMENDER_NEIGHBORHOOD_SIZE` (optional): neighbors used per
///   prediction (default: 10)
/// - `RECOMMENDER_TOP_N` (optional): recommendations returned (default: 20)
/// - `RECOMMENDER_WORKERS` (optional): worker pool size (default: CPU count)
/// - `RECOMMENDER_CACHE_REFRESH` (optional): when `true`, recompute cached
///   neighborhoods instead of trusting them (default: false)
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Neighbor cache file location
    pub cache_path: PathBuf,
    /// Number of neighbors consulted per prediction
    pub neighborhood_size: usize,
    /// Number of recommendations returned by default
    pub top_n: usize,
    /// Worker pool size for the similarity and prediction fan-outs
    pub workers: usize,
    /// Recompute cached neighborhoods instead of reusing them verbatim.
    ///
    /// The cache is never invalidated when new ratings arrive; this flag is
    /// the explicit opt-out of that compute-once policy.
    pub cache_refresh: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_path: DatasetConfig::default().data_dir.join("neighbors.cache"),
            neighborhood_size: 10,
            top_n: 20,
            workers: num_cpus::get(),
            cache_refresh: false,
        }
    }
}

impl ConfigLoader for EngineConfig {
    fn from_env() -> Result<Self, RecommenderError> {
        let cache_path = match std::env::var("RECOMMENDER_CACHE_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => DatasetConfig::from_env()?.data_dir.join("neighbors.cache"),
        };

        Ok(Self {
            cache_path,
            neighborhood_size: parse_env_var(
                "RECOMMENDER_NEIGHBORHOOD_SIZE",
                EngineConfig::default().neighborhood_size,
            )?,
            top_n: parse_env_var("RECOMMENDER_TOP_N", EngineConfig::default().top_n)?,
            workers: parse_env_var("RECOMMENDER_WORKERS", EngineConfig::default().workers)?,
            cache_refresh: parse_env_var("RECOMMENDER_CACHE_REFRESH", false)?,
        })
    }

    fn validate(&self) -> Result<(), RecommenderError> {
        if self.cache_path.as_os_str().is_empty() {
            return Err(RecommenderError::Configuration {
                message: "cache_path must not be empty".to_string(),
                key: Some("RECOMMENDER_CACHE_PATH".to_string()),
            });
        }

        if self.neighborhood_size == 0 {
            return Err(RecommenderError::Configuration {
                message: "neighborhood_size must be greater than 0".to_string(),
                key: Some("RECOMMENDER_NEIGHBORHOOD_SIZE".to_string()),
            });
        }

        if self.top_n == 0 {
            return Err(RecommenderError::Configuration {
                message: "top_n must be greater than 0".to_string(),
                key: Some("RECOMMENDER_TOP_N".to_string()),
            });
        }

        if self.workers == 0 {
            return Err(RecommenderError::Configuration {
                message: "workers must be greater than 0".to_string(),
                key: Some("RECOMMENDER_WORKERS".to_string()),
            });
        }

        Ok(())
    }
}

/// Helper to parse an environment variable with a default value
fn parse_env_var<T>(key: &str, default: T) -> Result<T, RecommenderError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.parse::<T>().map_err(|e| RecommenderError::Configuration {
                message: format!("Failed to parse {}: {}", key, e),
                key: Some(key.to_string()),
            })
        })
        .unwrap_or(Ok(default))
}

/// Helper to parse an optional environment variable, `None` when unset
fn parse_optional_env_var<T>(key: &str) -> Result<Option<T>, RecommenderError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| RecommenderError::Configuration {
                message: format!("Failed to parse {}: {}", key, e),
                key: Some(key.to_string()),
            }),
        Err(_) => Ok(None),
    }
}

/// Load .env file if present
///
/// Convenience wrapper around dotenvy that stays quiet when no .env file
/// exists.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}
