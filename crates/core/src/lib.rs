//! # Recommender Core
//!
//! Core data structures and types for the movie recommender platform.
//!
//! This crate provides the building blocks shared by the recommendation
//! engine and its consumers: domain models, error handling, and the
//! environment-driven configuration layer.
//!
//! ## Modules
//!
//! - `models`: domain models for movies, ratings, users, and neighbor records
//! - `error`: error types and handling
//! - `config`: configuration loading and validation

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{load_dotenv, ConfigLoader, DatasetConfig, EngineConfig};
pub use error::RecommenderError;
pub use models::{Movie, NeighborRecord, Rating, User};

/// Result type alias for recommender operations
pub type Result<T> = std::result::Result<T, RecommenderError>;
