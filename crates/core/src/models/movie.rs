//! Movie catalog model

use serde::{Deserialize, Serialize};

/// A catalog movie
///
/// Loaded once from the movies file and immutable afterwards. The genre
/// field keeps the raw pipe-separated tag string from the dataset
/// (`Animation|Children's|Comedy`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Movie identifier
    pub id: u32,
    /// Display title, may contain non-ASCII characters
    pub title: String,
    /// Pipe-separated genre tag string as found in the dataset
    pub genres: String,
}

impl Movie {
    /// Split the raw genre string into individual tags
    pub fn genre_tags(&self) -> Vec<&str> {
        self.genres
            .split('|')
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}
