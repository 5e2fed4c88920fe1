//! In-memory rating store over the flat dataset files
//!
//! Loads the movies, ratings, and users relations once at construction and
//! serves read-only queries for the engine's lifetime. Ratings whose user or
//! movie identifier does not resolve are excluded by the join that builds
//! the per-user rated-movie view.

use chrono::{DateTime, TimeZone, Utc};
use recommender_core::{DatasetConfig, Movie, Rating, RecommenderError, Result, User};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Field separator of the dataset files
const FIELD_SEPARATOR: &str = "::";

/// Aggregate rating statistics for one movie
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovieStats {
    /// Number of resolvable ratings the movie received
    pub rating_count: usize,
    /// Mean of those ratings, NaN when the movie has none
    pub mean_rating: f64,
}

/// Read-only tabular view over the Movies, Ratings, and Users relations
#[derive(Debug)]
pub struct RatingStore {
    movies: Vec<Movie>,
    movie_index: HashMap<u32, usize>,
    users: Vec<User>,
    user_index: HashMap<u32, usize>,
    /// Joined view: user id -> (movie id, score) pairs, resolvable ratings only
    by_user: HashMap<u32, Vec<(u32, f64)>>,
    stats: HashMap<u32, MovieStats>,
    skipped_rows: usize,
}

impl RatingStore {
    /// Load the store from the configured dataset files
    ///
    /// Missing or unreadable files are fatal: the engine cannot answer any
    /// query without its data.
    ///
    /// # Errors
    ///
    /// Returns a `Dataset` error naming the offending file.
    pub fn load(config: &DatasetConfig) -> Result<Self> {
        let movies = load_movies(&config.movies_path(), config.max_movies)?;
        let users = load_users(&config.users_path(), config.max_users)?;
        let ratings = load_ratings(&config.ratings_path(), config.max_ratings)?;

        Ok(Self::from_parts(movies, users, ratings))
    }

    /// Build a store from already-materialized relations
    ///
    /// Used by tests and by callers that source the relations elsewhere.
    pub fn from_parts(movies: Vec<Movie>, users: Vec<User>, ratings: Vec<Rating>) -> Self {
        let movie_index: HashMap<u32, usize> = movies
            .iter()
            .enumerate()
            .map(|(idx, m)| (m.id, idx))
            .collect();
        let user_index: HashMap<u32, usize> = users
            .iter()
            .enumerate()
            .map(|(idx, u)| (u.id, idx))
            .collect();

        let mut by_user: HashMap<u32, Vec<(u32, f64)>> = HashMap::new();
        let mut sums: HashMap<u32, (usize, f64)> = HashMap::new();
        let mut unresolvable = 0usize;

        for rating in &ratings {
            if !user_index.contains_key(&rating.user_id)
                || !movie_index.contains_key(&rating.movie_id)
            {
                unresolvable += 1;
                continue;
            }
            by_user
                .entry(rating.user_id)
                .or_default()
                .push((rating.movie_id, rating.score));
            let entry = sums.entry(rating.movie_id).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += rating.score;
        }

        if unresolvable > 0 {
            warn!(
                count = unresolvable,
                "excluded ratings with unresolvable user or movie identifiers"
            );
        }

        let stats = sums
            .into_iter()
            .map(|(movie_id, (count, sum))| {
                (
                    movie_id,
                    MovieStats {
                        rating_count: count,
                        mean_rating: sum / count as f64,
                    },
                )
            })
            .collect();

        info!(
            movies = movies.len(),
            users = users.len(),
            ratings = ratings.len() - unresolvable,
            "rating store built"
        );

        Self {
            movies,
            movie_index,
            users,
            user_index,
            by_user,
            stats,
            skipped_rows: unresolvable,
        }
    }

    /// The full movie catalog, in file order
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// All known users, in file order
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Look up one movie by identifier
    pub fn movie(&self, movie_id: u32) -> Option<&Movie> {
        self.movie_index.get(&movie_id).map(|&idx| &self.movies[idx])
    }

    /// Whether the user identifier resolves in the Users relation
    pub fn has_user(&self, user_id: u32) -> bool {
        self.user_index.contains_key(&user_id)
    }

    /// The (movie id, score) pairs the user produced
    ///
    /// Empty for unknown users and for users without resolvable ratings.
    pub fn ratings_of(&self, user_id: u32) -> &[(u32, f64)] {
        self.by_user
            .get(&user_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Arithmetic mean of the user's rating scores
    ///
    /// NaN when the user has no resolvable ratings; callers must check with
    /// `is_nan` before accumulating.
    pub fn average_rating(&self, user_id: u32) -> f64 {
        let ratings = self.ratings_of(user_id);
        if ratings.is_empty() {
            return f64::NAN;
        }
        let sum: f64 = ratings.iter().map(|(_, score)| score).sum();
        sum / ratings.len() as f64
    }

    /// The user's score for one movie, NaN when they never rated it
    pub fn rating_for(&self, user_id: u32, movie_id: u32) -> f64 {
        self.ratings_of(user_id)
            .iter()
            .find(|(id, _)| *id == movie_id)
            .map(|(_, score)| *score)
            .unwrap_or(f64::NAN)
    }

    /// Aggregate rating statistics for one movie
    pub fn movie_stats(&self, movie_id: u32) -> MovieStats {
        self.stats.get(&movie_id).copied().unwrap_or(MovieStats {
            rating_count: 0,
            mean_rating: f64::NAN,
        })
    }

    /// Count of rating rows excluded by the join
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// Read a dataset file, tolerating legacy Windows-1252 content
///
/// Titles in the movies file may carry single-byte Western characters; the
/// file is decoded as UTF-8 when valid and as Windows-1252 otherwise.
fn read_decoded(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| {
        RecommenderError::dataset(path, format!("cannot read file: {}", e))
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(err.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}

fn load_movies(path: &Path, limit: Option<usize>) -> Result<Vec<Movie>> {
    let text = read_decoded(path)?;
    let mut movies = Vec::new();
    let mut skipped = 0usize;

    for line in text.lines() {
        if limit.is_some_and(|max| movies.len() >= max) {
            break;
        }
        if line.is_empty() {
            continue;
        }
        match parse_movie_line(line) {
            Some(movie) => movies.push(movie),
            None => {
                skipped += 1;
                warn!(path = %path.display(), line, "skipping malformed movie row");
            }
        }
    }

    info!(path = %path.display(), rows = movies.len(), skipped, "loaded movies");
    Ok(movies)
}

fn parse_movie_line(line: &str) -> Option<Movie> {
    let mut parts = line.splitn(3, FIELD_SEPARATOR);
    let id = parts.next()?.parse().ok()?;
    let title = parts.next()?.to_string();
    let genres = parts.next()?.to_string();
    Some(Movie { id, title, genres })
}

fn load_ratings(path: &Path, limit: Option<usize>) -> Result<Vec<Rating>> {
    let text = read_decoded(path)?;
    let mut ratings = Vec::new();
    let mut skipped = 0usize;

    for line in text.lines() {
        if limit.is_some_and(|max| ratings.len() >= max) {
            break;
        }
        if line.is_empty() {
            continue;
        }
        match parse_rating_line(line) {
            Some(rating) => ratings.push(rating),
            None => {
                skipped += 1;
                warn!(path = %path.display(), line, "skipping malformed rating row");
            }
        }
    }

    info!(path = %path.display(), rows = ratings.len(), skipped, "loaded ratings");
    Ok(ratings)
}

fn parse_rating_line(line: &str) -> Option<Rating> {
    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if parts.len() != 4 {
        return None;
    }
    let user_id = parts[0].parse().ok()?;
    let movie_id = parts[1].parse().ok()?;
    let score: f64 = parts[2].parse().ok()?;
    let epoch: i64 = parts[3].parse().ok()?;
    let timestamp: DateTime<Utc> = Utc.timestamp_opt(epoch, 0).single()?;
    Some(Rating {
        user_id,
        movie_id,
        score,
        timestamp,
    })
}

fn load_users(path: &Path, limit: Option<usize>) -> Result<Vec<User>> {
    let text = read_decoded(path)?;
    let mut users = Vec::new();
    let mut skipped = 0usize;

    for line in text.lines() {
        if limit.is_some_and(|max| users.len() >= max) {
            break;
        }
        if line.is_empty() {
            continue;
        }
        match parse_user_line(line) {
            Some(user) => users.push(user),
            None => {
                skipped += 1;
                warn!(path = %path.display(), line, "skipping malformed user row");
            }
        }
    }

    info!(path = %path.display(), rows = users.len(), skipped, "loaded users");
    Ok(users)
}

fn parse_user_line(line: &str) -> Option<User> {
    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if parts.len() != 5 {
        return None;
    }
    Some(User {
        id: parts[0].parse().ok()?,
        gender: parts[1].to_string(),
        age: parts[2].parse().ok()?,
        occupation: parts[3].parse().ok()?,
        zip: parts[4].to_string(),
    })
}
