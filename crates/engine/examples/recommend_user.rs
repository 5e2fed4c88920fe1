//! Example: Recommend movies for a user
//!
//! Loads the dataset and neighbor cache from environment configuration,
//! computes recommendations for one user, and prints the enriched rows.
//!
//! Run with:
//! ```bash
//! export RECOMMENDER_DATA_DIR="./data"
//! cargo run --example recommend_user -- 1
//! ```

use anyhow::{Context, Result};
use recommender_core::load_dotenv;
use recommender_engine::RecommenderEngine;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();
    load_dotenv();

    let user_id: u32 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "1".to_string())
        .parse()
        .context("user id must be a positive integer")?;

    let engine = RecommenderEngine::from_env()?;
    println!(
        "Loaded {} movies, {} users",
        engine.store().movies().len(),
        engine.store().users().len()
    );

    let neighbors = engine.neighborhood(user_id, engine.config().neighborhood_size)?;
    println!("Neighborhood of user {}: {} users", user_id, neighbors.len());
    for neighbor in &neighbors {
        println!(
            "  user {:>5}  similarity {:>7.4}  avg rating {:.2}",
            neighbor.user_id, neighbor.similarity, neighbor.avg_rating
        );
    }

    let rows = engine.recommend(user_id)?;
    let enriched = engine.enrich(&rows);

    println!("\nTop {} recommendations for user {}:", enriched.len(), user_id);
    for (rank, row) in enriched.iter().enumerate() {
        println!(
            "{:>3}. {:<45} {:>6.3}  [{}] ({} ratings)",
            rank + 1,
            row.title,
            row.predicted_score,
            row.genre_tags.join(", "),
            row.rating_count
        );
    }

    Ok(())
}
