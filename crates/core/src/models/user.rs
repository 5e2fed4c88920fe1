//! User model

use serde::{Deserialize, Serialize};

/// A user with the demographic fields carried by the dataset
///
/// Immutable once loaded. Demographics are stored as they appear in the
/// users file; the engine only keys on the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: u32,
    /// Gender marker as found in the dataset ("M" / "F")
    pub gender: String,
    /// Age bracket value
    pub age: u8,
    /// Occupation code
    pub occupation: u32,
    /// Zip code, kept as text (may carry leading zeros or extensions)
    pub zip: String,
}
