//! Error Types for Stoic Practice Features

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PracticeError>;

#[derive(Error, Debug)]
pub enum PracticeError {
    #[error("Rating for {virtue} out of range: {value} (expected 1-5)")]
    RatingOutOfRange { virtue: String, value: u8 },

    #[error("All four virtues must be rated")]
    IncompleteRatings,

    #[error("Journal entry is empty")]
    EmptyEntry,

    #[error("Journal entry too long: {length} characters (max {max})")]
    EntryTooLong { length: usize, max: usize },

    #[error("Birth year {0} out of range")]
    BirthYearOutOfRange(i32),

    #[error("Birth year not set")]
    BirthYearMissing,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
