//! Virtue Tracker
//!
//! Daily self-ratings across the four cardinal virtues. An entry is only
//! accepted once every virtue carries a rating in 1..=5.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PracticeError, Result};

/// The four cardinal virtues
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Virtue {
    Courage,
    Wisdom,
    Justice,
    Temperance,
}

impl Virtue {
    pub const ALL: [Virtue; 4] = [
        Virtue::Courage,
        Virtue::Wisdom,
        Virtue::Justice,
        Virtue::Temperance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Virtue::Courage => "courage",
            Virtue::Wisdom => "wisdom",
            Virtue::Justice => "justice",
            Virtue::Temperance => "temperance",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Virtue::Courage => "Courage",
            Virtue::Wisdom => "Wisdom",
            Virtue::Justice => "Justice",
            Virtue::Temperance => "Temperance",
        }
    }
}

impl std::fmt::Display for Virtue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One day's ratings, 1-5 per virtue (0 = not yet rated)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtueRatings {
    pub courage: u8,
    pub wisdom: u8,
    pub justice: u8,
    pub temperance: u8,
}

impl VirtueRatings {
    pub fn new(courage: u8, wisdom: u8, justice: u8, temperance: u8) -> Self {
        Self {
            courage,
            wisdom,
            justice,
            temperance,
        }
    }

    pub fn get(&self, virtue: Virtue) -> u8 {
        match virtue {
            Virtue::Courage => self.courage,
            Virtue::Wisdom => self.wisdom,
            Virtue::Justice => self.justice,
            Virtue::Temperance => self.temperance,
        }
    }

    /// Reject unrated or out-of-range virtues
    pub fn validate(&self) -> Result<()> {
        for virtue in Virtue::ALL {
            let value = self.get(virtue);
            if value == 0 {
                return Err(PracticeError::IncompleteRatings);
            }
            if value > 5 {
                return Err(PracticeError::RatingOutOfRange {
                    virtue: virtue.as_str().into(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Mean rating across the four virtues
    pub fn average(&self) -> f32 {
        f32::from(self.courage + self.wisdom + self.justice + self.temperance) / 4.0
    }
}

/// A persisted daily virtue entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VirtueEntry {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub ratings: VirtueRatings,
    pub created_at: DateTime<Utc>,
}

impl VirtueEntry {
    /// Build a validated entry for the given day
    pub fn new(user_id: impl Into<String>, date: NaiveDate, ratings: VirtueRatings) -> Result<Self> {
        ratings.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            date,
            ratings,
            created_at: Utc::now(),
        })
    }

    /// Build a validated entry dated today
    pub fn today(user_id: impl Into<String>, ratings: VirtueRatings) -> Result<Self> {
        Self::new(user_id, Utc::now().date_naive(), ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_full_ratings() {
        assert!(VirtueRatings::new(3, 4, 5, 1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unrated_virtue() {
        let err = VirtueRatings::new(3, 0, 5, 1).validate().unwrap_err();
        assert!(matches!(err, PracticeError::IncompleteRatings));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let err = VirtueRatings::new(3, 6, 5, 1).validate().unwrap_err();
        assert!(matches!(
            err,
            PracticeError::RatingOutOfRange { value: 6, .. }
        ));
    }

    #[test]
    fn test_average() {
        let ratings = VirtueRatings::new(2, 4, 4, 2);
        assert!((ratings.average() - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_entry_requires_valid_ratings() {
        let today = Utc::now().date_naive();
        assert!(VirtueEntry::new("user-1", today, VirtueRatings::default()).is_err());
        assert!(VirtueEntry::new("user-1", today, VirtueRatings::new(1, 2, 3, 4)).is_ok());
    }
}
