//! Daily Quotes
//!
//! A small fixed catalogue; the day's quote is chosen deterministically so
//! every request on a given date sees the same one.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A quotation with attribution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

pub const QUOTES: &[Quote] = &[
    Quote {
        text: "You could leave life right now. Let that determine what you do and say and think.",
        author: "Marcus Aurelius",
    },
    Quote {
        text: "Waste no more time arguing about what a good man should be. Be one.",
        author: "Marcus Aurelius",
    },
    Quote {
        text: "The impediment to action advances action. What stands in the way becomes the way.",
        author: "Marcus Aurelius",
    },
    Quote {
        text: "It is not that we have a short time to live, but that we waste a lot of it.",
        author: "Seneca",
    },
    Quote {
        text: "Luck is what happens when preparation meets opportunity.",
        author: "Seneca",
    },
    Quote {
        text: "Man is not worried by real problems so much as by his imagined anxieties about real problems.",
        author: "Epictetus",
    },
    Quote {
        text: "No man is free who is not master of himself.",
        author: "Epictetus",
    },
    Quote {
        text: "First say to yourself what you would be; and then do what you have to do.",
        author: "Epictetus",
    },
    Quote {
        text: "Confine yourself to the present.",
        author: "Marcus Aurelius",
    },
    Quote {
        text: "He who fears death will never do anything worthy of a man who is alive.",
        author: "Seneca",
    },
    Quote {
        text: "Dwell on the beauty of life. Watch the stars, and see yourself running with them.",
        author: "Marcus Aurelius",
    },
    Quote {
        text: "Wealth consists not in having great possessions, but in having few wants.",
        author: "Epictetus",
    },
];

/// The quote for a given date
pub fn quote_for(date: NaiveDate) -> &'static Quote {
    let index = date.num_days_from_ce().unsigned_abs() as usize % QUOTES.len();
    &QUOTES[index]
}

/// Today's quote
pub fn daily_quote() -> &'static Quote {
    quote_for(Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_is_deterministic_per_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(quote_for(date), quote_for(date));
    }

    #[test]
    fn test_quote_rotates_across_days() {
        let first = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let next = first.succ_opt().unwrap();
        assert_ne!(quote_for(first), quote_for(next));
    }

    #[test]
    fn test_catalogue_is_well_formed() {
        assert!(!QUOTES.is_empty());
        assert!(QUOTES.iter().all(|q| !q.text.is_empty() && !q.author.is_empty()));
    }
}
