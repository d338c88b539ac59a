//! Journal
//!
//! Free-form reflection entries, newest first on the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PracticeError, Result};

/// Maximum accepted entry length, in characters
pub const MAX_ENTRY_CHARS: usize = 10_000;

/// A persisted journal entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Build a validated entry
    pub fn new(user_id: impl Into<String>, content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        let trimmed = content.trim();

        if trimmed.is_empty() {
            return Err(PracticeError::EmptyEntry);
        }

        let length = trimmed.chars().count();
        if length > MAX_ENTRY_CHARS {
            return Err(PracticeError::EntryTooLong {
                length,
                max: MAX_ENTRY_CHARS,
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            content: trimmed.to_string(),
            created_at: Utc::now(),
        })
    }

    /// First line of the entry, shortened for list views
    pub fn preview(&self, max_chars: usize) -> String {
        let first_line = self.content.lines().next().unwrap_or_default();
        let preview: String = first_line.chars().take(max_chars).collect();
        if first_line.chars().count() > max_chars {
            format!("{preview}...")
        } else {
            preview
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_content() {
        assert!(matches!(
            JournalEntry::new("user-1", "   \n  "),
            Err(PracticeError::EmptyEntry)
        ));
    }

    #[test]
    fn test_trims_content() {
        let entry = JournalEntry::new("user-1", "  an evening review  ").unwrap();
        assert_eq!(entry.content, "an evening review");
    }

    #[test]
    fn test_rejects_oversized_content() {
        let huge = "a".repeat(MAX_ENTRY_CHARS + 1);
        assert!(matches!(
            JournalEntry::new("user-1", huge),
            Err(PracticeError::EntryTooLong { .. })
        ));
    }

    #[test]
    fn test_preview_shortens_first_line() {
        let entry =
            JournalEntry::new("user-1", "Today I practiced patience.\nMore detail...").unwrap();
        assert_eq!(entry.preview(10), "Today I pr...");
        assert_eq!(entry.preview(100), "Today I practiced patience.");
    }
}
