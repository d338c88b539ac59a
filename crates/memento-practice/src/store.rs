//! Practice Storage
//!
//! One trait for the practice features' persistence, with an in-memory
//! implementation for development. A SQL-backed store would implement the
//! same trait.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::{PracticeError, Result};
use crate::journal::JournalEntry;
use crate::virtue::VirtueEntry;

/// Storage trait for virtue and journal entries
pub trait PracticeStore: Send + Sync {
    /// Persist a virtue entry
    fn add_virtue_entry(&self, entry: &VirtueEntry) -> Result<()>;

    /// Recent virtue entries for a user, newest first
    fn virtue_entries(&self, user_id: &str, limit: usize) -> Result<Vec<VirtueEntry>>;

    /// The entry for one day, if recorded
    fn virtue_entry_for(&self, user_id: &str, date: NaiveDate) -> Result<Option<VirtueEntry>>;

    /// Persist a journal entry
    fn add_journal_entry(&self, entry: &JournalEntry) -> Result<()>;

    /// Recent journal entries for a user, newest first
    fn journal_entries(&self, user_id: &str, limit: usize) -> Result<Vec<JournalEntry>>;
}

/// In-memory practice store (for development)
pub struct MemoryPracticeStore {
    virtues: RwLock<HashMap<String, Vec<VirtueEntry>>>,
    journal: RwLock<HashMap<String, Vec<JournalEntry>>>,
}

impl Default for MemoryPracticeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPracticeStore {
    pub fn new() -> Self {
        Self {
            virtues: RwLock::new(HashMap::new()),
            journal: RwLock::new(HashMap::new()),
        }
    }
}

impl PracticeStore for MemoryPracticeStore {
    fn add_virtue_entry(&self, entry: &VirtueEntry) -> Result<()> {
        let mut virtues = self
            .virtues
            .write()
            .map_err(|_| PracticeError::Storage("virtue lock poisoned".into()))?;

        let entries = virtues.entry(entry.user_id.clone()).or_default();
        // One entry per day: a re-submission replaces the earlier one
        entries.retain(|e| e.date != entry.date);
        entries.push(entry.clone());

        tracing::debug!(user_id = %entry.user_id, date = %entry.date, "Recorded virtue entry");
        Ok(())
    }

    fn virtue_entries(&self, user_id: &str, limit: usize) -> Result<Vec<VirtueEntry>> {
        let virtues = self
            .virtues
            .read()
            .map_err(|_| PracticeError::Storage("virtue lock poisoned".into()))?;

        let mut entries = virtues.get(user_id).cloned().unwrap_or_default();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries.truncate(limit);
        Ok(entries)
    }

    fn virtue_entry_for(&self, user_id: &str, date: NaiveDate) -> Result<Option<VirtueEntry>> {
        let virtues = self
            .virtues
            .read()
            .map_err(|_| PracticeError::Storage("virtue lock poisoned".into()))?;

        Ok(virtues
            .get(user_id)
            .and_then(|entries| entries.iter().find(|e| e.date == date))
            .cloned())
    }

    fn add_journal_entry(&self, entry: &JournalEntry) -> Result<()> {
        let mut journal = self
            .journal
            .write()
            .map_err(|_| PracticeError::Storage("journal lock poisoned".into()))?;

        journal
            .entry(entry.user_id.clone())
            .or_default()
            .push(entry.clone());

        tracing::debug!(user_id = %entry.user_id, entry_id = %entry.id, "Recorded journal entry");
        Ok(())
    }

    fn journal_entries(&self, user_id: &str, limit: usize) -> Result<Vec<JournalEntry>> {
        let journal = self
            .journal
            .read()
            .map_err(|_| PracticeError::Storage("journal lock poisoned".into()))?;

        let mut entries = journal.get(user_id).cloned().unwrap_or_default();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtue::VirtueRatings;
    use chrono::Utc;

    #[test]
    fn test_virtue_entries_newest_first() {
        let store = MemoryPracticeStore::new();
        let today = Utc::now().date_naive();

        for offset in 0..3 {
            let date = today - chrono::Duration::days(offset);
            let entry =
                VirtueEntry::new("user-1", date, VirtueRatings::new(3, 3, 3, 3)).unwrap();
            store.add_virtue_entry(&entry).unwrap();
        }

        let entries = store.virtue_entries("user-1", 2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, today);
    }

    #[test]
    fn test_resubmission_replaces_same_day_entry() {
        let store = MemoryPracticeStore::new();
        let today = Utc::now().date_naive();

        let first = VirtueEntry::new("user-1", today, VirtueRatings::new(1, 1, 1, 1)).unwrap();
        let second = VirtueEntry::new("user-1", today, VirtueRatings::new(5, 5, 5, 5)).unwrap();
        store.add_virtue_entry(&first).unwrap();
        store.add_virtue_entry(&second).unwrap();

        let entries = store.virtue_entries("user-1", 10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ratings.courage, 5);

        let found = store.virtue_entry_for("user-1", today).unwrap().unwrap();
        assert_eq!(found.id, second.id);
    }

    #[test]
    fn test_journal_entries_newest_first_and_per_user() {
        let store = MemoryPracticeStore::new();
        store
            .add_journal_entry(&JournalEntry::new("a", "first thought").unwrap())
            .unwrap();
        store
            .add_journal_entry(&JournalEntry::new("a", "second thought").unwrap())
            .unwrap();
        store
            .add_journal_entry(&JournalEntry::new("b", "other user").unwrap())
            .unwrap();

        let entries = store.journal_entries("a", 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "second thought");
        assert_eq!(store.journal_entries("b", 10).unwrap().len(), 1);
    }
}
