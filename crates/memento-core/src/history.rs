//! Chat History
//!
//! Persistence for completed exchanges, listed newest-first the way the
//! dashboard consumes them.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::message::Exchange;

/// Default number of exchanges the dashboard shows
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Chat history storage trait
pub trait ChatHistoryStore: Send + Sync {
    /// Persist a completed exchange
    fn append(&self, exchange: &Exchange) -> Result<()>;

    /// Recent exchanges for a user, newest first
    fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<Exchange>>;

    /// All exchanges for a user, newest first
    fn all(&self, user_id: &str) -> Result<Vec<Exchange>>;

    /// Delete one exchange by id
    fn delete(&self, user_id: &str, id: Uuid) -> Result<()>;
}

/// In-memory chat history (for development)
pub struct MemoryChatHistory {
    by_user: RwLock<HashMap<String, Vec<Exchange>>>,
}

impl Default for MemoryChatHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChatHistory {
    pub fn new() -> Self {
        Self {
            by_user: RwLock::new(HashMap::new()),
        }
    }
}

impl ChatHistoryStore for MemoryChatHistory {
    fn append(&self, exchange: &Exchange) -> Result<()> {
        let mut by_user = self
            .by_user
            .write()
            .map_err(|_| CoreError::History("history lock poisoned".into()))?;

        by_user
            .entry(exchange.user_id.clone())
            .or_default()
            .push(exchange.clone());

        Ok(())
    }

    fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<Exchange>> {
        let mut all = self.all(user_id)?;
        all.truncate(limit);
        Ok(all)
    }

    fn all(&self, user_id: &str) -> Result<Vec<Exchange>> {
        let by_user = self
            .by_user
            .read()
            .map_err(|_| CoreError::History("history lock poisoned".into()))?;

        let mut exchanges = by_user.get(user_id).cloned().unwrap_or_default();
        exchanges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(exchanges)
    }

    fn delete(&self, user_id: &str, id: Uuid) -> Result<()> {
        let mut by_user = self
            .by_user
            .write()
            .map_err(|_| CoreError::History("history lock poisoned".into()))?;

        if let Some(exchanges) = by_user.get_mut(user_id) {
            exchanges.retain(|e| e.id != id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let store = MemoryChatHistory::new();

        for i in 0..4 {
            let mut exchange = Exchange::new("user-1", format!("q{}", i), format!("a{}", i));
            exchange.created_at =
                chrono::Utc::now() + chrono::Duration::seconds(i);
            store.append(&exchange).unwrap();
        }

        let recent = store.recent("user-1", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].user_message, "q3");
        assert_eq!(recent[1].user_message, "q2");
    }

    #[test]
    fn test_histories_are_per_user() {
        let store = MemoryChatHistory::new();
        store.append(&Exchange::new("a", "qa", "ra")).unwrap();
        store.append(&Exchange::new("b", "qb", "rb")).unwrap();

        assert_eq!(store.all("a").unwrap().len(), 1);
        assert_eq!(store.all("b").unwrap().len(), 1);
        assert!(store.all("c").unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let store = MemoryChatHistory::new();
        let exchange = Exchange::new("user-1", "q", "a");
        store.append(&exchange).unwrap();

        store.delete("user-1", exchange.id).unwrap();
        assert!(store.all("user-1").unwrap().is_empty());
    }
}
