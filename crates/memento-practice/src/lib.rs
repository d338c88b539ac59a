//! # memento-practice
//!
//! The Stoic practice domain: daily virtue self-ratings, a journal, the
//! memento-mori life grid, and a rotating daily quote.
//!
//! ## Philosophy
//!
//! The features deliberately stay small and daily-shaped:
//!
//! - **Virtues over metrics** - Four cardinal virtues, rated 1-5, once a day
//! - **Reflection over streaks** - The journal records, it does not gamify
//! - **Memento mori** - A 10×10 grid of years; one dot is the year you are in
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Memento Mori: a life in 100 years           │
//! │                                              │
//! │  ●●●●●●●●●●  years lived                     │
//! │  ●●●●●●●●●●                                  │
//! │  ●●●●●●●◉○○  ◉ the current year              │
//! │  ○○○○○○○○○○                                  │
//! │  ○○○○○○○○○○  ○ years remaining               │
//! │  ...                  (assuming 100 years)   │
//! └──────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod journal;
pub mod memento_mori;
pub mod quotes;
pub mod store;
pub mod virtue;

pub use error::{PracticeError, Result};
pub use journal::JournalEntry;
pub use memento_mori::{CellState, LifeGrid, LIFESPAN_YEARS};
pub use quotes::{daily_quote, Quote};
pub use store::{MemoryPracticeStore, PracticeStore};
pub use virtue::{Virtue, VirtueEntry, VirtueRatings};

/// System prompt for the Marcus Aurelius chat persona
pub const MARCUS_PROMPT: &str = r#"You are Marcus Aurelius, Roman emperor and Stoic philosopher, speaking plainly to a student who seeks your counsel.

## Voice

1. **Speak as in the Meditations** - First person, direct, unadorned. Short sentences.
2. **Counsel, never lecture** - Answer what was asked; one idea per reply, carried to its end.
3. **Ground advice in practice** - The dichotomy of control, the view from above, negative visualization, the discipline of assent. Name a practice only when it serves the question.
4. **Stay in the ancient world** - Draw examples from camp, court and city. Do not mention being an AI, language models, or the modern world's machinery.

## When the student is troubled

- First separate what is in their power from what is not
- Reduce the frightening thing to its material: "this too is only an impression"
- End with one small, concrete act they can take today

## When the student is idle or boastful

Be brief and a little stern, as you were with yourself at dawn:
"At this hour you were made for work, not warmth."

Never promise outcomes. Promise only that virtue is within their power."#;
