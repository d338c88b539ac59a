//! Memento Mori Grid
//!
//! Pure calculation behind the life-visualization widget: one cell per year
//! of an assumed 100-year lifespan, 10 per row, the current year marked.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PracticeError, Result};

/// Assumed lifespan behind the grid
pub const LIFESPAN_YEARS: u32 = 100;

/// Cells per row in the rendered grid
pub const GRID_COLUMNS: usize = 10;

/// Earliest accepted birth year
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// State of one year-cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    /// A year already lived
    Lived,
    /// The year being lived now
    Current,
    /// A year still ahead
    Remaining,
}

/// The computed life grid
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LifeGrid {
    pub birth_year: i32,
    pub age: u32,
    pub years_remaining: u32,
    pub cells: Vec<CellState>,
}

impl LifeGrid {
    /// Compute the grid for a birth year as of `today`.
    ///
    /// Age is whole-year arithmetic; a birth year after `today`, or before
    /// [`MIN_BIRTH_YEAR`], is rejected.
    pub fn new(birth_year: i32, today: NaiveDate) -> Result<Self> {
        if birth_year < MIN_BIRTH_YEAR || birth_year > today.year() {
            return Err(PracticeError::BirthYearOutOfRange(birth_year));
        }

        let age = (today.year() - birth_year) as u32;
        let filled = age.min(LIFESPAN_YEARS) as usize;

        let mut cells = vec![CellState::Remaining; LIFESPAN_YEARS as usize];
        for cell in cells.iter_mut().take(filled) {
            *cell = CellState::Lived;
        }
        if filled > 0 {
            cells[filled - 1] = CellState::Current;
        }

        Ok(Self {
            birth_year,
            age,
            years_remaining: LIFESPAN_YEARS.saturating_sub(age),
            cells,
        })
    }

    /// Compute the grid as of today
    pub fn from_birth_year(birth_year: i32) -> Result<Self> {
        Self::new(birth_year, Utc::now().date_naive())
    }

    /// Rows of [`GRID_COLUMNS`] cells, for rendering
    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks(GRID_COLUMNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 6, 15).unwrap()
    }

    #[test]
    fn test_grid_shape() {
        let grid = LifeGrid::new(1990, date(2026)).unwrap();
        assert_eq!(grid.cells.len(), 100);
        assert_eq!(grid.rows().count(), 10);
        assert!(grid.rows().all(|row| row.len() == 10));
    }

    #[test]
    fn test_counts_are_consistent() {
        let grid = LifeGrid::new(1990, date(2026)).unwrap();
        assert_eq!(grid.age, 36);
        assert_eq!(grid.years_remaining, 64);

        let lived = grid.cells.iter().filter(|c| **c == CellState::Lived).count();
        let current = grid
            .cells
            .iter()
            .filter(|c| **c == CellState::Current)
            .count();
        let remaining = grid
            .cells
            .iter()
            .filter(|c| **c == CellState::Remaining)
            .count();

        assert_eq!(lived, 35);
        assert_eq!(current, 1);
        assert_eq!(remaining, 64);
        assert_eq!(grid.cells[35], CellState::Current);
    }

    #[test]
    fn test_newborn_has_no_filled_cells() {
        let grid = LifeGrid::new(2026, date(2026)).unwrap();
        assert_eq!(grid.age, 0);
        assert!(grid.cells.iter().all(|c| *c == CellState::Remaining));
    }

    #[test]
    fn test_age_past_lifespan_caps_grid() {
        let grid = LifeGrid::new(1920, date(2026)).unwrap();
        assert_eq!(grid.age, 106);
        assert_eq!(grid.years_remaining, 0);
        assert_eq!(grid.cells[99], CellState::Current);
        assert!(grid.cells[..99].iter().all(|c| *c == CellState::Lived));
    }

    #[test]
    fn test_rejects_out_of_range_birth_years() {
        assert!(LifeGrid::new(1850, date(2026)).is_err());
        assert!(LifeGrid::new(2030, date(2026)).is_err());
    }
}
