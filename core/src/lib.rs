use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use amount::*;
pub use cell::*;
pub use error::*;
pub use generator::*;
pub use ledger::*;
pub use payout::*;
pub use round::*;
pub use settlement::*;
pub use snapshot::*;
pub use table::*;
pub use types::*;

mod amount;
mod cell;
mod error;
mod generator;
mod ledger;
mod payout;
mod round;
mod settlement;
mod snapshot;
mod table;
mod types;

/// Board size of the product, a fixed 5x5 grid.
pub const DEFAULT_SIZE: Coord2 = (5, 5);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinesConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl MinesConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Accepts between one mine and one less than the number of cells.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        config.validate()?;
        Ok(config)
    }

    pub fn with_mines(self, mines: CellCount) -> Result<Self> {
        Self::new(self.size, mines)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mines == 0 || self.mines > self.max_mines() {
            return Err(GameError::InvalidConfiguration {
                mines: self.mines,
                total_cells: self.total_cells(),
            });
        }
        Ok(())
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn max_mines(&self) -> CellCount {
        self.total_cells().saturating_sub(1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

impl Default for MinesConfig {
    fn default() -> Self {
        Self::new_unchecked(DEFAULT_SIZE, 1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub(crate) fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    /// Builds a layout from explicit mine positions, for replays and tests.
    pub fn from_mine_indices(size: Coord2, mine_indices: &[CellIndex]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &index in mine_indices {
            let coords = index_to_coords(size, index).ok_or(GameError::InvalidCell(index))?;
            mine_mask[coords.to_nd_index()] = true;
        }

        let layout = Self::from_mine_mask(mine_mask);
        layout.config().validate()?;
        Ok(layout)
    }

    pub fn config(&self) -> MinesConfig {
        MinesConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn validate_index(&self, index: CellIndex) -> Result<Coord2> {
        index_to_coords(self.size(), index).ok_or(GameError::InvalidCell(index))
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.mine_mask.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, index: CellIndex) -> bool {
        index_to_coords(self.size(), index).is_some_and(|coords| self[coords])
    }

    /// Mine positions in ascending row-major order.
    pub fn mine_indices(&self) -> Vec<CellIndex> {
        let size = self.size();
        (0..self.total_cells())
            .filter(|&index| index_to_coords(size, index).is_some_and(|coords| self[coords]))
            .collect()
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, (x, y): Coord2) -> &Self::Output {
        &self.mine_mask[(x as usize, y as usize)]
    }
}
