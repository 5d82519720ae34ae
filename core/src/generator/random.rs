use std::collections::BTreeSet;

use rand::prelude::*;

use super::*;

/// Picks `mine_count` distinct cells out of `total_cells`, uniformly and without replacement.
///
/// Each draw selects the k-th still-free cell, so no draw is ever rejected and the cost is bounded even on nearly
/// full boards.
pub fn place_mines<R: Rng>(
    total_cells: CellCount,
    mine_count: CellCount,
    rng: &mut R,
) -> Result<BTreeSet<CellIndex>> {
    if mine_count == 0 || mine_count >= total_cells {
        return Err(GameError::InvalidConfiguration {
            mines: mine_count,
            total_cells,
        });
    }

    let mut cells = vec![false; total_cells.into()];
    let mut free_cells = total_cells;
    let mut mines = BTreeSet::new();

    while (mines.len() as CellCount) < mine_count {
        let place = rng.random_range(0..free_cells) as usize;
        let Some((index, cell)) = cells
            .iter_mut()
            .enumerate()
            .filter(|(_, is_mine)| !**is_mine)
            .nth(place)
        else {
            log::warn!("Ran out of free cells after placing {} mines", mines.len());
            break;
        };
        *cell = true;
        free_cells -= 1;
        mines.insert(index as CellIndex);
    }

    Ok(mines)
}

/// Purely random placement driven by a 64-bit seed, identical seeds reproduce identical layouts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomMineGenerator {
    seed: u64,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seeds from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(self, config: MinesConfig) -> Result<MineLayout> {
        config.validate()?;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mines = place_mines(config.total_cells(), config.mines, &mut rng)?;
        let mines: Vec<CellIndex> = mines.into_iter().collect();
        let layout = MineLayout::from_mine_indices(config.size, &mines)?;

        // double check mine count
        if layout.mine_count() != config.mines {
            log::warn!(
                "Generated layout count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mines
            );
        }
        Ok(layout)
    }
}
