use serde::{Deserialize, Serialize};

use crate::*;

/// Player-visible view of a round for presentation layers.
///
/// Figures are rounded to two decimals; the round itself keeps full precision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub account: AccountId,
    pub phase: RoundPhase,
    pub size: Coord2,
    pub mines: CellCount,
    pub bet: Amount,
    pub multiplier: f64,
    pub hit_probability: f64,
    pub potential_win: Amount,
    pub revealed: CellCount,
    pub can_cash_out: bool,
    /// Row-major.
    pub cells: Vec<CellView>,
}

impl RoundSnapshot {
    pub fn from_round(round: &MinesRound) -> Self {
        let config = round.config();
        let multiplier = if round.phase().accepts_config() {
            round.preview().multiplier
        } else {
            round.multiplier()
        };
        let cells = (0..config.total_cells())
            .filter_map(|index| round.cell_view(index))
            .collect();

        Self {
            account: round.account().clone(),
            phase: round.phase(),
            size: config.size,
            mines: config.mines,
            bet: round.bet(),
            multiplier: round2(multiplier),
            hit_probability: round2(round.hit_probability()),
            potential_win: round.potential_win(),
            revealed: round.revealed_count(),
            can_cash_out: round.can_cash_out(),
            cells,
        }
    }

    /// One string per board row, using [`CellView::symbol`].
    pub fn grid_rows(&self) -> Vec<String> {
        let width = usize::from(self.size.0.max(1));
        self.cells
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }
}
