//! Multiplier and hit-probability curves.
//!
//! The multiplier grows with the configured mine density and with every safe reveal, and is capped at
//! [`MAX_MULTIPLIER`]. Probabilities are informational only and never feed into the payout.

use serde::{Deserialize, Serialize};

use crate::*;

/// House exposure cap on any payout multiplier.
pub const MAX_MULTIPLIER: f64 = 10.0;

const MINE_WEIGHT: f64 = 0.2;
const MINE_CURVE_WEIGHT: f64 = 0.05;
const REVEAL_WEIGHT: f64 = 0.1;
const REVEAL_MINE_WEIGHT: f64 = 0.02;

/// Uncapped multiplier contributed by the mine count alone.
pub fn base_multiplier(mines: CellCount) -> f64 {
    let mines = f64::from(mines);
    1.0 + mines * MINE_WEIGHT + mines.powf(1.5) * MINE_CURVE_WEIGHT
}

/// Multiplier previewed before any bet is placed.
pub fn pre_game_multiplier(mines: CellCount) -> f64 {
    base_multiplier(mines).min(MAX_MULTIPLIER)
}

/// Multiplier after `revealed` safe cells.
pub fn multiplier(mines: CellCount, revealed: CellCount) -> f64 {
    let mines_f = f64::from(mines);
    let cell_bonus = f64::from(revealed) * (REVEAL_WEIGHT + mines_f * REVEAL_MINE_WEIGHT);
    (base_multiplier(mines) + cell_bonus).min(MAX_MULTIPLIER)
}

/// Multiplier held by a live round, which stays at 1.0 until the first safe reveal.
pub fn round_multiplier(mines: CellCount, revealed: CellCount) -> f64 {
    if revealed == 0 {
        1.0
    } else {
        multiplier(mines, revealed)
    }
}

/// Chance in percent that the first click hits a mine.
pub fn pre_game_hit_probability(config: &MinesConfig) -> f64 {
    f64::from(config.mines) / f64::from(config.total_cells()) * 100.0
}

/// Display heuristic: the full mine count spread over the cells still hidden.
pub fn hit_probability(config: &MinesConfig, revealed: CellCount) -> f64 {
    let remaining = config.total_cells().saturating_sub(revealed);
    if remaining == 0 {
        return 100.0;
    }
    (f64::from(config.mines) / f64::from(remaining) * 100.0).min(100.0)
}

/// What cashing out now would credit, the stake itself before the first reveal.
pub fn potential_win(bet: Amount, mines: CellCount, revealed: CellCount) -> Amount {
    bet.scale(round_multiplier(mines, revealed))
}

/// Rounds to two decimals for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pre-game figures shown while a mine count is being chosen.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub mines: CellCount,
    pub multiplier: f64,
    pub hit_probability: f64,
}

impl Preview {
    pub fn new(config: &MinesConfig) -> Self {
        Self {
            mines: config.mines,
            multiplier: pre_game_multiplier(config.mines),
            hit_probability: pre_game_hit_probability(config),
        }
    }
}
