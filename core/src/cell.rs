use serde::{Deserialize, Serialize};

/// Player-visible state of one cell, as tracked by the round.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundCell {
    #[default]
    Hidden,
    Revealed,
    /// The mine that ended the round.
    Detonated,
}

impl RoundCell {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }
}

/// What a presentation layer should draw for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Safe,
    /// Exposed after the round was lost.
    Mine,
    Detonated,
}

impl CellView {
    pub const fn symbol(self) -> char {
        match self {
            Self::Hidden => '#',
            Self::Safe => '.',
            Self::Mine => '*',
            Self::Detonated => 'X',
        }
    }
}
