use thiserror::Error;

use crate::{Amount, CellCount, CellIndex, RoundPhase, SettlementError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {mines} mines on a board of {total_cells} cells")]
    InvalidConfiguration {
        mines: CellCount,
        total_cells: CellCount,
    },
    #[error("Invalid bet: {0}")]
    InvalidBet(BetRejection),
    #[error("Invalid state: {0}")]
    InvalidState(StateRejection),
    #[error("Cell {0} is outside the board")]
    InvalidCell(CellIndex),
    #[error("Settlement failed: {0}")]
    SettlementFailure(#[from] SettlementError),
    /// A settlement step failed and undoing the steps before it failed too, so the account needs manual
    /// reconciliation.
    #[error("Settlement failed: {cause}; reversing {amount} also failed: {compensation}")]
    CompensationFailed {
        amount: Amount,
        cause: SettlementError,
        compensation: SettlementError,
    },
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BetRejection {
    #[error("amount must be positive")]
    NotPositive,
    #[error("{requested} exceeds the available balance of {available}")]
    InsufficientBalance { requested: Amount, available: Amount },
    #[error("a round is already in progress")]
    RoundInProgress,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum StateRejection {
    #[error("no active round (round is {0:?})")]
    NotActive(RoundPhase),
    #[error("a round is in progress")]
    RoundInProgress,
    #[error("the round is over; reset it first")]
    RoundFinished,
    #[error("no safe cell has been revealed yet")]
    NothingRevealed,
}

pub type Result<T, E = GameError> = core::result::Result<T, E>;
