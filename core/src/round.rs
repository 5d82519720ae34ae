use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Nothing configured yet.
    #[default]
    Idle,
    /// Mine count chosen, no funds committed.
    Betting,
    Active,
    Lost,
    CashedOut,
}

impl RoundPhase {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Lost | Self::CashedOut)
    }

    pub const fn accepts_config(self) -> bool {
        matches!(self, Self::Idle | Self::Betting)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetPlaced {
    pub bet: Amount,
    pub balance: Amount,
    pub mines: CellCount,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RevealOutcome {
    NoChange,
    Safe { revealed: CellCount, multiplier: f64 },
    /// `logged` is false when the `Loss` record could not be written; the loss stands either way.
    HitMine { lost: Amount, logged: bool },
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashOut {
    pub winnings: Amount,
    pub multiplier: f64,
    pub balance: Amount,
}

/// One player's Mines round, from mine-count selection through settlement.
///
/// Balances and the transaction log stay with the [`Settlement`] passed into each operation; the round only records
/// what it needs to resolve the bet. Every operation either completes its transition, including the settlement
/// calls, or leaves the round exactly as it was.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinesRound {
    account: AccountId,
    config: MinesConfig,
    phase: RoundPhase,
    bet: Amount,
    mine_layout: Option<MineLayout>,
    board: Array2<RoundCell>,
    revealed_count: CellCount,
    multiplier: f64,
    triggered_mine: Option<CellIndex>,
}

impl MinesRound {
    pub fn new(account: AccountId) -> Self {
        Self::with_config(account, MinesConfig::default())
    }

    pub fn with_config(account: AccountId, config: MinesConfig) -> Self {
        Self {
            account,
            config,
            phase: RoundPhase::Idle,
            bet: Amount::ZERO,
            mine_layout: None,
            board: Array2::default(config.size.to_nd_index()),
            revealed_count: 0,
            multiplier: 1.0,
            triggered_mine: None,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn config(&self) -> MinesConfig {
        self.config
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn bet(&self) -> Amount {
        self.bet
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn triggered_mine(&self) -> Option<CellIndex> {
        self.triggered_mine
    }

    pub fn is_revealed(&self, index: CellIndex) -> bool {
        index_to_coords(self.config.size, index)
            .is_some_and(|coords| self.board[coords.to_nd_index()] == RoundCell::Revealed)
    }

    /// Revealed safe cells in ascending order.
    pub fn revealed_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.config.total_cells()).filter(|&index| self.is_revealed(index))
    }

    /// Mine positions, only disclosed once the round has ended.
    pub fn exposed_mines(&self) -> Option<Vec<CellIndex>> {
        match (&self.mine_layout, self.phase.is_finished()) {
            (Some(layout), true) => Some(layout.mine_indices()),
            _ => None,
        }
    }

    pub fn can_cash_out(&self) -> bool {
        self.phase.is_active() && self.revealed_count > 0
    }

    pub fn preview(&self) -> Preview {
        Preview::new(&self.config)
    }

    /// Pre-game probability until a bet is live, then the in-round figure.
    pub fn hit_probability(&self) -> f64 {
        if self.phase.is_active() {
            hit_probability(&self.config, self.revealed_count)
        } else {
            pre_game_hit_probability(&self.config)
        }
    }

    pub fn potential_win(&self) -> Amount {
        if self.phase.is_active() {
            self.bet.scale(self.multiplier)
        } else {
            Amount::ZERO
        }
    }

    pub fn cell_view(&self, index: CellIndex) -> Option<CellView> {
        let coords = index_to_coords(self.config.size, index)?;
        let exposed = self.phase == RoundPhase::Lost
            && self
                .mine_layout
                .as_ref()
                .is_some_and(|layout| layout.contains_mine(index));

        Some(match self.board[coords.to_nd_index()] {
            RoundCell::Detonated => CellView::Detonated,
            RoundCell::Revealed => CellView::Safe,
            RoundCell::Hidden if exposed => CellView::Mine,
            RoundCell::Hidden => CellView::Hidden,
        })
    }

    pub fn configure(&mut self, mines: CellCount) -> Result<Preview> {
        if !self.phase.accepts_config() {
            return Err(GameError::InvalidState(if self.phase.is_active() {
                StateRejection::RoundInProgress
            } else {
                StateRejection::RoundFinished
            }));
        }

        self.config = self.config.with_mines(mines)?;
        self.phase = RoundPhase::Betting;
        log::debug!("{}: configured {} mines", self.account, mines);
        Ok(self.preview())
    }

    /// Debits `amount`, logs the bet and arms a fresh board from `generator`.
    ///
    /// A finished round is reset implicitly. If any settlement step fails the round keeps its previous phase and the
    /// debit, if it happened, is reversed. [`GameError::CompensationFailed`] reports a debit that could not be
    /// reversed.
    pub fn place_bet<S, G>(
        &mut self,
        settlement: &mut S,
        amount: Amount,
        generator: G,
    ) -> Result<BetPlaced>
    where
        S: Settlement + ?Sized,
        G: MineGenerator,
    {
        if self.phase.is_active() {
            return Err(GameError::InvalidBet(BetRejection::RoundInProgress));
        }
        if amount.is_zero() {
            return Err(GameError::InvalidBet(BetRejection::NotPositive));
        }

        let available = settlement.balance(&self.account)?;
        if amount > available {
            return Err(GameError::InvalidBet(BetRejection::InsufficientBalance {
                requested: amount,
                available,
            }));
        }

        let mine_layout = generator.generate(self.config)?;

        let balance = settlement
            .debit(&self.account, amount)
            .map_err(|err| match err {
                SettlementError::InsufficientFunds { balance, requested } => {
                    GameError::InvalidBet(BetRejection::InsufficientBalance {
                        requested,
                        available: balance,
                    })
                }
                err => GameError::SettlementFailure(err),
            })?;

        if let Err(err) =
            settlement.append_transaction(&self.account, Transaction::new(TransactionKind::Bet, amount))
        {
            if let Err(refund_err) = settlement.credit(&self.account, amount) {
                log::error!(
                    "{}: could not refund {} after failed bet log: {}",
                    self.account,
                    amount,
                    refund_err
                );
                return Err(GameError::CompensationFailed {
                    amount,
                    cause: err,
                    compensation: refund_err,
                });
            }
            return Err(err.into());
        }

        self.clear_board();
        self.bet = amount;
        self.mine_layout = Some(mine_layout);
        self.phase = RoundPhase::Active;
        log::debug!(
            "{}: bet {} on {} mines, balance now {}",
            self.account,
            amount,
            self.config.mines,
            balance
        );

        Ok(BetPlaced {
            bet: amount,
            balance,
            mines: self.config.mines,
        })
    }

    /// Uncovers one cell; revealing a cell twice is a no-op.
    ///
    /// Hitting a mine always commits the loss. The bet was already debited, so only the `Loss` record is written; if
    /// that write fails the round is still lost and the outcome carries `logged: false`.
    pub fn reveal<S>(&mut self, settlement: &mut S, index: CellIndex) -> Result<RevealOutcome>
    where
        S: Settlement + ?Sized,
    {
        self.check_active()?;
        let coords =
            index_to_coords(self.config.size, index).ok_or(GameError::InvalidCell(index))?;
        let Some(mine_layout) = &self.mine_layout else {
            return Err(GameError::InvalidState(StateRejection::NotActive(self.phase)));
        };
        let has_mine = mine_layout.contains_mine(index);

        match (self.board[coords.to_nd_index()], has_mine) {
            (RoundCell::Hidden, true) => {
                self.board[coords.to_nd_index()] = RoundCell::Detonated;
                self.triggered_mine = Some(index);
                self.phase = RoundPhase::Lost;
                log::debug!("{}: hit mine at {}, lost {}", self.account, index, self.bet);

                let loss = Transaction::new(TransactionKind::Loss, self.bet);
                let logged = match settlement.append_transaction(&self.account, loss) {
                    Ok(()) => true,
                    Err(err) => {
                        log::error!("{}: could not log loss of {}: {}", self.account, self.bet, err);
                        false
                    }
                };

                Ok(RevealOutcome::HitMine {
                    lost: self.bet,
                    logged,
                })
            }
            (RoundCell::Hidden, false) => {
                self.board[coords.to_nd_index()] = RoundCell::Revealed;
                self.revealed_count += 1;
                self.multiplier = round_multiplier(self.config.mines, self.revealed_count);
                log::trace!(
                    "{}: revealed {} ({} safe), multiplier {:.2}",
                    self.account,
                    index,
                    self.revealed_count,
                    self.multiplier
                );

                Ok(RevealOutcome::Safe {
                    revealed: self.revealed_count,
                    multiplier: self.multiplier,
                })
            }
            _ => Ok(RevealOutcome::NoChange),
        }
    }

    /// Credits `bet * multiplier` and ends the round.
    ///
    /// The credit is reversed and the round stays active if the `Win` record cannot be written.
    pub fn cash_out<S>(&mut self, settlement: &mut S) -> Result<CashOut>
    where
        S: Settlement + ?Sized,
    {
        self.check_active()?;
        if self.revealed_count == 0 {
            return Err(GameError::InvalidState(StateRejection::NothingRevealed));
        }

        let winnings = self.bet.scale(self.multiplier);
        let balance = settlement.credit(&self.account, winnings)?;

        if let Err(err) =
            settlement.append_transaction(&self.account, Transaction::new(TransactionKind::Win, winnings))
        {
            if let Err(revert_err) = settlement.debit(&self.account, winnings) {
                log::error!(
                    "{}: could not revert credit of {} after failed win log: {}",
                    self.account,
                    winnings,
                    revert_err
                );
                return Err(GameError::CompensationFailed {
                    amount: winnings,
                    cause: err,
                    compensation: revert_err,
                });
            }
            return Err(err.into());
        }

        self.phase = RoundPhase::CashedOut;
        log::debug!(
            "{}: cashed out {} at {:.2}x, balance now {}",
            self.account,
            winnings,
            self.multiplier,
            balance
        );

        Ok(CashOut {
            winnings,
            multiplier: self.multiplier,
            balance,
        })
    }

    /// Clears a finished round back to [`RoundPhase::Betting`], keeping the mine count.
    pub fn reset(&mut self) -> Result<()> {
        match self.phase {
            RoundPhase::Active => Err(GameError::InvalidState(StateRejection::RoundInProgress)),
            RoundPhase::Idle | RoundPhase::Betting => Ok(()),
            RoundPhase::Lost | RoundPhase::CashedOut => {
                self.clear_board();
                self.phase = RoundPhase::Betting;
                Ok(())
            }
        }
    }

    fn clear_board(&mut self) {
        self.board = Array2::default(self.config.size.to_nd_index());
        self.mine_layout = None;
        self.revealed_count = 0;
        self.bet = Amount::ZERO;
        self.multiplier = 1.0;
        self.triggered_mine = None;
    }

    fn check_active(&self) -> Result<()> {
        if self.phase.is_active() {
            Ok(())
        } else {
            Err(GameError::InvalidState(StateRejection::NotActive(self.phase)))
        }
    }
}
