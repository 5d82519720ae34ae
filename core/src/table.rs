use std::collections::BTreeMap;

use rand::prelude::*;

use crate::*;

/// Rounds for many accounts sharing one settlement backend.
///
/// Each account owns at most one [`MinesRound`], so at most one bet per account can be live. Operations take
/// `&mut self`; hosts serving concurrent requests put the table behind a mutex so each transition and its settlement
/// calls run as one unit.
#[derive(Debug)]
pub struct MinesTable<S> {
    settlement: S,
    rounds: BTreeMap<AccountId, MinesRound>,
    seeds: Option<SmallRng>,
}

impl<S: Settlement> MinesTable<S> {
    /// Mine layouts are seeded from the thread-local generator.
    pub fn new(settlement: S) -> Self {
        Self {
            settlement,
            rounds: BTreeMap::new(),
            seeds: None,
        }
    }

    /// Mine layouts follow a reproducible sequence derived from `seed`.
    pub fn with_seed(settlement: S, seed: u64) -> Self {
        Self {
            settlement,
            rounds: BTreeMap::new(),
            seeds: Some(SmallRng::seed_from_u64(seed)),
        }
    }

    pub fn settlement(&self) -> &S {
        &self.settlement
    }

    pub fn settlement_mut(&mut self) -> &mut S {
        &mut self.settlement
    }

    pub fn into_settlement(self) -> S {
        self.settlement
    }

    pub fn round(&self, account: &AccountId) -> Option<&MinesRound> {
        self.rounds.get(account)
    }

    pub fn snapshot(&self, account: &AccountId) -> Option<RoundSnapshot> {
        self.round(account).map(RoundSnapshot::from_round)
    }

    pub fn active_rounds(&self) -> usize {
        self.rounds
            .values()
            .filter(|round| round.phase().is_active())
            .count()
    }

    pub fn configure(&mut self, account: &AccountId, mines: CellCount) -> Result<Preview> {
        self.round_entry(account).configure(mines)
    }

    pub fn place_bet(&mut self, account: &AccountId, amount: Amount) -> Result<BetPlaced> {
        let generator = self.next_generator();
        log::trace!("{}: layout seed {}", account, generator.seed());
        let round = self
            .rounds
            .entry(account.clone())
            .or_insert_with(|| MinesRound::new(account.clone()));
        round.place_bet(&mut self.settlement, amount, generator)
    }

    /// Like [`Self::place_bet`] but with a caller-chosen generator, for replays.
    pub fn place_bet_with<G: MineGenerator>(
        &mut self,
        account: &AccountId,
        amount: Amount,
        generator: G,
    ) -> Result<BetPlaced> {
        let round = self
            .rounds
            .entry(account.clone())
            .or_insert_with(|| MinesRound::new(account.clone()));
        round.place_bet(&mut self.settlement, amount, generator)
    }

    pub fn reveal(&mut self, account: &AccountId, index: CellIndex) -> Result<RevealOutcome> {
        let round = Self::existing(&mut self.rounds, account)?;
        round.reveal(&mut self.settlement, index)
    }

    pub fn cash_out(&mut self, account: &AccountId) -> Result<CashOut> {
        let round = Self::existing(&mut self.rounds, account)?;
        round.cash_out(&mut self.settlement)
    }

    pub fn reset(&mut self, account: &AccountId) -> Result<()> {
        match self.rounds.get_mut(account) {
            Some(round) => round.reset(),
            None => Ok(()),
        }
    }

    /// Drops a round that holds no live bet.
    pub fn leave(&mut self, account: &AccountId) -> Result<()> {
        if let Some(round) = self.rounds.get(account) {
            if round.phase().is_active() {
                return Err(GameError::InvalidState(StateRejection::RoundInProgress));
            }
        }
        self.rounds.remove(account);
        Ok(())
    }

    fn round_entry(&mut self, account: &AccountId) -> &mut MinesRound {
        self.rounds
            .entry(account.clone())
            .or_insert_with(|| MinesRound::new(account.clone()))
    }

    fn existing<'a>(
        rounds: &'a mut BTreeMap<AccountId, MinesRound>,
        account: &AccountId,
    ) -> Result<&'a mut MinesRound> {
        rounds
            .get_mut(account)
            .ok_or(GameError::InvalidState(StateRejection::NotActive(RoundPhase::Idle)))
    }

    fn next_generator(&mut self) -> RandomMineGenerator {
        match &mut self.seeds {
            Some(seeds) => RandomMineGenerator::new(seeds.random()),
            None => RandomMineGenerator::from_entropy(),
        }
    }
}

impl<S: Settlement + Leaderboard> MinesTable<S> {
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.settlement.leaderboard()
    }
}
