use mines_core::*;

fn open(balance: Amount) -> (MemoryLedger, AccountId) {
    let account = AccountId::from("player");
    let mut ledger = MemoryLedger::new();
    ledger.open_account(account.clone(), balance).unwrap();
    (ledger, account)
}

fn layout(mines: &[CellIndex]) -> MineLayout {
    MineLayout::from_mine_indices(DEFAULT_SIZE, mines).unwrap()
}

/// Ledger wrapper that fails selected calls.
#[derive(Default)]
struct FlakyLedger {
    inner: MemoryLedger,
    fail_debit: bool,
    fail_credit: bool,
    fail_append: Option<TransactionKind>,
}

impl FlakyLedger {
    fn unavailable() -> SettlementError {
        SettlementError::Unavailable("injected".to_owned())
    }
}

impl Settlement for FlakyLedger {
    fn balance(&self, account: &AccountId) -> Result<Amount, SettlementError> {
        self.inner.balance(account)
    }

    fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, SettlementError> {
        if self.fail_debit {
            return Err(Self::unavailable());
        }
        self.inner.debit(account, amount)
    }

    fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, SettlementError> {
        if self.fail_credit {
            return Err(Self::unavailable());
        }
        self.inner.credit(account, amount)
    }

    fn append_transaction(
        &mut self,
        account: &AccountId,
        transaction: Transaction,
    ) -> Result<(), SettlementError> {
        if self.fail_append == Some(transaction.kind) {
            return Err(Self::unavailable());
        }
        self.inner.append_transaction(account, transaction)
    }
}

fn flaky(balance: Amount) -> (FlakyLedger, AccountId) {
    let (inner, account) = open(balance);
    (
        FlakyLedger {
            inner,
            ..Default::default()
        },
        account,
    )
}

#[test]
fn one_mine_hundred_dollar_cash_out() {
    let (mut ledger, account) = open(Amount::from_dollars(1000));
    let mut round = MinesRound::new(account.clone());
    round.configure(1).unwrap();

    let placed = round
        .place_bet(&mut ledger, Amount::from_dollars(100), layout(&[24]))
        .unwrap();
    assert_eq!(placed.balance, Amount::from_dollars(900));

    round.reveal(&mut ledger, 0).unwrap();
    assert_eq!(round2(round.multiplier()), 1.37);

    let cash_out = round.cash_out(&mut ledger).unwrap();
    assert_eq!(cash_out.winnings, Amount::from_cents(13700));
    assert_eq!(ledger.balance(&account), Ok(Amount::from_cents(103700)));
    assert_eq!(cash_out.balance.to_string(), "$1037.00");

    let signed: Vec<_> = ledger
        .transactions(&account)
        .unwrap()
        .iter()
        .map(|tx| (tx.kind, tx.signed_cents()))
        .collect();
    assert_eq!(
        signed,
        vec![(TransactionKind::Bet, -10000), (TransactionKind::Win, 13700)]
    );
}

#[test]
fn five_mines_first_click_loss() {
    let (mut ledger, account) = open(Amount::from_dollars(1000));
    let mut round = MinesRound::new(account.clone());
    round.configure(5).unwrap();
    round
        .place_bet(&mut ledger, Amount::from_dollars(100), layout(&[0, 1, 2, 3, 4]))
        .unwrap();

    let outcome = round.reveal(&mut ledger, 2).unwrap();

    assert_eq!(
        outcome,
        RevealOutcome::HitMine {
            lost: Amount::from_dollars(100),
            logged: true,
        }
    );
    assert_eq!(round.phase(), RoundPhase::Lost);
    assert_eq!(ledger.balance(&account), Ok(Amount::from_dollars(900)));
    assert!(
        ledger
            .transactions(&account)
            .unwrap()
            .iter()
            .all(|tx| tx.kind != TransactionKind::Win)
    );
}

#[test]
fn cash_out_before_reveal_is_rejected() {
    let (mut ledger, account) = open(Amount::from_dollars(1000));
    let mut round = MinesRound::new(account.clone());
    round
        .place_bet(&mut ledger, Amount::from_dollars(100), layout(&[0]))
        .unwrap();

    let err = round.cash_out(&mut ledger).unwrap_err();

    assert!(matches!(err, GameError::InvalidState(_)));
    assert_eq!(ledger.balance(&account), Ok(Amount::from_dollars(900)));
    assert_eq!(round.phase(), RoundPhase::Active);
}

#[test]
fn unaffordable_bet_is_rejected() {
    let (mut ledger, account) = open(Amount::from_dollars(1000));
    let mut round = MinesRound::new(account.clone());
    round.configure(3).unwrap();

    let err = round
        .place_bet(&mut ledger, Amount::from_dollars(2000), layout(&[0, 1, 2]))
        .unwrap_err();

    assert!(matches!(err, GameError::InvalidBet(_)));
    assert_eq!(round.phase(), RoundPhase::Betting);
    assert_eq!(ledger.balance(&account), Ok(Amount::from_dollars(1000)));
}

#[test]
fn cash_out_pays_multiplier_for_every_reveal_count() {
    for mines in [1, 3, 5, 10, 24] {
        let safe: Vec<CellIndex> = (mines..25).collect();
        let mine_cells: Vec<CellIndex> = (0..mines).collect();

        for reveals in 1..=safe.len() {
            let (mut ledger, account) = open(Amount::from_dollars(1000));
            let mut round = MinesRound::new(account.clone());
            round.configure(mines).unwrap();
            round
                .place_bet(&mut ledger, Amount::from_cents(4321), layout(&mine_cells))
                .unwrap();

            let mut previous = round.multiplier();
            for &index in &safe[..reveals] {
                round.reveal(&mut ledger, index).unwrap();
                assert!(round.multiplier() >= previous);
                assert!(round.multiplier() >= 1.0);
                previous = round.multiplier();
            }

            let expected = Amount::from_cents(4321).scale(multiplier(mines, reveals as CellCount));
            let cash_out = round.cash_out(&mut ledger).unwrap();
            assert_eq!(cash_out.winnings, expected);
            assert_eq!(
                ledger.balance(&account),
                Ok(Amount::from_cents(100000 - 4321 + expected.cents()))
            );
        }
    }
}

#[test]
fn failed_debit_keeps_round_in_betting() {
    let (mut ledger, account) = flaky(Amount::from_dollars(1000));
    ledger.fail_debit = true;
    let mut round = MinesRound::new(account.clone());
    round.configure(2).unwrap();

    let err = round
        .place_bet(&mut ledger, Amount::from_dollars(100), layout(&[0, 1]))
        .unwrap_err();

    assert!(matches!(err, GameError::SettlementFailure(_)));
    assert_eq!(round.phase(), RoundPhase::Betting);
    assert_eq!(ledger.balance(&account), Ok(Amount::from_dollars(1000)));
}

#[test]
fn failed_bet_log_refunds_debit() {
    let (mut ledger, account) = flaky(Amount::from_dollars(1000));
    ledger.fail_append = Some(TransactionKind::Bet);
    let mut round = MinesRound::new(account.clone());

    let err = round
        .place_bet(&mut ledger, Amount::from_dollars(100), layout(&[0]))
        .unwrap_err();

    assert!(matches!(err, GameError::SettlementFailure(_)));
    assert_eq!(round.phase(), RoundPhase::Idle);
    assert_eq!(ledger.balance(&account), Ok(Amount::from_dollars(1000)));
    assert!(ledger.inner.transactions(&account).unwrap().is_empty());
}

#[test]
fn failed_credit_keeps_round_active() {
    let (mut ledger, account) = flaky(Amount::from_dollars(1000));
    let mut round = MinesRound::new(account.clone());
    round
        .place_bet(&mut ledger, Amount::from_dollars(100), layout(&[0]))
        .unwrap();
    round.reveal(&mut ledger, 1).unwrap();
    ledger.fail_credit = true;

    let err = round.cash_out(&mut ledger).unwrap_err();

    assert!(matches!(err, GameError::SettlementFailure(_)));
    assert_eq!(round.phase(), RoundPhase::Active);
    assert_eq!(ledger.balance(&account), Ok(Amount::from_dollars(900)));

    ledger.fail_credit = false;
    let cash_out = round.cash_out(&mut ledger).unwrap();
    assert_eq!(cash_out.balance, Amount::from_cents(103700));
}

#[test]
fn failed_win_log_reverts_credit() {
    let (mut ledger, account) = flaky(Amount::from_dollars(1000));
    let mut round = MinesRound::new(account.clone());
    round
        .place_bet(&mut ledger, Amount::from_dollars(100), layout(&[0]))
        .unwrap();
    round.reveal(&mut ledger, 1).unwrap();
    ledger.fail_append = Some(TransactionKind::Win);

    assert!(round.cash_out(&mut ledger).is_err());
    assert_eq!(round.phase(), RoundPhase::Active);
    assert_eq!(ledger.balance(&account), Ok(Amount::from_dollars(900)));
}

#[test]
fn unrefunded_bet_is_reported() {
    let (mut ledger, account) = flaky(Amount::from_dollars(1000));
    ledger.fail_append = Some(TransactionKind::Bet);
    ledger.fail_credit = true;
    let mut round = MinesRound::new(account.clone());

    let err = round
        .place_bet(&mut ledger, Amount::from_dollars(100), layout(&[0]))
        .unwrap_err();

    assert_eq!(
        err,
        GameError::CompensationFailed {
            amount: Amount::from_dollars(100),
            cause: FlakyLedger::unavailable(),
            compensation: FlakyLedger::unavailable(),
        }
    );
    assert_eq!(round.phase(), RoundPhase::Idle);
    assert_eq!(ledger.balance(&account), Ok(Amount::from_dollars(900)));
}

#[test]
fn unreverted_win_is_reported() {
    let (mut ledger, account) = flaky(Amount::from_dollars(1000));
    let mut round = MinesRound::new(account.clone());
    round
        .place_bet(&mut ledger, Amount::from_dollars(100), layout(&[0]))
        .unwrap();
    round.reveal(&mut ledger, 1).unwrap();
    ledger.fail_append = Some(TransactionKind::Win);
    ledger.fail_debit = true;

    let err = round.cash_out(&mut ledger).unwrap_err();

    assert!(matches!(
        err,
        GameError::CompensationFailed { amount, .. } if amount == Amount::from_cents(13700)
    ));
    assert_eq!(round.phase(), RoundPhase::Active);
}

#[test]
fn failed_loss_log_still_ends_round() {
    let (mut ledger, account) = flaky(Amount::from_dollars(1000));
    let mut round = MinesRound::new(account.clone());
    round
        .place_bet(&mut ledger, Amount::from_dollars(100), layout(&[0]))
        .unwrap();
    ledger.fail_append = Some(TransactionKind::Loss);

    let outcome = round.reveal(&mut ledger, 0).unwrap();

    assert_eq!(
        outcome,
        RevealOutcome::HitMine {
            lost: Amount::from_dollars(100),
            logged: false,
        }
    );
    assert_eq!(round.phase(), RoundPhase::Lost);
    assert_eq!(ledger.balance(&account), Ok(Amount::from_dollars(900)));
    let kinds: Vec<_> = ledger
        .inner
        .transactions(&account)
        .unwrap()
        .iter()
        .map(|tx| tx.kind)
        .collect();
    assert_eq!(kinds, vec![TransactionKind::Bet]);
    assert!(matches!(
        round.reveal(&mut ledger, 1),
        Err(GameError::InvalidState(_))
    ));
}

#[test]
fn random_rounds_keep_mines_and_reveals_disjoint() {
    let account = AccountId::from("player");
    let mut ledger = MemoryLedger::new();
    ledger.open_account(account.clone(), Amount::from_dollars(1_000_000)).unwrap();
    let mut table = MinesTable::with_seed(ledger, 99);

    for mines in 1..=24 {
        table.reset(&account).unwrap();
        table.configure(&account, mines).unwrap();
        table.place_bet(&account, Amount::from_dollars(1)).unwrap();

        for index in 0..25 {
            match table.reveal(&account, index) {
                Ok(_) => {}
                Err(GameError::InvalidState(_)) => break,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }

        let round = table.round(&account).unwrap();
        if round.phase().is_active() {
            table.cash_out(&account).unwrap();
        }
        let round = table.round(&account).unwrap();
        let mines_at = round.exposed_mines().unwrap();
        assert_eq!(mines_at.len(), mines as usize);
        assert!(round.revealed_cells().all(|index| !mines_at.contains(&index)));
        assert_eq!(round.revealed_cells().count(), round.revealed_count() as usize);
    }
}
