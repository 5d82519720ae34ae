use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::Amount;

/// Username of the account a round settles against.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(username: &str) -> Self {
        Self::new(username)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Bet,
    Win,
    Loss,
}

impl TransactionKind {
    /// Bets and losses are logged as money leaving the account.
    pub const fn is_outflow(self) -> bool {
        matches!(self, Self::Bet | Self::Loss)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Bet => "Bet",
            Self::Win => "Win",
            Self::Loss => "Loss",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub amount: Amount,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: Amount) -> Self {
        Self::at(kind, amount, OffsetDateTime::now_utc())
    }

    pub fn at(kind: TransactionKind, amount: Amount, timestamp: OffsetDateTime) -> Self {
        Self {
            kind,
            amount,
            timestamp,
        }
    }

    /// Amount in cents, negative for bets and losses.
    pub fn signed_cents(&self) -> i64 {
        let cents = i64::try_from(self.amount.cents()).unwrap_or(i64::MAX);
        if self.kind.is_outflow() { -cents } else { cents }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: AccountId,
    pub balance: Amount,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Amount, requested: Amount },
    #[error("unknown account {0}")]
    UnknownAccount(AccountId),
    #[error("account {0} already exists")]
    DuplicateAccount(AccountId),
    #[error("balance overflow on account {0}")]
    Overflow(AccountId),
    #[error("settlement backend unavailable: {0}")]
    Unavailable(String),
}

/// Balance and transaction-log operations a round settles through.
///
/// Each call either applies fully or fails without effect. The round sequences these calls and compensates when a
/// later call in the same transition fails.
pub trait Settlement {
    fn balance(&self, account: &AccountId) -> Result<Amount, SettlementError>;

    /// Removes `amount` and returns the new balance.
    fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, SettlementError>;

    /// Adds `amount` and returns the new balance.
    fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, SettlementError>;

    fn append_transaction(
        &mut self,
        account: &AccountId,
        transaction: Transaction,
    ) -> Result<(), SettlementError>;
}

pub trait Leaderboard {
    /// Accounts ordered by descending balance.
    fn leaderboard(&self) -> Vec<LeaderboardEntry>;
}
