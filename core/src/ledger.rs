use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::*;

/// Balance every new account starts with.
pub const DEFAULT_BALANCE: Amount = Amount::from_dollars(1000);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub balance: Amount,
    /// Oldest first.
    pub transactions: Vec<Transaction>,
}

impl Account {
    pub fn new(balance: Amount) -> Self {
        Self {
            balance,
            transactions: Vec::new(),
        }
    }
}

/// In-process account store backing [`Settlement`] and [`Leaderboard`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLedger {
    accounts: BTreeMap<AccountId, Account>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_account(&mut self, account: AccountId, balance: Amount) -> Result<(), SettlementError> {
        if self.accounts.contains_key(&account) {
            return Err(SettlementError::DuplicateAccount(account));
        }
        log::debug!("opened account {} with {}", account, balance);
        self.accounts.insert(account, Account::new(balance));
        Ok(())
    }

    pub fn account(&self, account: &AccountId) -> Option<&Account> {
        self.accounts.get(account)
    }

    pub fn transactions(&self, account: &AccountId) -> Result<&[Transaction], SettlementError> {
        Ok(&self.get(account)?.transactions)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn get(&self, account: &AccountId) -> Result<&Account, SettlementError> {
        self.accounts
            .get(account)
            .ok_or_else(|| SettlementError::UnknownAccount(account.clone()))
    }

    fn get_mut(&mut self, account: &AccountId) -> Result<&mut Account, SettlementError> {
        self.accounts
            .get_mut(account)
            .ok_or_else(|| SettlementError::UnknownAccount(account.clone()))
    }
}

impl Settlement for MemoryLedger {
    fn balance(&self, account: &AccountId) -> Result<Amount, SettlementError> {
        Ok(self.get(account)?.balance)
    }

    fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, SettlementError> {
        let entry = self.get_mut(account)?;
        entry.balance = entry
            .balance
            .checked_sub(amount)
            .ok_or(SettlementError::InsufficientFunds {
                balance: entry.balance,
                requested: amount,
            })?;
        Ok(entry.balance)
    }

    fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, SettlementError> {
        let entry = self.get_mut(account)?;
        entry.balance = entry
            .balance
            .checked_add(amount)
            .ok_or_else(|| SettlementError::Overflow(account.clone()))?;
        Ok(entry.balance)
    }

    fn append_transaction(
        &mut self,
        account: &AccountId,
        transaction: Transaction,
    ) -> Result<(), SettlementError> {
        self.get_mut(account)?.transactions.push(transaction);
        Ok(())
    }
}

impl Leaderboard for MemoryLedger {
    fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<_> = self
            .accounts
            .iter()
            .map(|(username, account)| LeaderboardEntry {
                username: username.clone(),
                balance: account.balance,
            })
            .collect();
        // stable sort keeps the username order from the map for ties
        entries.sort_by(|a, b| b.balance.cmp(&a.balance));
        entries
    }
}
