//! Transfer orchestration.
//!
//! [`Ledger`] runs a transfer as one unit of work:
//!
//! 1. validate the command (no storage access)
//! 2. authorize the caller on both accounts
//! 3. begin a unit
//! 4. record the linked entry pair
//! 5. apply both balance deltas, lower account id first
//! 6. commit
//! 7. build the [`TransferResult`]
//!
//! Any error between 3 and 6 drops the unit, which discards every write made
//! through it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    Account, AccountKind, AccountStore, CorrectionCmd, EngineError, MoneyCents, ResultEngine,
    Storage, TransferCmd, UnitOfWork, guard, journal, util::now_seconds,
};

/// One account as it stands after a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferSide {
    pub id: i32,
    pub name: String,
    pub kind: AccountKind,
    pub balance: MoneyCents,
    /// Signed amount applied to this account.
    pub change: MoneyCents,
}

impl TransferSide {
    fn new(account: Account, change: MoneyCents) -> Self {
        Self {
            id: account.id,
            name: account.name,
            kind: account.kind,
            balance: account.balance,
            change,
        }
    }
}

/// Settlement snapshot of a committed transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferResult {
    pub from: TransferSide,
    pub dest: TransferSide,
    pub date: DateTime<Utc>,
}

/// Entry point for balance-moving operations.
#[derive(Clone, Debug)]
pub struct Ledger<S> {
    storage: S,
}

impl<S: Storage> Ledger<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<TransferResult> {
        let TransferCmd {
            user_id,
            from,
            dest,
            amount,
            dest_kind,
        } = cmd;
        if !amount.is_positive() {
            return Err(EngineError::InvalidInput(
                "amount must be > 0".to_string(),
            ));
        }
        if from == dest {
            return Err(EngineError::InvalidInput(
                "from and dest must differ".to_string(),
            ));
        }

        guard::can_act_on_account(&self.storage, user_id, from).await?;
        let dest_account = guard::can_act_on_account(&self.storage, user_id, dest).await?;
        if let Some(kind) = dest_kind
            && dest_account.kind != kind
        {
            return Err(EngineError::InvalidInput(format!(
                "dest account is not of type {}",
                kind.as_str()
            )));
        }

        let date = now_seconds();
        match self.settle(user_id, from, dest, amount, date).await {
            Ok((from_after, dest_after)) => {
                tracing::info!(
                    user_id = %user_id,
                    from,
                    dest,
                    amount = %amount,
                    "transfer settled"
                );
                Ok(TransferResult {
                    from: TransferSide::new(from_after, -amount),
                    dest: TransferSide::new(dest_after, amount),
                    date,
                })
            }
            Err(err) => {
                tracing::warn!(from, dest, error = %err, "transfer aborted");
                Err(err)
            }
        }
    }

    async fn settle(
        &self,
        user_id: Uuid,
        from: i32,
        dest: i32,
        amount: MoneyCents,
        date: DateTime<Utc>,
    ) -> ResultEngine<(Account, Account)> {
        let unit = self.storage.begin().await?;
        journal::record_pair(&unit, user_id, from, dest, amount, date).await?;

        // Lower id first, whatever the direction: an X->Y and a Y->X transfer
        // then lock the two rows in the same order and cannot deadlock.
        let (from_after, dest_after) = if from < dest {
            let from_after = unit.apply_delta(from, user_id, -amount).await?;
            let dest_after = unit.apply_delta(dest, user_id, amount).await?;
            (from_after, dest_after)
        } else {
            let dest_after = unit.apply_delta(dest, user_id, amount).await?;
            let from_after = unit.apply_delta(from, user_id, -amount).await?;
            (from_after, dest_after)
        };

        unit.commit().await?;
        Ok((from_after, dest_after))
    }

    /// Apply a signed correction to one account and record it as income or
    /// expense. Returns the updated account.
    pub async fn correct(&self, cmd: CorrectionCmd) -> ResultEngine<Account> {
        let CorrectionCmd {
            user_id,
            account_id,
            delta,
        } = cmd;
        if delta.is_zero() {
            return Err(EngineError::InvalidInput(
                "delta must not be 0".to_string(),
            ));
        }
        guard::can_act_on_account(&self.storage, user_id, account_id).await?;

        let unit = self.storage.begin().await?;
        journal::record_correction(&unit, user_id, account_id, delta, now_seconds()).await?;
        let account = unit.apply_delta(account_id, user_id, delta).await?;
        unit.commit().await?;

        tracing::info!(user_id = %user_id, account_id, delta = %delta, "balance corrected");
        Ok(account)
    }
}
