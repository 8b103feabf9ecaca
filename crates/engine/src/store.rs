//! Storage ports.
//!
//! The orchestrator only talks to storage through these traits. Two adapters
//! implement them: [`SeaStore`](crate::SeaStore) over sea-orm and
//! [`MemoryStore`](crate::MemoryStore) in memory.
//!
//! Reads may run directly on a [`Storage`]. Every write runs on a
//! [`UnitOfWork`] obtained from [`Storage::begin`]: its effects become
//! visible on [`UnitOfWork::commit`] and are discarded if the unit is
//! dropped first.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{Account, FinancialGroup, MoneyCents, NewEntry, ResultEngine};

#[async_trait]
pub trait AccountReader: Send + Sync {
    /// Looks up an account regardless of its owner.
    async fn account(&self, account_id: i32) -> ResultEngine<Option<Account>>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Applies `balance = balance + delta` in one row update and returns the
    /// updated account.
    ///
    /// The row must belong to `owner_id` at update time, otherwise
    /// `NotFound`. No balance floor is enforced.
    async fn apply_delta(
        &self,
        account_id: i32,
        owner_id: Uuid,
        delta: MoneyCents,
    ) -> ResultEngine<Account>;
}

#[async_trait]
pub trait LedgerLog: Send + Sync {
    /// Appends an unlinked entry and returns its id.
    async fn append(&self, entry: NewEntry) -> ResultEngine<i32>;

    /// Points `entry_id` at `linked_id`. Fails when the entry is missing or
    /// already linked.
    async fn link(&self, entry_id: i32, linked_id: i32) -> ResultEngine<()>;
}

#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn group(&self, group_id: i32) -> ResultEngine<Option<FinancialGroup>>;

    /// Explicit membership only; ownership is checked on the group itself.
    async fn is_member(&self, group_id: i32, user_id: Uuid) -> ResultEngine<bool>;
}

#[async_trait]
pub trait UnitOfWork: AccountReader + AccountStore + LedgerLog + GroupDirectory {
    /// Makes every write of the unit visible at once.
    async fn commit(self) -> ResultEngine<()>;
}

#[async_trait]
pub trait Storage: AccountReader + GroupDirectory {
    type Unit: UnitOfWork;

    async fn begin(&self) -> ResultEngine<Self::Unit>;
}
