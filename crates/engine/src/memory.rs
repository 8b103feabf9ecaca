//! In-memory storage adapter.
//!
//! A unit takes the store lock for its whole lifetime and works on a staged
//! copy of the state, so units are serialized and a dropped unit leaves
//! nothing behind. Faults can be injected to make a chosen step fail.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    Account, AccountKind, AccountReader, AccountStore, EngineError, FinancialGroup,
    GroupDirectory, LedgerEntry, LedgerLog, MoneyCents, NewEntry, ResultEngine, Storage,
    UnitOfWork, util::now_seconds,
};

/// A storage step that should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// The `nth` append of a unit fails (1-based).
    Append { nth: usize },
    /// The `nth` link of a unit fails (1-based).
    Link { nth: usize },
    /// Every delta applied to this account fails.
    ApplyDelta { account_id: i32 },
    Commit,
}

#[derive(Clone, Debug, Default)]
struct State {
    accounts: BTreeMap<i32, Account>,
    entries: BTreeMap<i32, LedgerEntry>,
    groups: BTreeMap<i32, FinancialGroup>,
    members: BTreeSet<(i32, Uuid)>,
    next_account_id: i32,
    next_entry_id: i32,
    next_group_id: i32,
}

impl State {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<AsyncMutex<State>>,
    faults: Arc<Mutex<Vec<Fault>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(step: &str) -> EngineError {
    EngineError::internal(format!("injected fault: {step}"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a fault for every unit started afterwards.
    pub fn inject(&self, fault: Fault) {
        lock(&self.faults).push(fault);
    }

    pub fn clear_faults(&self) {
        lock(&self.faults).clear();
    }

    pub async fn insert_account(
        &self,
        user_id: Uuid,
        name: &str,
        kind: AccountKind,
        balance: MoneyCents,
    ) -> Account {
        let mut state = self.state.lock().await;
        let now = now_seconds();
        let account = Account {
            id: State::next_id(&mut state.next_account_id),
            user_id,
            name: name.to_string(),
            category_id: None,
            kind,
            balance,
            created_at: now,
            updated_at: now,
        };
        state.accounts.insert(account.id, account.clone());
        account
    }

    pub async fn insert_group(&self, owner_id: Uuid, name: &str) -> FinancialGroup {
        let mut state = self.state.lock().await;
        let now = now_seconds();
        let group = FinancialGroup {
            id: State::next_id(&mut state.next_group_id),
            name: name.to_string(),
            owner_id,
            image_id: None,
            created_at: now,
            updated_at: now,
        };
        state.groups.insert(group.id, group.clone());
        group
    }

    pub async fn insert_member(&self, group_id: i32, user_id: Uuid) {
        self.state.lock().await.members.insert((group_id, user_id));
    }

    /// Committed entries, in insertion order.
    pub async fn entries(&self) -> Vec<LedgerEntry> {
        self.state.lock().await.entries.values().cloned().collect()
    }
}

#[async_trait]
impl AccountReader for MemoryStore {
    async fn account(&self, account_id: i32) -> ResultEngine<Option<Account>> {
        Ok(self.state.lock().await.accounts.get(&account_id).cloned())
    }
}

#[async_trait]
impl GroupDirectory for MemoryStore {
    async fn group(&self, group_id: i32) -> ResultEngine<Option<FinancialGroup>> {
        Ok(self.state.lock().await.groups.get(&group_id).cloned())
    }

    async fn is_member(&self, group_id: i32, user_id: Uuid) -> ResultEngine<bool> {
        Ok(self.state.lock().await.members.contains(&(group_id, user_id)))
    }
}

#[async_trait]
impl Storage for MemoryStore {
    type Unit = MemoryUnit;

    async fn begin(&self) -> ResultEngine<MemoryUnit> {
        let base = Arc::clone(&self.state).lock_owned().await;
        let staged = Staged {
            state: (*base).clone(),
            appends: 0,
            links: 0,
        };
        Ok(MemoryUnit {
            base,
            staged: Mutex::new(staged),
            faults: lock(&self.faults).clone(),
        })
    }
}

#[derive(Debug)]
struct Staged {
    state: State,
    appends: usize,
    links: usize,
}

/// A unit of work over [`MemoryStore`].
///
/// Holds the store lock until it is committed or dropped.
#[derive(Debug)]
pub struct MemoryUnit {
    base: OwnedMutexGuard<State>,
    staged: Mutex<Staged>,
    faults: Vec<Fault>,
}

impl MemoryUnit {
    fn armed(&self, fault: Fault) -> bool {
        self.faults.contains(&fault)
    }
}

#[async_trait]
impl AccountReader for MemoryUnit {
    async fn account(&self, account_id: i32) -> ResultEngine<Option<Account>> {
        Ok(lock(&self.staged).state.accounts.get(&account_id).cloned())
    }
}

#[async_trait]
impl GroupDirectory for MemoryUnit {
    async fn group(&self, group_id: i32) -> ResultEngine<Option<FinancialGroup>> {
        Ok(lock(&self.staged).state.groups.get(&group_id).cloned())
    }

    async fn is_member(&self, group_id: i32, user_id: Uuid) -> ResultEngine<bool> {
        Ok(lock(&self.staged).state.members.contains(&(group_id, user_id)))
    }
}

#[async_trait]
impl AccountStore for MemoryUnit {
    async fn apply_delta(
        &self,
        account_id: i32,
        owner_id: Uuid,
        delta: MoneyCents,
    ) -> ResultEngine<Account> {
        if self.armed(Fault::ApplyDelta { account_id }) {
            return Err(injected("apply_delta"));
        }
        let mut staged = lock(&self.staged);
        let account = staged
            .state
            .accounts
            .get_mut(&account_id)
            .filter(|account| account.is_owned_by(owner_id))
            .ok_or_else(|| EngineError::NotFound("account".to_string()))?;
        account.balance = account
            .balance
            .checked_add(delta)
            .ok_or_else(|| EngineError::InvalidInput("balance out of range".to_string()))?;
        account.updated_at = now_seconds();
        Ok(account.clone())
    }
}

#[async_trait]
impl LedgerLog for MemoryUnit {
    async fn append(&self, entry: NewEntry) -> ResultEngine<i32> {
        let mut staged = lock(&self.staged);
        staged.appends += 1;
        if self.armed(Fault::Append { nth: staged.appends }) {
            return Err(injected("append"));
        }
        if !staged.state.accounts.contains_key(&entry.account_id) {
            return Err(EngineError::InvalidInput(
                "invalid reference: account".to_string(),
            ));
        }
        let id = State::next_id(&mut staged.state.next_entry_id);
        staged.state.entries.insert(id, ledger_entry(id, entry));
        Ok(id)
    }

    async fn link(&self, entry_id: i32, linked_id: i32) -> ResultEngine<()> {
        let mut staged = lock(&self.staged);
        staged.links += 1;
        if self.armed(Fault::Link { nth: staged.links }) {
            return Err(injected("link"));
        }
        match staged.state.entries.get_mut(&entry_id) {
            Some(entry) if entry.linked_entry_id.is_none() => {
                entry.linked_entry_id = Some(linked_id);
                Ok(())
            }
            _ => Err(EngineError::internal(format!(
                "entry {entry_id} missing or already linked"
            ))),
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn commit(mut self) -> ResultEngine<()> {
        if self.armed(Fault::Commit) {
            return Err(injected("commit"));
        }
        let staged = self
            .staged
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        *self.base = staged.state;
        Ok(())
    }
}

fn ledger_entry(id: i32, entry: NewEntry) -> LedgerEntry {
    LedgerEntry {
        id,
        user_id: entry.user_id,
        account_id: entry.account_id,
        amount: entry.amount,
        kind: entry.kind,
        linked_entry_id: None,
        created_at: entry.created_at,
    }
}
