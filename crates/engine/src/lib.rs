//! Account-transfer and ledger engine.
//!
//! [`Ledger`] moves money between accounts as one atomic unit of work over
//! the [`Storage`] ports. [`Engine`] binds it to a sea-orm database and adds
//! the account and financial group operations around it.

pub use accounts::{Account, AccountKind, AccountPatch};
pub use commands::{CorrectionCmd, OpenAccountCmd, TransferCmd};
pub use error::EngineError;
pub use groups::{FinancialGroup, GroupRole, GroupSummary, GroupView};
pub use guard::{can_act_on_account, can_act_on_group};
pub use journal::{record_correction, record_pair};
pub use ledger::{Ledger, TransferResult, TransferSide};
pub use memory::{Fault, MemoryStore, MemoryUnit};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, Page};
pub use sea_store::{SeaStore, SeaUnit};
pub use store::{AccountReader, AccountStore, GroupDirectory, LedgerLog, Storage, UnitOfWork};
pub use transactions::{EntryKind, LedgerEntry, NewEntry};

mod accounts;
mod categories;
mod commands;
mod error;
mod group_members;
mod groups;
mod guard;
mod journal;
mod ledger;
mod memory;
mod money;
mod ops;
mod sea_store;
mod store;
mod transactions;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
