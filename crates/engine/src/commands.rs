//! Command structs for engine operations.
//!
//! These types group parameters for write operations (transfer, correction,
//! account creation), keeping call sites readable and avoiding long argument
//! lists.

use uuid::Uuid;

use crate::{AccountKind, MoneyCents};

/// Move `amount` from one account to another of the same user.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub user_id: Uuid,
    pub from: i32,
    pub dest: i32,
    pub amount: MoneyCents,
    /// Kind the destination account is expected to have.
    pub dest_kind: Option<AccountKind>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(user_id: Uuid, from: i32, dest: i32, amount: MoneyCents) -> Self {
        Self {
            user_id,
            from,
            dest,
            amount,
            dest_kind: None,
        }
    }

    #[must_use]
    pub fn dest_kind(mut self, kind: AccountKind) -> Self {
        self.dest_kind = Some(kind);
        self
    }
}

/// Adjust one balance by a signed delta, leaving an income or expense entry.
#[derive(Clone, Debug)]
pub struct CorrectionCmd {
    pub user_id: Uuid,
    pub account_id: i32,
    pub delta: MoneyCents,
}

impl CorrectionCmd {
    #[must_use]
    pub fn new(user_id: Uuid, account_id: i32, delta: MoneyCents) -> Self {
        Self {
            user_id,
            account_id,
            delta,
        }
    }
}

/// Open a new account.
#[derive(Clone, Debug)]
pub struct OpenAccountCmd {
    pub user_id: Uuid,
    pub name: String,
    pub category_id: Option<i32>,
    pub kind: AccountKind,
    pub balance: MoneyCents,
}

impl OpenAccountCmd {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            category_id: None,
            kind: AccountKind::Own,
            balance: MoneyCents::ZERO,
        }
    }

    #[must_use]
    pub fn category_id(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: AccountKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn balance(mut self, balance: MoneyCents) -> Self {
        self.balance = balance;
        self
    }
}
