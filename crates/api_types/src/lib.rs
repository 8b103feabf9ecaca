//! Request and response bodies of the HTTP API.
//!
//! Money is a [`Decimal`] with two fraction digits. It is written as a JSON
//! string (`"70.00"`) and read from either a string or a number.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account kind as it appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[serde(rename = "self")]
    Own,
    External,
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferRequest {
        pub from: i32,
        pub dest: i32,
        pub amount: Decimal,
        /// Expected kind of the destination account.
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        pub kind: Option<AccountType>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransferSide {
        pub id: i32,
        pub name: String,
        pub balance: Decimal,
        pub change: Decimal,
        #[serde(rename = "type")]
        pub kind: AccountType,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransferResult {
        pub from: TransferSide,
        pub dest: TransferSide,
        pub date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferResponse {
        pub result: TransferResult,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        #[serde(default)]
        pub category_id: Option<i32>,
        #[serde(rename = "type")]
        pub kind: AccountType,
        #[serde(default)]
        pub balance: Option<Decimal>,
    }

    /// Partial update. Absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub category_id: Option<i32>,
        #[serde(rename = "type", default)]
        pub kind: Option<AccountType>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Correction {
        /// Signed change to the balance.
        pub delta: Decimal,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct Account {
        pub id: i32,
        pub name: String,
        pub category_id: Option<i32>,
        #[serde(rename = "type")]
        pub kind: AccountType,
        pub balance: Decimal,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountList {
        pub accounts: Vec<Account>,
        pub page: u64,
        pub size: u64,
        pub total: u64,
        pub remaining_pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Entry {
        pub id: i32,
        pub account_id: i32,
        pub amount: Decimal,
        /// `transfer`, `income` or `expense`.
        #[serde(rename = "type")]
        pub kind: String,
        pub linked_transaction_id: Option<i32>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryList {
        pub transactions: Vec<Entry>,
    }
}

pub mod group {
    use super::*;

    /// Role of a user in a financial group.
    ///
    /// - `owner`: full access and can manage members.
    /// - `member`: read-only.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GroupRole {
        Owner,
        Member,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        #[serde(default)]
        pub image_id: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupAddUser {
        pub user_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupOwner {
        pub user_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Group {
        pub id: i32,
        pub name: String,
        pub owner_id: Uuid,
        pub image_id: Option<i32>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupDetail {
        #[serde(flatten)]
        pub group: Group,
        pub role: GroupRole,
        pub members: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupListItem {
        pub id: i32,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupList {
        pub groups: Vec<GroupListItem>,
        pub page: u64,
        pub size: u64,
        pub total: u64,
        pub remaining_pages: u64,
    }
}

pub mod error {
    use super::*;

    /// Body of every failed request.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
        pub code: String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_request_accepts_string_or_number_amounts() {
        let from_str: transfer::TransferRequest =
            serde_json::from_str(r#"{"from":1,"dest":2,"amount":"30.50"}"#).unwrap();
        let from_num: transfer::TransferRequest =
            serde_json::from_str(r#"{"from":1,"dest":2,"amount":30.5,"type":"external"}"#)
                .unwrap();
        assert_eq!(from_str.amount, Decimal::new(3050, 2));
        assert_eq!(from_num.amount.normalize(), Decimal::new(305, 1));
        assert_eq!(from_str.kind, None);
        assert_eq!(from_num.kind, Some(AccountType::External));
    }

    #[test]
    fn amounts_are_written_as_strings() {
        let side = transfer::TransferSide {
            id: 1,
            name: "Bank".to_string(),
            balance: Decimal::new(7000, 2),
            change: Decimal::new(-3000, 2),
            kind: AccountType::Own,
        };
        let value = serde_json::to_value(&side).unwrap();
        assert_eq!(value["balance"], "70.00");
        assert_eq!(value["change"], "-30.00");
        assert_eq!(value["type"], "self");
    }
}
