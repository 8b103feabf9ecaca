//! Writes ledger entries through a [`LedgerLog`].
//!
//! Every function here runs inside a unit of work. On error the caller drops
//! the unit, so a half-written pair never becomes visible.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EngineError, EntryKind, LedgerLog, MoneyCents, NewEntry, ResultEngine};

/// Record the two entries of a transfer and link them to each other.
///
/// Returns `(from_entry_id, to_entry_id)`. The `from` entry carries the
/// negated amount and is appended first.
pub async fn record_pair<L>(
    log: &L,
    user_id: Uuid,
    from: i32,
    to: i32,
    amount: MoneyCents,
    at: DateTime<Utc>,
) -> ResultEngine<(i32, i32)>
where
    L: LedgerLog + ?Sized,
{
    let debit = amount
        .checked_neg()
        .ok_or_else(|| EngineError::InvalidInput("amount out of range".to_string()))?;

    let first = log
        .append(NewEntry {
            user_id,
            account_id: from,
            amount: debit,
            kind: EntryKind::Transfer,
            created_at: at,
        })
        .await?;
    let second = log
        .append(NewEntry {
            user_id,
            account_id: to,
            amount,
            kind: EntryKind::Transfer,
            created_at: at,
        })
        .await?;

    log.link(first, second).await?;
    log.link(second, first).await?;
    Ok((first, second))
}

/// Record a single unpaired entry for a balance correction.
///
/// Positive deltas are `income`, negative ones `expense`.
pub async fn record_correction<L>(
    log: &L,
    user_id: Uuid,
    account_id: i32,
    delta: MoneyCents,
    at: DateTime<Utc>,
) -> ResultEngine<i32>
where
    L: LedgerLog + ?Sized,
{
    let kind = if delta.is_negative() {
        EntryKind::Expense
    } else {
        EntryKind::Income
    };
    log.append(NewEntry {
        user_id,
        account_id,
        amount: delta,
        kind,
        created_at: at,
    })
    .await
}
