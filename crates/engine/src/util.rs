//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
///
/// A malformed id in the database is corruption, not a caller mistake.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::internal(format!("invalid stored {label} id")))
}

/// Trim a required name and reject it when nothing is left.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Current UTC time truncated to whole seconds.
///
/// Both entries of a transfer and its settlement share this value.
pub(crate) fn now_seconds() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Offset/limit for a zero-based page.
pub(crate) fn page_bounds(page: u64, size: u64) -> ResultEngine<(u64, u64)> {
    if size == 0 {
        return Err(EngineError::InvalidInput(
            "page size must be > 0".to_string(),
        ));
    }
    let offset = page
        .checked_mul(size)
        .ok_or_else(|| EngineError::InvalidInput("page out of range".to_string()))?;
    Ok((offset, size))
}
