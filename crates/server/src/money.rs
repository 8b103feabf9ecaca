//! Conversions between wire values and engine values.

use api_types::AccountType;
use engine::{AccountKind, MoneyCents};
use rust_decimal::Decimal;

use crate::ServerError;

/// Request amount to minor units; more than two decimals is `invalid_input`.
pub(crate) fn to_cents(value: Decimal) -> Result<MoneyCents, ServerError> {
    Ok(MoneyCents::try_from(value)?)
}

pub(crate) fn to_decimal(value: MoneyCents) -> Decimal {
    Decimal::from(value)
}

pub(crate) fn to_api_kind(kind: AccountKind) -> AccountType {
    match kind {
        AccountKind::Own => AccountType::Own,
        AccountKind::External => AccountType::External,
    }
}

pub(crate) fn to_engine_kind(kind: AccountType) -> AccountKind {
    match kind {
        AccountType::Own => AccountKind::Own,
        AccountType::External => AccountKind::External,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn trailing_zeros_do_not_count_as_decimals() {
        assert_eq!(to_cents(Decimal::new(30_500, 3)).unwrap().cents(), 3050);
    }

    #[test]
    fn extra_precision_is_a_bad_request() {
        let res = to_cents(Decimal::new(30_505, 3)).unwrap_err().into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn kinds_map_both_ways() {
        for kind in [AccountKind::Own, AccountKind::External] {
            assert_eq!(to_engine_kind(to_api_kind(kind)), kind);
        }
    }
}
