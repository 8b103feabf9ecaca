use std::{
    fmt,
    ops::{Add, Neg},
    str::FromStr,
};

use rust_decimal::Decimal;

use crate::EngineError;

/// Fraction digits of every amount the ledger stores.
const SCALE: u32 = 2;

/// Signed amount in minor units (cents).
///
/// Balances, deltas and ledger entries are all `MoneyCents`, so the two
/// entries of a transfer pair sum to exactly zero. Decimals only exist at the
/// edges: [`TryFrom<Decimal>`] is the single way in and rejects anything finer
/// than a cent, and `Decimal::from` is the way out.
///
/// ```rust
/// use engine::MoneyCents;
/// use rust_decimal::Decimal;
///
/// let amount = MoneyCents::try_from(Decimal::new(30_500, 3)).unwrap();
/// assert_eq!(amount.cents(), 3050);
/// assert_eq!(Decimal::from(amount).to_string(), "30.50");
/// assert!(MoneyCents::try_from(Decimal::new(30_505, 3)).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `None` when the sum leaves the `i64` range.
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// `None` for `i64::MIN`, which has no positive counterpart.
    #[must_use]
    pub fn checked_neg(self) -> Option<MoneyCents> {
        self.0.checked_neg().map(MoneyCents)
    }
}

impl TryFrom<Decimal> for MoneyCents {
    type Error = EngineError;

    /// Trailing zeros are ignored: `30.500` is accepted, `30.505` is not.
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let mut value = value.normalize();
        if value.scale() > SCALE {
            return Err(EngineError::InvalidInput(format!(
                "amount {value} has more than {SCALE} decimals"
            )));
        }
        value.rescale(SCALE);
        let too_large = || EngineError::InvalidInput("amount too large".to_string());
        if value.scale() != SCALE {
            return Err(too_large());
        }
        i64::try_from(value.mantissa())
            .map(MoneyCents)
            .map_err(|_| too_large())
    }
}

impl From<MoneyCents> for Decimal {
    fn from(value: MoneyCents) -> Self {
        Decimal::new(value.0, SCALE)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Decimal::from(*self), f)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Reads operator input such as `10`, `10.5` or `10,50`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().replace(',', ".");
        let value = Decimal::from_str(&input)
            .map_err(|_| EngineError::InvalidInput(format!("invalid amount: {s:?}")))?;
        Self::try_from(value)
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}
