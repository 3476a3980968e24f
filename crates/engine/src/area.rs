use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, Money,
    money::{div_round, group_thousands, parse_hundredths, saturate},
};

/// Largest poured area accepted on input: ten million square feet.
pub const MAX_AREA: Area = Area(1_000_000_000);

/// Poured surface in **hundredths of a square foot**.
///
/// Area is the only non-money quantity that takes part in price arithmetic, so
/// it gets the same fixed-point treatment as [`Money`].
///
/// ```rust
/// use engine::{Area, Money};
///
/// let area: Area = "100".parse().unwrap();
/// assert_eq!(area.price_at(Money::new(5_00)), Money::new(500_00));
/// assert_eq!(area.to_string(), "100.00");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Area(i64);

impl Area {
    pub const ZERO: Area = Area(0);

    #[must_use]
    pub const fn new(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Whole square feet.
    #[must_use]
    pub const fn from_sqft(sqft: i64) -> Self {
        Self(sqft * 100)
    }

    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Revenue for this area at a unit price, rounded half away from zero to
    /// the cent.
    #[must_use]
    pub fn price_at(self, per_sqft: Money) -> Money {
        let cents = div_round(i128::from(self.0) * i128::from(per_sqft.cents()), 100);
        Money::new(saturate(cents))
    }

    /// `1234.50`, for CSV.
    #[must_use]
    pub fn to_plain_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", group_thousands(abs / 100), abs % 100)
    }
}

impl Add for Area {
    type Output = Area;

    fn add(self, rhs: Area) -> Self::Output {
        Area(self.0 + rhs.0)
    }
}

impl AddAssign for Area {
    fn add_assign(&mut self, rhs: Area) {
        self.0 += rhs.0;
    }
}

impl Sum for Area {
    fn sum<I: Iterator<Item = Area>>(iter: I) -> Self {
        iter.fold(Area::ZERO, Add::add)
    }
}

impl FromStr for Area {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(EngineError::Validation("area must be >= 0".to_string()));
        }
        parse_hundredths(trimmed)
            .map(Area)
            .map_err(|reason| EngineError::Validation(format!("{reason}: {trimmed:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_rounds_to_the_cent() {
        // 12.34 ft² at $1.15 = $14.191
        assert_eq!(Area::new(1234).price_at(Money::new(115)), Money::new(1419));
        // 0.50 ft² at $0.01 = $0.005, rounded up
        assert_eq!(Area::new(50).price_at(Money::new(1)), Money::new(1));
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("1234.5".parse::<Area>().unwrap(), Area::new(123_450));
        assert_eq!(Area::new(123_450).to_string(), "1,234.50");
        assert!("-3".parse::<Area>().is_err());
        assert!("abc".parse::<Area>().is_err());
    }
}
