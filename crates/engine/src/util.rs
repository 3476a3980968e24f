//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize the
//! field checks so the catalog and pour inputs enforce the same invariants and
//! report the same messages.

use crate::{Area, EngineError, Money, ResultEngine, area::MAX_AREA, money::MAX_AMOUNT};

/// Largest quantity accepted on a single consumable line.
pub const MAX_QUANTITY: u32 = 100_000;

/// Unwrap a required field, naming it when absent.
pub(crate) fn require<T>(field: &str, value: Option<T>) -> ResultEngine<T> {
    value.ok_or_else(|| EngineError::Validation(format!("{field} is required")))
}

/// Trimmed, non-empty identifying text.
pub(crate) fn check_label(field: &str, value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Money input in `0..=MAX_AMOUNT`.
pub(crate) fn check_amount(field: &str, amount: Money) -> ResultEngine<Money> {
    if amount.is_negative() {
        return Err(EngineError::Validation(format!("{field} must be >= 0")));
    }
    if amount > MAX_AMOUNT {
        return Err(EngineError::Validation(format!(
            "{field} must be <= {MAX_AMOUNT}"
        )));
    }
    Ok(amount)
}

pub(crate) fn check_area(area: Area) -> ResultEngine<Area> {
    if area.is_negative() {
        return Err(EngineError::Validation("area must be >= 0".to_string()));
    }
    if area > MAX_AREA {
        return Err(EngineError::Validation(format!(
            "area must be <= {MAX_AREA} ft²"
        )));
    }
    Ok(area)
}

pub(crate) fn check_quantity(field: &str, quantity: u32) -> ResultEngine<u32> {
    if quantity == 0 {
        return Err(EngineError::Validation(format!("{field} must be >= 1")));
    }
    if quantity > MAX_QUANTITY {
        return Err(EngineError::Validation(format!(
            "{field} must be <= {MAX_QUANTITY}"
        )));
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_is_named() {
        let err = require::<Money>("labor_cost", None).unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("labor_cost is required".to_string())
        );
    }

    #[test]
    fn amounts_must_be_in_range() {
        assert!(check_amount("fuel_cost", Money::new(-1)).is_err());
        assert!(check_amount("fuel_cost", Money::ZERO).is_ok());
        assert!(check_amount("fuel_cost", MAX_AMOUNT + Money::new(1)).is_err());
    }

    #[test]
    fn labels_are_trimmed() {
        assert_eq!(check_label("name", "  Rebar ").unwrap(), "Rebar");
        assert!(check_label("name", "   ").is_err());
    }
}
