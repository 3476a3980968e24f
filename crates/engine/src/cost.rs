//! Cost aggregator: pure functions from one pour to its totals.
//!
//! Every display surface (pours table, summary tiles, receipt) reads these
//! numbers through [`PourTotals`] so the three can never disagree.

use serde::Serialize;

use crate::{ConsumableLineItem, Money, Pour};

/// `unit_price × quantity`.
#[must_use]
pub fn line_item_total(item: &ConsumableLineItem) -> Money {
    item.unit_price.times(item.quantity)
}

/// Σ [`line_item_total`] over the items.
#[must_use]
pub fn consumables_cost(items: &[ConsumableLineItem]) -> Money {
    items.iter().map(line_item_total).sum()
}

/// Labor + equipment + fuel + repairs + consumables + lunch + misc.
#[must_use]
pub fn total_cost(pour: &Pour) -> Money {
    pour.labor_cost()
        + pour.equipment_cost()
        + pour.fuel_cost()
        + pour.repairs_cost()
        + pour.consumables_cost()
        + pour.lunch_cost()
        + pour.misc_cost()
}

/// Area × price per square foot.
#[must_use]
pub fn total_price(pour: &Pour) -> Money {
    pour.area().price_at(pour.price_per_sqft())
}

/// Total price minus total cost. Negative values are valid (a loss).
#[must_use]
pub fn profit(pour: &Pour) -> Money {
    total_price(pour) - total_cost(pour)
}

/// Whether an amount is shown as a profit or a loss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitSign {
    Profit,
    Loss,
}

impl ProfitSign {
    /// Zero counts as profit.
    #[must_use]
    pub fn of(amount: Money) -> Self {
        if amount.is_negative() {
            Self::Loss
        } else {
            Self::Profit
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profit => "profit",
            Self::Loss => "loss",
        }
    }
}

/// The computed numbers for one pour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PourTotals {
    pub consumables: Money,
    pub total_cost: Money,
    pub total_price: Money,
    pub profit: Money,
}

impl PourTotals {
    #[must_use]
    pub fn of(pour: &Pour) -> Self {
        let total_cost = total_cost(pour);
        let total_price = total_price(pour);
        Self {
            consumables: pour.consumables_cost(),
            total_cost,
            total_price,
            profit: total_price - total_cost,
        }
    }

    #[must_use]
    pub fn sign(&self) -> ProfitSign {
        ProfitSign::of(self.profit)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{Area, LineItemInput, PourInput};

    fn pour(area_sqft: i64, price_per_sqft: i64, costs: [i64; 6], items: &[(i64, u32)]) -> Pour {
        let [labor, equipment, fuel, repairs, misc, lunch] = costs;
        PourInput {
            pour_id: Some("P".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 6, 1),
            area: Some(Area::from_sqft(area_sqft)),
            price_per_sqft: Some(Money::new(price_per_sqft)),
            labor_cost: Some(Money::new(labor)),
            equipment_cost: Some(Money::new(equipment)),
            fuel_cost: Some(Money::new(fuel)),
            repairs_cost: Some(Money::new(repairs)),
            misc_cost: Some(Money::new(misc)),
            lunch_cost: Some(Money::new(lunch)),
            consumable_items: items
                .iter()
                .map(|&(price, quantity)| LineItemInput {
                    name: Some("Item".to_string()),
                    unit_price: Some(Money::new(price)),
                    quantity: Some(quantity),
                })
                .collect(),
            legacy_consumables_cost: None,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn worked_example() {
        let p = pour(100, 5_00, [200_00, 50_00, 20_00, 0, 10_00, 0], &[(15_00, 3)]);
        let totals = PourTotals::of(&p);
        assert_eq!(totals.consumables, Money::new(45_00));
        assert_eq!(totals.total_cost, Money::new(325_00));
        assert_eq!(totals.total_price, Money::new(500_00));
        assert_eq!(totals.profit, Money::new(175_00));
        assert_eq!(totals.sign(), ProfitSign::Profit);
    }

    #[test]
    fn total_cost_is_the_sum_of_its_parts() {
        let p = pour(10, 1_00, [1_01, 2_02, 3_03, 4_04, 5_05, 6_06], &[(7_07, 1)]);
        assert_eq!(
            total_cost(&p),
            Money::new(1_01 + 2_02 + 3_03 + 4_04 + 5_05 + 6_06 + 7_07)
        );
    }

    #[test]
    fn lunch_counts_toward_cost() {
        let without = pour(10, 10_00, [0, 0, 0, 0, 0, 0], &[]);
        let with = pour(10, 10_00, [0, 0, 0, 0, 0, 12_50], &[]);
        assert_eq!(total_cost(&with) - total_cost(&without), Money::new(12_50));
    }

    #[test]
    fn loss_is_a_negative_profit() {
        let p = pour(10, 1_00, [50_00, 0, 0, 0, 0, 0], &[]);
        assert_eq!(profit(&p), Money::new(-40_00));
        assert_eq!(PourTotals::of(&p).sign(), ProfitSign::Loss);
    }

    #[test]
    fn break_even_is_profit() {
        let p = pour(10, 1_00, [10_00, 0, 0, 0, 0, 0], &[]);
        assert_eq!(profit(&p), Money::ZERO);
        assert_eq!(PourTotals::of(&p).sign(), ProfitSign::Profit);
    }

    #[test]
    fn sign_matches_price_vs_cost() {
        for labor in [0, 9_99, 10_00, 10_01, 500_00] {
            let p = pour(10, 1_00, [labor, 0, 0, 0, 0, 0], &[]);
            let totals = PourTotals::of(&p);
            assert_eq!(totals.profit, totals.total_price - totals.total_cost);
            assert_eq!(
                totals.sign() == ProfitSign::Profit,
                totals.total_price >= totals.total_cost
            );
        }
    }

    #[test]
    fn consumables_cost_matches_line_items() {
        let p = pour(1, 0, [0; 6], &[(2_50, 4), (99, 3), (100_00, 1)]);
        assert_eq!(consumables_cost(p.consumable_items()), Money::new(112_97));
        assert_eq!(p.consumables_cost(), consumables_cost(p.consumable_items()));
    }
}
