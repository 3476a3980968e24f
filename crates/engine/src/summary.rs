//! Dashboard statistics over a collection of pours.

use serde::Serialize;

use crate::{Area, Money, Pour, PourRecord, PourTotals, ProfitSign};

/// One labelled dashboard value, already formatted for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryTile {
    pub label: &'static str,
    pub value: String,
}

/// Fleet-wide totals. Built from [`PourTotals`], never from raw fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_pours: usize,
    pub total_area: Area,
    pub total_cost: Money,
    pub total_price: Money,
    pub total_profit: Money,
    /// `total_cost / total_area`, or zero when no area was poured.
    pub avg_cost_per_sqft: Money,
}

impl Summary {
    pub fn collect<'a, I>(pours: I) -> Self
    where
        I: IntoIterator<Item = &'a Pour>,
    {
        let mut summary = pours
            .into_iter()
            .fold(Summary::default(), |mut acc, pour| {
                let totals = PourTotals::of(pour);
                acc.total_pours += 1;
                acc.total_area += pour.area();
                acc.total_cost += totals.total_cost;
                acc.total_price += totals.total_price;
                acc.total_profit += totals.profit;
                acc
            });
        summary.avg_cost_per_sqft = summary.total_cost.per_area(summary.total_area);
        summary
    }

    pub fn of_records(records: &[PourRecord]) -> Self {
        Self::collect(records.iter().map(|record| &record.pour))
    }

    #[must_use]
    pub fn profit_sign(&self) -> ProfitSign {
        ProfitSign::of(self.total_profit)
    }

    /// Label → formatted value, in dashboard order.
    #[must_use]
    pub fn tiles(&self) -> Vec<SummaryTile> {
        vec![
            SummaryTile {
                label: "Total Pours",
                value: self.total_pours.to_string(),
            },
            SummaryTile {
                label: "Total Area (ft²)",
                value: self.total_area.to_string(),
            },
            SummaryTile {
                label: "Total Cost",
                value: self.total_cost.to_string(),
            },
            SummaryTile {
                label: "Total Price",
                value: self.total_price.to_string(),
            },
            SummaryTile {
                label: "Total Profit",
                value: self.total_profit.to_string(),
            },
            SummaryTile {
                label: "Avg Cost/ft²",
                value: self.avg_cost_per_sqft.to_string(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::PourInput;

    fn pour(area: Area, price_per_sqft: i64, labor: i64) -> Pour {
        PourInput {
            pour_id: Some("P".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 1, 2),
            area: Some(area),
            price_per_sqft: Some(Money::new(price_per_sqft)),
            labor_cost: Some(Money::new(labor)),
            equipment_cost: Some(Money::ZERO),
            fuel_cost: Some(Money::ZERO),
            repairs_cost: Some(Money::ZERO),
            misc_cost: Some(Money::ZERO),
            ..PourInput::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn empty_collection_is_all_zero() {
        let summary = Summary::of_records(&[]);
        assert_eq!(summary.total_pours, 0);
        assert_eq!(summary.total_area, Area::ZERO);
        assert_eq!(summary.avg_cost_per_sqft, Money::ZERO);
        assert_eq!(summary.profit_sign(), ProfitSign::Profit);
    }

    #[test]
    fn zero_area_does_not_divide() {
        let pours = [pour(Area::ZERO, 5_00, 100_00)];
        let summary = Summary::collect(&pours);
        assert_eq!(summary.total_cost, Money::new(100_00));
        assert_eq!(summary.avg_cost_per_sqft, Money::ZERO);
    }

    #[test]
    fn sums_per_pour_totals() {
        let pours = [
            pour(Area::from_sqft(100), 5_00, 200_00),
            pour(Area::from_sqft(50), 4_00, 300_00),
        ];
        let summary = Summary::collect(&pours);
        assert_eq!(summary.total_pours, 2);
        assert_eq!(summary.total_area, Area::from_sqft(150));
        assert_eq!(summary.total_cost, Money::new(500_00));
        assert_eq!(summary.total_price, Money::new(700_00));
        assert_eq!(summary.total_profit, Money::new(200_00));
        // 500.00 / 150 = 3.333…
        assert_eq!(summary.avg_cost_per_sqft, Money::new(3_33));

        let from_totals: Money = pours.iter().map(|p| PourTotals::of(p).profit).sum();
        assert_eq!(summary.total_profit, from_totals);
    }

    #[test]
    fn tiles_are_labelled_in_order() {
        let pours = [pour(Area::from_sqft(10), 1_00, 25_00)];
        let tiles = Summary::collect(&pours).tiles();
        let labels: Vec<_> = tiles.iter().map(|t| t.label).collect();
        assert_eq!(
            labels,
            [
                "Total Pours",
                "Total Area (ft²)",
                "Total Cost",
                "Total Price",
                "Total Profit",
                "Avg Cost/ft²"
            ]
        );
        assert_eq!(tiles[4].value, "-$15.00");
        assert_eq!(tiles[5].value, "$2.50");
    }
}
