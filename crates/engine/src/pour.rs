//! Pour records: the validated field set, the unvalidated input that feeds it
//! and the stored record.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Area, ConsumableLineItem, EngineError, Money, PourTotals, ResultEngine, cost,
    money::MAX_AMOUNT,
    util::{check_amount, check_area, check_label, require},
};

/// Name of the synthetic line item that carries a legacy flat consumables
/// total.
pub const LEGACY_CONSUMABLES_NAME: &str = "Consumables";

/// Unvalidated consumable line, as typed into a form or read from the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineItemInput {
    pub name: Option<String>,
    pub unit_price: Option<Money>,
    /// Defaults to 1 when absent.
    pub quantity: Option<u32>,
}

impl From<ConsumableLineItem> for LineItemInput {
    fn from(item: ConsumableLineItem) -> Self {
        Self {
            name: Some(item.name),
            unit_price: Some(item.unit_price),
            quantity: Some(item.quantity),
        }
    }
}

/// Form-shaped pour input. Every field is optional so that a missing value
/// reaches [`PourInput::validate`] and is reported by name instead of
/// silently becoming zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PourInput {
    pub pour_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub area: Option<Area>,
    pub price_per_sqft: Option<Money>,
    pub labor_cost: Option<Money>,
    pub equipment_cost: Option<Money>,
    pub fuel_cost: Option<Money>,
    pub repairs_cost: Option<Money>,
    pub misc_cost: Option<Money>,
    /// Legacy field; absent means zero.
    pub lunch_cost: Option<Money>,
    pub consumable_items: Vec<LineItemInput>,
    /// Flat consumables total from records that predate itemized
    /// consumables. Ignored whenever `consumable_items` is non-empty.
    pub legacy_consumables_cost: Option<Money>,
}

impl PourInput {
    /// Checks every field and builds a [`Pour`], recomputing
    /// `consumables_cost` from the line items.
    pub fn validate(self) -> ResultEngine<Pour> {
        let pour_id = check_label("pour_id", &require("pour_id", self.pour_id)?)?;
        let date = require("date", self.date)?;
        let area = check_area(require("area", self.area)?)?;
        let price_per_sqft = amount("price_per_sqft", self.price_per_sqft)?;
        let labor_cost = amount("labor_cost", self.labor_cost)?;
        let equipment_cost = amount("equipment_cost", self.equipment_cost)?;
        let fuel_cost = amount("fuel_cost", self.fuel_cost)?;
        let repairs_cost = amount("repairs_cost", self.repairs_cost)?;
        let misc_cost = amount("misc_cost", self.misc_cost)?;
        let lunch_cost = check_amount("lunch_cost", self.lunch_cost.unwrap_or_default())?;

        let mut items = self
            .consumable_items
            .into_iter()
            .enumerate()
            .map(|(index, item)| validate_item(index, item))
            .collect::<ResultEngine<Vec<_>>>()?;

        if items.is_empty()
            && let Some(flat) = self.legacy_consumables_cost
        {
            let flat = check_amount("consumables_cost", flat)?;
            if !flat.is_zero() {
                items.push(ConsumableLineItem::new(LEGACY_CONSUMABLES_NAME, flat, 1)?);
            }
        }

        let pour = Pour {
            pour_id,
            date,
            area,
            price_per_sqft,
            labor_cost,
            equipment_cost,
            fuel_cost,
            repairs_cost,
            misc_cost,
            lunch_cost,
            consumables_cost: Money::ZERO,
            consumable_items: Vec::new(),
        };
        let pour = pour.with_consumable_items(items)?;

        if cost::total_price(&pour) > MAX_AMOUNT {
            return Err(EngineError::Validation(format!(
                "total price must be <= {MAX_AMOUNT}"
            )));
        }
        Ok(pour)
    }
}

impl From<&Pour> for PourInput {
    /// Prefills an edit form from an existing pour.
    fn from(pour: &Pour) -> Self {
        Self {
            pour_id: Some(pour.pour_id.clone()),
            date: Some(pour.date),
            area: Some(pour.area),
            price_per_sqft: Some(pour.price_per_sqft),
            labor_cost: Some(pour.labor_cost),
            equipment_cost: Some(pour.equipment_cost),
            fuel_cost: Some(pour.fuel_cost),
            repairs_cost: Some(pour.repairs_cost),
            misc_cost: Some(pour.misc_cost),
            lunch_cost: Some(pour.lunch_cost),
            consumable_items: pour
                .consumable_items
                .iter()
                .cloned()
                .map(LineItemInput::from)
                .collect(),
            legacy_consumables_cost: None,
        }
    }
}

fn amount(field: &str, value: Option<Money>) -> ResultEngine<Money> {
    check_amount(field, require(field, value)?)
}

fn validate_item(index: usize, item: LineItemInput) -> ResultEngine<ConsumableLineItem> {
    let name = require(&format!("consumable_items[{index}].name"), item.name)?;
    let unit_price = require(
        &format!("consumable_items[{index}].unit_price"),
        item.unit_price,
    )?;
    ConsumableLineItem::new(&name, unit_price, item.quantity.unwrap_or(1))
        .map_err(|err| match err {
            EngineError::Validation(msg) => {
                EngineError::Validation(format!("consumable_items[{index}]: {msg}"))
            }
            other => other,
        })
}

/// A validated pour.
///
/// Fields are read-only: the only way to change a pour is to build a new one
/// (whole-record replacement), which keeps `consumables_cost` equal to the
/// sum of the line items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Pour {
    pour_id: String,
    date: NaiveDate,
    area: Area,
    price_per_sqft: Money,
    labor_cost: Money,
    equipment_cost: Money,
    fuel_cost: Money,
    repairs_cost: Money,
    misc_cost: Money,
    lunch_cost: Money,
    consumable_items: Vec<ConsumableLineItem>,
    consumables_cost: Money,
}

impl Pour {
    /// Replaces the consumable list and recomputes `consumables_cost`.
    pub fn with_consumable_items(mut self, items: Vec<ConsumableLineItem>) -> ResultEngine<Self> {
        let total = items.iter().try_fold(Money::ZERO, |acc, item| {
            acc.checked_add(cost::line_item_total(item))
        });
        let total = match total {
            Some(total) if total <= MAX_AMOUNT => total,
            _ => {
                return Err(EngineError::Validation(format!(
                    "consumables total must be <= {MAX_AMOUNT}"
                )));
            }
        };
        self.consumable_items = items;
        self.consumables_cost = total;
        Ok(self)
    }

    pub fn pour_id(&self) -> &str {
        &self.pour_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn price_per_sqft(&self) -> Money {
        self.price_per_sqft
    }

    pub fn labor_cost(&self) -> Money {
        self.labor_cost
    }

    pub fn equipment_cost(&self) -> Money {
        self.equipment_cost
    }

    pub fn fuel_cost(&self) -> Money {
        self.fuel_cost
    }

    pub fn repairs_cost(&self) -> Money {
        self.repairs_cost
    }

    pub fn misc_cost(&self) -> Money {
        self.misc_cost
    }

    pub fn lunch_cost(&self) -> Money {
        self.lunch_cost
    }

    pub fn consumable_items(&self) -> &[ConsumableLineItem] {
        &self.consumable_items
    }

    /// Σ `unit_price × quantity` over [`consumable_items`](Self::consumable_items).
    pub fn consumables_cost(&self) -> Money {
        self.consumables_cost
    }
}

/// A pour as held by the store, with its store-assigned id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PourRecord {
    pub id: Uuid,
    pub pour: Pour,
}

impl PourRecord {
    #[must_use]
    pub fn new(id: Uuid, pour: Pour) -> Self {
        Self { id, pour }
    }

    #[must_use]
    pub fn totals(&self) -> PourTotals {
        PourTotals::of(&self.pour)
    }
}
