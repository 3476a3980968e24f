//! Wire types shared by the pour server and its clients.
//!
//! Money travels as integer cents (`*_minor`) and area as hundredths of a
//! square foot. Request bodies keep their fields optional so that a missing
//! value reaches validation and comes back as a named error instead of a
//! deserialization failure.

use serde::{Deserialize, Serialize};

pub mod consumable {
    use super::*;
    use uuid::Uuid;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ConsumableNew {
        pub name: Option<String>,
        pub default_price_minor: Option<i64>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ConsumableView {
        pub id: Uuid,
        pub name: String,
        pub default_price_minor: i64,
    }
}

pub mod pour {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct LineItemPayload {
        pub name: Option<String>,
        pub unit_price_minor: Option<i64>,
        /// Defaults to 1.
        pub quantity: Option<u32>,
    }

    /// Request body for creating or replacing a pour.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct PourPayload {
        pub pour_id: Option<String>,
        /// `YYYY-MM-DD`.
        pub date: Option<NaiveDate>,
        pub area_hundredths: Option<i64>,
        pub price_per_sqft_minor: Option<i64>,
        pub labor_cost_minor: Option<i64>,
        pub equipment_cost_minor: Option<i64>,
        pub fuel_cost_minor: Option<i64>,
        pub repairs_cost_minor: Option<i64>,
        pub misc_cost_minor: Option<i64>,
        /// Legacy; absent means zero.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub lunch_cost_minor: Option<i64>,
        /// The full item list. A `consumables_cost_minor` sent alongside is
        /// ignored; the server derives it from these items.
        #[serde(default)]
        pub consumable_items: Vec<LineItemPayload>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LineItemView {
        pub name: String,
        pub unit_price_minor: i64,
        pub quantity: u32,
        pub total_minor: i64,
    }

    /// A stored pour with its computed totals.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PourView {
        pub id: Uuid,
        pub pour_id: String,
        pub date: NaiveDate,
        pub area_hundredths: i64,
        pub price_per_sqft_minor: i64,
        pub labor_cost_minor: i64,
        pub equipment_cost_minor: i64,
        pub fuel_cost_minor: i64,
        pub repairs_cost_minor: i64,
        pub misc_cost_minor: i64,
        pub lunch_cost_minor: i64,
        pub consumable_items: Vec<LineItemView>,
        pub consumables_cost_minor: i64,
        pub total_cost_minor: i64,
        pub total_price_minor: i64,
        pub profit_minor: i64,
    }
}

pub mod stats {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ProfitSign {
        Profit,
        Loss,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Tile {
        pub label: String,
        pub value: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SummaryView {
        pub total_pours: u64,
        pub total_area_hundredths: i64,
        pub total_cost_minor: i64,
        pub total_price_minor: i64,
        pub total_profit_minor: i64,
        pub avg_cost_per_sqft_minor: i64,
        pub profit_sign: ProfitSign,
        /// Display-ready values, in dashboard order.
        pub tiles: Vec<Tile>,
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
