//! Pours: entity, wire conversions and API endpoints.
//!
//! Every write goes through [`PourInput::validate`], so the stored
//! `consumables_cost_minor` is always the sum of the stored line items. Rows
//! are validated again on read, which also migrates legacy rows that only
//! carry a flat consumables total.

use api_types::pour::{LineItemPayload, LineItemView, PourPayload, PourView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Area, EngineError, LineItemInput, Money, Pour, PourInput, PourRecord};
use sea_orm::{ActiveValue, QueryOrder, entity::prelude::*};

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "pours")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub seq: i32,
    #[sea_orm(unique)]
    pub id: String,
    pub pour_id: String,
    pub date: Date,
    pub area_hundredths: i64,
    pub price_per_sqft_minor: i64,
    pub labor_cost_minor: i64,
    pub equipment_cost_minor: i64,
    pub fuel_cost_minor: i64,
    pub repairs_cost_minor: i64,
    pub misc_cost_minor: i64,
    pub lunch_cost_minor: i64,
    /// JSON array of [`LineItemPayload`].
    #[sea_orm(column_type = "Text")]
    pub consumable_items: String,
    pub consumables_cost_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn money(value: Option<i64>) -> Option<Money> {
    value.map(Money::new)
}

fn line_item_input(item: LineItemPayload) -> LineItemInput {
    LineItemInput {
        name: item.name,
        unit_price: money(item.unit_price_minor),
        quantity: item.quantity,
    }
}

/// Request bodies never carry a flat consumables total; only stored rows do.
fn pour_input(payload: PourPayload) -> PourInput {
    PourInput {
        pour_id: payload.pour_id,
        date: payload.date,
        area: payload.area_hundredths.map(Area::new),
        price_per_sqft: money(payload.price_per_sqft_minor),
        labor_cost: money(payload.labor_cost_minor),
        equipment_cost: money(payload.equipment_cost_minor),
        fuel_cost: money(payload.fuel_cost_minor),
        repairs_cost: money(payload.repairs_cost_minor),
        misc_cost: money(payload.misc_cost_minor),
        lunch_cost: money(payload.lunch_cost_minor),
        consumable_items: payload
            .consumable_items
            .into_iter()
            .map(line_item_input)
            .collect(),
        legacy_consumables_cost: None,
    }
}

impl TryFrom<Model> for PourRecord {
    type Error = ServerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|err| ServerError::Corrupt(format!("pour id {}: {err}", model.id)))?;
        let items: Vec<LineItemPayload> = serde_json::from_str(&model.consumable_items)
            .map_err(|err| ServerError::Corrupt(format!("pour {id} items: {err}")))?;

        let pour = PourInput {
            pour_id: Some(model.pour_id),
            date: Some(model.date),
            area: Some(Area::new(model.area_hundredths)),
            price_per_sqft: Some(Money::new(model.price_per_sqft_minor)),
            labor_cost: Some(Money::new(model.labor_cost_minor)),
            equipment_cost: Some(Money::new(model.equipment_cost_minor)),
            fuel_cost: Some(Money::new(model.fuel_cost_minor)),
            repairs_cost: Some(Money::new(model.repairs_cost_minor)),
            misc_cost: Some(Money::new(model.misc_cost_minor)),
            lunch_cost: Some(Money::new(model.lunch_cost_minor)),
            consumable_items: items.into_iter().map(line_item_input).collect(),
            legacy_consumables_cost: Some(Money::new(model.consumables_cost_minor)),
        }
        .validate()
        .map_err(|err| ServerError::Corrupt(format!("pour {id}: {err}")))?;

        Ok(PourRecord::new(id, pour))
    }
}

fn view(record: &PourRecord) -> PourView {
    let pour = &record.pour;
    let totals = record.totals();
    PourView {
        id: record.id,
        pour_id: pour.pour_id().to_string(),
        date: pour.date(),
        area_hundredths: pour.area().hundredths(),
        price_per_sqft_minor: pour.price_per_sqft().cents(),
        labor_cost_minor: pour.labor_cost().cents(),
        equipment_cost_minor: pour.equipment_cost().cents(),
        fuel_cost_minor: pour.fuel_cost().cents(),
        repairs_cost_minor: pour.repairs_cost().cents(),
        misc_cost_minor: pour.misc_cost().cents(),
        lunch_cost_minor: pour.lunch_cost().cents(),
        consumable_items: pour
            .consumable_items()
            .iter()
            .map(|item| LineItemView {
                name: item.name.clone(),
                unit_price_minor: item.unit_price.cents(),
                quantity: item.quantity,
                total_minor: item.total().cents(),
            })
            .collect(),
        consumables_cost_minor: totals.consumables.cents(),
        total_cost_minor: totals.total_cost.cents(),
        total_price_minor: totals.total_price.cents(),
        profit_minor: totals.profit.cents(),
    }
}

fn stored_items(pour: &Pour) -> Result<String, ServerError> {
    let items: Vec<LineItemPayload> = pour
        .consumable_items()
        .iter()
        .map(|item| LineItemPayload {
            name: Some(item.name.clone()),
            unit_price_minor: Some(item.unit_price.cents()),
            quantity: Some(item.quantity),
        })
        .collect();
    serde_json::to_string(&items).map_err(|err| ServerError::Corrupt(err.to_string()))
}

/// Copies every field of `pour` onto `model`; this is the whole-record
/// replacement used by both create and update.
fn write_fields(model: &mut ActiveModel, pour: &Pour) -> Result<(), ServerError> {
    model.pour_id = ActiveValue::Set(pour.pour_id().to_string());
    model.date = ActiveValue::Set(pour.date());
    model.area_hundredths = ActiveValue::Set(pour.area().hundredths());
    model.price_per_sqft_minor = ActiveValue::Set(pour.price_per_sqft().cents());
    model.labor_cost_minor = ActiveValue::Set(pour.labor_cost().cents());
    model.equipment_cost_minor = ActiveValue::Set(pour.equipment_cost().cents());
    model.fuel_cost_minor = ActiveValue::Set(pour.fuel_cost().cents());
    model.repairs_cost_minor = ActiveValue::Set(pour.repairs_cost().cents());
    model.misc_cost_minor = ActiveValue::Set(pour.misc_cost().cents());
    model.lunch_cost_minor = ActiveValue::Set(pour.lunch_cost().cents());
    model.consumable_items = ActiveValue::Set(stored_items(pour)?);
    model.consumables_cost_minor = ActiveValue::Set(pour.consumables_cost().cents());
    model.updated_at = ActiveValue::Set(Utc::now());
    Ok(())
}

/// Every stored pour, newest date first; same-day pours newest first.
pub(crate) async fn load_all(db: &DatabaseConnection) -> Result<Vec<PourRecord>, ServerError> {
    Entity::find()
        .order_by_desc(Column::Date)
        .order_by_desc(Column::Seq)
        .all(db)
        .await?
        .into_iter()
        .map(PourRecord::try_from)
        .collect()
}

async fn find_row(db: &DatabaseConnection, id: Uuid) -> Result<Model, ServerError> {
    Entity::find()
        .filter(Column::Id.eq(id.to_string()))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("pour {id}")).into())
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<PourView>>, ServerError> {
    let records = load_all(&state.db).await?;
    Ok(Json(records.iter().map(view).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PourPayload>,
) -> Result<(StatusCode, Json<PourView>), ServerError> {
    let pour = pour_input(payload).validate()?;
    let id = Uuid::new_v4();
    let now = Utc::now();

    let mut model = ActiveModel::new();
    model.id = ActiveValue::Set(id.to_string());
    model.created_at = ActiveValue::Set(now);
    write_fields(&mut model, &pour)?;
    model.insert(&state.db).await?;

    tracing::info!(%id, pour_id = pour.pour_id(), "pour created");
    let record = PourRecord::new(id, pour);
    Ok((StatusCode::CREATED, Json(view(&record))))
}

/// Whole-record replacement. Last write wins.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PourPayload>,
) -> Result<Json<PourView>, ServerError> {
    let pour = pour_input(payload).validate()?;
    let row = find_row(&state.db, id).await?;

    let mut model: ActiveModel = row.into();
    write_fields(&mut model, &pour)?;
    model.update(&state.db).await?;

    tracing::info!(%id, pour_id = pour.pour_id(), "pour updated");
    Ok(Json(view(&PourRecord::new(id, pour))))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let result = Entity::delete_many()
        .filter(Column::Id.eq(id.to_string()))
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::NotFound(format!("pour {id}")).into());
    }

    tracing::info!(%id, "pour deleted");
    Ok(StatusCode::NO_CONTENT)
}
