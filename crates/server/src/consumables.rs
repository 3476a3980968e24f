//! Consumables catalog: entity and API endpoints.

use api_types::consumable::{ConsumableNew, ConsumableView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{CatalogEntry, EngineError, Money};
use sea_orm::{ActiveValue, QueryOrder, entity::prelude::*};

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "consumables")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub seq: i32,
    #[sea_orm(unique)]
    pub id: String,
    pub name: String,
    pub default_price_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for CatalogEntry {
    type Error = ServerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|err| ServerError::Corrupt(format!("consumable id {}: {err}", model.id)))?;
        CatalogEntry::with_id(id, &model.name, Money::new(model.default_price_minor))
            .map_err(|err| ServerError::Corrupt(format!("consumable {id}: {err}")))
    }
}

fn view(entry: CatalogEntry) -> ConsumableView {
    ConsumableView {
        id: entry.id,
        name: entry.name,
        default_price_minor: entry.default_price.cents(),
    }
}

/// List the catalog in creation order.
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ConsumableView>>, ServerError> {
    let rows = Entity::find()
        .order_by_asc(Column::Seq)
        .all(&state.db)
        .await?;

    let entries = rows
        .into_iter()
        .map(|row| CatalogEntry::try_from(row).map(view))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(entries))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ConsumableNew>,
) -> Result<(StatusCode, Json<ConsumableView>), ServerError> {
    let name = payload
        .name
        .ok_or_else(|| EngineError::Validation("name is required".to_string()))?;
    let price = payload
        .default_price_minor
        .ok_or_else(|| EngineError::Validation("default_price is required".to_string()))?;
    let entry = CatalogEntry::new(&name, Money::new(price))?;

    ActiveModel {
        seq: ActiveValue::NotSet,
        id: ActiveValue::Set(entry.id.to_string()),
        name: ActiveValue::Set(entry.name.clone()),
        default_price_minor: ActiveValue::Set(entry.default_price.cents()),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(id = %entry.id, name = %entry.name, "consumable created");
    Ok((StatusCode::CREATED, Json(view(entry))))
}

/// Idempotent: deleting an unknown id is not an error. Pours keep the
/// prices they copied.
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let result = Entity::delete_many()
        .filter(Column::Id.eq(id.to_string()))
        .exec(&state.db)
        .await?;

    tracing::info!(%id, removed = result.rows_affected, "consumable deleted");
    Ok(StatusCode::NO_CONTENT)
}
