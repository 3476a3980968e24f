//! Dashboard summary endpoint.

use api_types::stats::{ProfitSign, SummaryView, Tile};
use axum::{Json, extract::State};
use engine::Summary;

use crate::{ServerError, pours, server::ServerState};

/// Summary over every stored pour, computed by the same aggregator the
/// clients use.
pub async fn get_summary(State(state): State<ServerState>) -> Result<Json<SummaryView>, ServerError> {
    let records = pours::load_all(&state.db).await?;
    let summary = Summary::of_records(&records);

    Ok(Json(SummaryView {
        total_pours: summary.total_pours as u64,
        total_area_hundredths: summary.total_area.hundredths(),
        total_cost_minor: summary.total_cost.cents(),
        total_price_minor: summary.total_price.cents(),
        total_profit_minor: summary.total_profit.cents(),
        avg_cost_per_sqft_minor: summary.avg_cost_per_sqft.cents(),
        profit_sign: match summary.profit_sign() {
            engine::ProfitSign::Profit => ProfitSign::Profit,
            engine::ProfitSign::Loss => ProfitSign::Loss,
        },
        tiles: summary
            .tiles()
            .into_iter()
            .map(|tile| Tile {
                label: tile.label.to_string(),
                value: tile.value,
            })
            .collect(),
    }))
}
