use api_types::{
    ErrorResponse,
    consumable::{ConsumableNew, ConsumableView},
    pour::{LineItemPayload, LineItemView, PourPayload, PourView},
};
use engine::{
    Area, CatalogEntry, EngineError, LineItemInput, Money, Pour, PourInput, PourRecord, Session,
    Store,
};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug)]
pub enum ClientError {
    Unauthorized,
    Forbidden,
    NotFound(String),
    Validation(String),
    Server(String),
    Transport(reqwest::Error),
}

impl From<ClientError> for EngineError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized | ClientError::Forbidden => EngineError::AuthExpired,
            ClientError::NotFound(body) => EngineError::NotFound(body),
            ClientError::Validation(body) => EngineError::Validation(body),
            ClientError::Server(body) => EngineError::Transport(body),
            ClientError::Transport(err) => EngineError::Transport(err.to_string()),
        }
    }
}

/// [`Store`] backed by the pour server's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|err| AppError::Usage(format!("invalid base_url: {err}")))?;
        // `join` drops the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    async fn send(
        &self,
        request: RequestBuilder,
        session: &Session,
    ) -> std::result::Result<Response, ClientError> {
        let res = request
            .bearer_auth(session.token())
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        tracing::debug!(%status, "request failed: {body}");
        let err = match status.as_u16() {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden,
            404 => ClientError::NotFound(body),
            422 => ClientError::Validation(body),
            _ => ClientError::Server(body),
        };
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        session: &Session,
    ) -> std::result::Result<T, ClientError> {
        self.send(request, session)
            .await?
            .json::<T>()
            .await
            .map_err(ClientError::Transport)
    }
}

impl Store for HttpStore {
    async fn list_consumables(&self, session: &Session) -> engine::ResultEngine<Vec<CatalogEntry>> {
        let url = self.endpoint("consumables")?;
        let views: Vec<ConsumableView> = self.fetch(self.http.get(url), session).await?;
        views.into_iter().map(catalog_entry).collect()
    }

    async fn create_consumable(
        &self,
        session: &Session,
        name: &str,
        default_price: Money,
    ) -> engine::ResultEngine<CatalogEntry> {
        let url = self.endpoint("consumables")?;
        let payload = ConsumableNew {
            name: Some(name.to_string()),
            default_price_minor: Some(default_price.cents()),
        };
        let view = self
            .fetch(self.http.post(url).json(&payload), session)
            .await?;
        catalog_entry(view)
    }

    async fn delete_consumable(&self, session: &Session, id: Uuid) -> engine::ResultEngine<()> {
        let url = self.endpoint(&format!("consumables/{id}"))?;
        self.send(self.http.delete(url), session).await?;
        Ok(())
    }

    async fn list_pours(&self, session: &Session) -> engine::ResultEngine<Vec<PourRecord>> {
        let url = self.endpoint("pours")?;
        let views: Vec<PourView> = self.fetch(self.http.get(url), session).await?;
        views.into_iter().map(pour_record).collect()
    }

    async fn create_pour(&self, session: &Session, pour: &Pour) -> engine::ResultEngine<PourRecord> {
        let url = self.endpoint("pours")?;
        let view = self
            .fetch(self.http.post(url).json(&payload(pour)), session)
            .await?;
        pour_record(view)
    }

    async fn update_pour(
        &self,
        session: &Session,
        id: Uuid,
        pour: &Pour,
    ) -> engine::ResultEngine<PourRecord> {
        let url = self.endpoint(&format!("pours/{id}"))?;
        let view = self
            .fetch(self.http.put(url).json(&payload(pour)), session)
            .await?;
        pour_record(view)
    }

    async fn delete_pour(&self, session: &Session, id: Uuid) -> engine::ResultEngine<()> {
        let url = self.endpoint(&format!("pours/{id}"))?;
        self.send(self.http.delete(url), session).await?;
        Ok(())
    }
}

fn catalog_entry(view: ConsumableView) -> engine::ResultEngine<CatalogEntry> {
    CatalogEntry::with_id(view.id, &view.name, Money::new(view.default_price_minor))
        .map_err(|err| EngineError::Transport(format!("server sent consumable {}: {err}", view.id)))
}

fn line_item(item: LineItemView) -> LineItemInput {
    LineItemInput {
        name: Some(item.name),
        unit_price: Some(Money::new(item.unit_price_minor)),
        quantity: Some(item.quantity),
    }
}

/// Re-validates what the server returned; totals are recomputed locally.
fn pour_record(view: PourView) -> engine::ResultEngine<PourRecord> {
    let id = view.id;
    let pour = PourInput {
        pour_id: Some(view.pour_id),
        date: Some(view.date),
        area: Some(Area::new(view.area_hundredths)),
        price_per_sqft: Some(Money::new(view.price_per_sqft_minor)),
        labor_cost: Some(Money::new(view.labor_cost_minor)),
        equipment_cost: Some(Money::new(view.equipment_cost_minor)),
        fuel_cost: Some(Money::new(view.fuel_cost_minor)),
        repairs_cost: Some(Money::new(view.repairs_cost_minor)),
        misc_cost: Some(Money::new(view.misc_cost_minor)),
        lunch_cost: Some(Money::new(view.lunch_cost_minor)),
        consumable_items: view.consumable_items.into_iter().map(line_item).collect(),
        legacy_consumables_cost: None,
    }
    .validate()
    .map_err(|err| EngineError::Transport(format!("server sent pour {id}: {err}")))?;

    Ok(PourRecord::new(id, pour))
}

fn payload(pour: &Pour) -> PourPayload {
    PourPayload {
        pour_id: Some(pour.pour_id().to_string()),
        date: Some(pour.date()),
        area_hundredths: Some(pour.area().hundredths()),
        price_per_sqft_minor: Some(pour.price_per_sqft().cents()),
        labor_cost_minor: Some(pour.labor_cost().cents()),
        equipment_cost_minor: Some(pour.equipment_cost().cents()),
        fuel_cost_minor: Some(pour.fuel_cost().cents()),
        repairs_cost_minor: Some(pour.repairs_cost().cents()),
        misc_cost_minor: Some(pour.misc_cost().cents()),
        lunch_cost_minor: Some(pour.lunch_cost().cents()),
        consumable_items: pour
            .consumable_items()
            .iter()
            .map(|item| LineItemPayload {
                name: Some(item.name.clone()),
                unit_price_minor: Some(item.unit_price.cents()),
                quantity: Some(item.quantity),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn view() -> PourView {
        PourView {
            id: Uuid::new_v4(),
            pour_id: "P-7".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            area_hundredths: 10_000,
            price_per_sqft_minor: 500,
            labor_cost_minor: 20_000,
            equipment_cost_minor: 5_000,
            fuel_cost_minor: 2_000,
            repairs_cost_minor: 0,
            misc_cost_minor: 1_000,
            lunch_cost_minor: 0,
            consumable_items: vec![LineItemView {
                name: "Rebar".to_string(),
                unit_price_minor: 1_500,
                quantity: 3,
                total_minor: 4_500,
            }],
            consumables_cost_minor: 4_500,
            total_cost_minor: 32_500,
            total_price_minor: 50_000,
            profit_minor: 17_500,
        }
    }

    #[test]
    fn base_url_gains_a_trailing_slash() {
        let store = HttpStore::new("http://127.0.0.1:3000/api").unwrap();
        assert_eq!(
            store.endpoint("pours").unwrap().as_str(),
            "http://127.0.0.1:3000/api/pours"
        );
        assert!(HttpStore::new("not a url").is_err());
    }

    #[test]
    fn pour_view_is_revalidated() {
        let record = pour_record(view()).unwrap();
        assert_eq!(record.totals().profit, Money::new(17_500));

        let mut bad = view();
        bad.pour_id = "  ".to_string();
        assert!(matches!(pour_record(bad), Err(EngineError::Transport(_))));
    }

    #[test]
    fn view_flat_total_does_not_become_an_item() {
        let mut stale = view();
        stale.consumable_items.clear();
        let record = pour_record(stale).unwrap();
        assert!(record.pour.consumable_items().is_empty());
        assert_eq!(record.totals().consumables, Money::ZERO);
    }

    #[test]
    fn payload_carries_items_and_no_flat_total() {
        let record = pour_record(view()).unwrap();
        let body = payload(&record.pour);
        assert_eq!(body.consumable_items.len(), 1);
        assert_eq!(body.consumable_items[0].quantity, Some(3));
        assert_eq!(body.area_hundredths, Some(10_000));
    }

    #[test]
    fn status_errors_map_onto_engine_errors() {
        assert_eq!(
            EngineError::from(ClientError::Forbidden),
            EngineError::AuthExpired
        );
        assert_eq!(
            EngineError::from(ClientError::Validation("area is required".into())),
            EngineError::Validation("area is required".into())
        );
        assert!(matches!(
            EngineError::from(ClientError::Server("boom".into())),
            EngineError::Transport(_)
        ));
    }
}
