//! Client-side state over a [`Store`].
//!
//! The ledger holds the catalog and the pour list as last reported by the
//! store. Every mutation is a single request/response: validation happens
//! before the store is called and local state changes only after the store
//! succeeds, so a failure never leaves partial state behind.
//!
//! List fetches are ticketed. A response is applied only when its ticket is
//! newer than the last applied one, and every successful mutation advances
//! the sequence, so a fetch that was in flight across a mutation cannot
//! overwrite it.

use std::{fmt, future::Future};

use uuid::Uuid;

use crate::{
    BrandMark, Catalog, CatalogEntry, ConsumableLineItem, EngineError, Money, Pour, PourInput,
    PourRecord, PourTotals, Receipt, RenderOptions, ResultEngine, Summary,
};

/// Bearer credential for one authenticated user. Passed into every store
/// call; the ledger never keeps it.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Persistence collaborator.
///
/// Implementations map their failures onto [`EngineError`]: an expired or
/// rejected credential is [`EngineError::AuthExpired`], an unknown id is
/// [`EngineError::NotFound`], anything else on the way is
/// [`EngineError::Transport`].
pub trait Store {
    fn list_consumables(
        &self,
        session: &Session,
    ) -> impl Future<Output = ResultEngine<Vec<CatalogEntry>>> + Send;

    fn create_consumable(
        &self,
        session: &Session,
        name: &str,
        default_price: Money,
    ) -> impl Future<Output = ResultEngine<CatalogEntry>> + Send;

    fn delete_consumable(
        &self,
        session: &Session,
        id: Uuid,
    ) -> impl Future<Output = ResultEngine<()>> + Send;

    fn list_pours(
        &self,
        session: &Session,
    ) -> impl Future<Output = ResultEngine<Vec<PourRecord>>> + Send;

    fn create_pour(
        &self,
        session: &Session,
        pour: &Pour,
    ) -> impl Future<Output = ResultEngine<PourRecord>> + Send;

    /// Replaces every field of the stored pour. Concurrent editors are not
    /// detected: the last write wins.
    fn update_pour(
        &self,
        session: &Session,
        id: Uuid,
        pour: &Pour,
    ) -> impl Future<Output = ResultEngine<PourRecord>> + Send;

    fn delete_pour(
        &self,
        session: &Session,
        id: Uuid,
    ) -> impl Future<Output = ResultEngine<()>> + Send;
}

/// Position of a fetch in its collection's sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Clone, Copy, Debug, Default)]
struct Sequence {
    issued: u64,
    applied: u64,
}

impl Sequence {
    fn issue(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    fn accept(&mut self, ticket: FetchTicket) -> bool {
        if ticket.0 > self.applied {
            self.applied = ticket.0;
            true
        } else {
            false
        }
    }

    fn is_stale(&self, ticket: FetchTicket) -> bool {
        ticket.0 <= self.applied
    }

    fn advance(&mut self) {
        self.issued += 1;
        self.applied = self.issued;
    }
}

#[derive(Debug, Default)]
pub struct Ledger {
    catalog: Catalog,
    pours: Vec<PourRecord>,
    catalog_seq: Sequence,
    pours_seq: Sequence,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Pours in store order; local creations are prepended.
    pub fn pours(&self) -> &[PourRecord] {
        &self.pours
    }

    pub fn pour(&self, id: Uuid) -> Option<&PourRecord> {
        self.pours.iter().find(|record| record.id == id)
    }

    /// First pour whose label matches `pour_id` exactly.
    pub fn find_by_label(&self, pour_id: &str) -> Option<&PourRecord> {
        self.pours
            .iter()
            .find(|record| record.pour.pour_id() == pour_id)
    }

    /// Fetches catalog and pours. Both results are applied independently;
    /// the first error is returned.
    pub async fn refresh<S: Store>(&mut self, store: &S, session: &Session) -> ResultEngine<()> {
        let catalog_ticket = self.begin_catalog_fetch();
        let pours_ticket = self.begin_pours_fetch();

        let catalog = store.list_consumables(session).await;
        let pours = store.list_pours(session).await;

        let catalog = self.apply_catalog(catalog_ticket, catalog);
        let pours = self.apply_pours(pours_ticket, pours);
        catalog?;
        pours?;
        Ok(())
    }

    pub fn begin_catalog_fetch(&mut self) -> FetchTicket {
        self.catalog_seq.issue()
    }

    pub fn begin_pours_fetch(&mut self) -> FetchTicket {
        self.pours_seq.issue()
    }

    /// Applies a catalog fetch. `Ok(false)` means the response was stale and
    /// dropped, error or not.
    pub fn apply_catalog(
        &mut self,
        ticket: FetchTicket,
        result: ResultEngine<Vec<CatalogEntry>>,
    ) -> ResultEngine<bool> {
        if self.catalog_seq.is_stale(ticket) {
            tracing::debug!(?ticket, ok = result.is_ok(), "dropping stale catalog response");
            return Ok(false);
        }
        let entries = result?;
        self.catalog_seq.accept(ticket);
        self.catalog = Catalog::new(entries);
        Ok(true)
    }

    /// Applies a pours fetch. `Ok(false)` means the response was stale and
    /// dropped, error or not.
    pub fn apply_pours(
        &mut self,
        ticket: FetchTicket,
        result: ResultEngine<Vec<PourRecord>>,
    ) -> ResultEngine<bool> {
        if self.pours_seq.is_stale(ticket) {
            tracing::debug!(?ticket, ok = result.is_ok(), "dropping stale pours response");
            return Ok(false);
        }
        let pours = result?;
        self.pours_seq.accept(ticket);
        self.pours = pours;
        Ok(true)
    }

    pub async fn create_pour<S: Store>(
        &mut self,
        store: &S,
        session: &Session,
        input: PourInput,
    ) -> ResultEngine<&PourRecord> {
        let pour = input.validate()?;
        let record = store.create_pour(session, &pour).await?;
        tracing::info!(id = %record.id, pour_id = record.pour.pour_id(), "pour created");
        self.pours_seq.advance();
        self.pours.insert(0, record);
        Ok(&self.pours[0])
    }

    /// Whole-record replacement; `consumables_cost` is recomputed from the
    /// new items.
    pub async fn update_pour<S: Store>(
        &mut self,
        store: &S,
        session: &Session,
        id: Uuid,
        input: PourInput,
    ) -> ResultEngine<&PourRecord> {
        let index = self
            .pours
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("pour {id}")))?;
        let pour = input.validate()?;
        let record = store.update_pour(session, id, &pour).await?;
        tracing::info!(%id, pour_id = record.pour.pour_id(), "pour updated");
        self.pours_seq.advance();
        self.pours[index] = record;
        Ok(&self.pours[index])
    }

    pub async fn delete_pour<S: Store>(
        &mut self,
        store: &S,
        session: &Session,
        id: Uuid,
    ) -> ResultEngine<()> {
        store.delete_pour(session, id).await?;
        tracing::info!(%id, "pour deleted");
        self.pours_seq.advance();
        self.pours.retain(|record| record.id != id);
        Ok(())
    }

    pub async fn create_consumable<S: Store>(
        &mut self,
        store: &S,
        session: &Session,
        name: &str,
        default_price: Money,
    ) -> ResultEngine<&CatalogEntry> {
        let draft = CatalogEntry::new(name, default_price)?;
        let entry = store
            .create_consumable(session, &draft.name, draft.default_price)
            .await?;
        tracing::info!(id = %entry.id, name = %entry.name, "consumable created");
        self.catalog_seq.advance();
        Ok(self.catalog.insert(entry))
    }

    /// Deletes a catalog entry. Pours that copied its price are untouched.
    pub async fn delete_consumable<S: Store>(
        &mut self,
        store: &S,
        session: &Session,
        id: Uuid,
    ) -> ResultEngine<()> {
        store.delete_consumable(session, id).await?;
        tracing::info!(%id, "consumable deleted");
        self.catalog_seq.advance();
        self.catalog.delete(id);
        Ok(())
    }

    /// Snapshot of a catalog entry as a line item.
    pub fn select_consumable(&self, id: Uuid, quantity: u32) -> ResultEngine<ConsumableLineItem> {
        self.catalog.select(id, quantity)
    }

    pub fn totals(&self, id: Uuid) -> ResultEngine<PourTotals> {
        self.held(id).map(PourRecord::totals)
    }

    pub fn summary(&self) -> Summary {
        Summary::of_records(&self.pours)
    }

    pub fn receipt(
        &self,
        id: Uuid,
        brand: BrandMark,
        options: &RenderOptions,
    ) -> ResultEngine<Receipt> {
        let record = self.held(id)?;
        Ok(Receipt::render(record, &record.totals(), brand, options))
    }

    fn held(&self, id: Uuid) -> ResultEngine<&PourRecord> {
        self.pour(id)
            .ok_or_else(|| EngineError::NotFound(format!("pour {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_debug_redacts_the_token() {
        let session = Session::new("s3cret");
        let shown = format!("{session:?}");
        assert!(!shown.contains("s3cret"));
        assert_eq!(session.token(), "s3cret");
    }

    #[test]
    fn sequence_drops_older_tickets() {
        let mut seq = Sequence::default();
        let first = seq.issue();
        let second = seq.issue();
        assert!(seq.accept(second));
        assert!(!seq.accept(first));
        assert!(!seq.accept(second));
    }

    #[test]
    fn mutation_outdates_in_flight_tickets() {
        let mut seq = Sequence::default();
        let in_flight = seq.issue();
        seq.advance();
        assert!(seq.is_stale(in_flight));
        let next = seq.issue();
        assert!(seq.accept(next));
    }

    #[test]
    fn stale_error_is_dropped() {
        let mut ledger = Ledger::new();
        let old = ledger.begin_pours_fetch();
        let new = ledger.begin_pours_fetch();
        assert!(ledger.apply_pours(new, Ok(Vec::new())).unwrap());
        let dropped = ledger.apply_pours(old, Err(EngineError::Transport("timeout".to_string())));
        assert_eq!(dropped, Ok(false));
    }

    #[test]
    fn fresh_error_keeps_state_and_later_response_applies() {
        let mut ledger = Ledger::new();
        let first = ledger.begin_catalog_fetch();
        let second = ledger.begin_catalog_fetch();
        let err = ledger
            .apply_catalog(second, Err(EngineError::AuthExpired))
            .unwrap_err();
        assert!(err.is_auth_expired());
        assert!(ledger.apply_catalog(first, Ok(Vec::new())).unwrap());
    }

    #[test]
    fn reads_of_unknown_ids_are_not_found() {
        let ledger = Ledger::new();
        let id = Uuid::new_v4();
        assert!(matches!(ledger.totals(id), Err(EngineError::NotFound(_))));
        assert!(matches!(
            ledger.receipt(id, BrandMark::default(), &RenderOptions::default()),
            Err(EngineError::NotFound(_))
        ));
        assert_eq!(ledger.summary().total_pours, 0);
    }
}
