//! Consumables catalog and the line items a pour copies out of it.
//!
//! A [`CatalogEntry`] is a reusable default price. Selecting it for a pour
//! produces a [`ConsumableLineItem`] that owns a *copy* of the name and price:
//! editing or deleting the entry afterwards never changes pours that already
//! used it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine, cost,
    util::{check_amount, check_label, check_quantity},
};

/// A named consumable with its default unit price.
///
/// Names are not unique: two entries with the same name are distinct and are
/// told apart by `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
    pub default_price: Money,
}

impl CatalogEntry {
    /// Validates and builds a new entry with a fresh id.
    pub fn new(name: &str, default_price: Money) -> ResultEngine<Self> {
        Self::with_id(Uuid::new_v4(), name, default_price)
    }

    /// Validates an entry whose id was assigned elsewhere (the store).
    pub fn with_id(id: Uuid, name: &str, default_price: Money) -> ResultEngine<Self> {
        Ok(Self {
            id,
            name: check_label("name", name)?,
            default_price: check_amount("default_price", default_price)?,
        })
    }
}

/// One consumable on a pour: a by-value snapshot, not a catalog reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableLineItem {
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl ConsumableLineItem {
    pub fn new(name: &str, unit_price: Money, quantity: u32) -> ResultEngine<Self> {
        Ok(Self {
            name: check_label("consumable name", name)?,
            unit_price: check_amount("consumable unit_price", unit_price)?,
            quantity: check_quantity("consumable quantity", quantity)?,
        })
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn total(&self) -> Money {
        cost::line_item_total(self)
    }
}

/// Ordered set of catalog entries, as returned by the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn list(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Validates and appends a new entry.
    pub fn create(&mut self, name: &str, default_price: Money) -> ResultEngine<&CatalogEntry> {
        let entry = CatalogEntry::new(name, default_price)?;
        Ok(self.insert(entry))
    }

    /// Appends an entry, replacing any entry with the same id in place.
    pub fn insert(&mut self, entry: CatalogEntry) -> &CatalogEntry {
        let index = match self.entries.iter().position(|e| e.id == entry.id) {
            Some(index) => {
                self.entries[index] = entry;
                index
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        &self.entries[index]
    }

    /// Removes an entry. Returns `false` if it was already gone.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Copies an entry's name and default price into a line item.
    pub fn select(&self, id: Uuid, quantity: u32) -> ResultEngine<ConsumableLineItem> {
        let entry = self
            .get(id)
            .ok_or_else(|| EngineError::NotFound(format!("consumable {id}")))?;
        ConsumableLineItem::new(&entry.name, entry.default_price, quantity)
    }
}
