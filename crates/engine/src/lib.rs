//! Cost and revenue tracking for concrete pours.
//!
//! The crate is the computation core: fixed-point [`Money`] and [`Area`], the
//! consumables [`Catalog`], validated [`Pour`] records, the cost and summary
//! aggregators, the paginated [`Receipt`] and the [`Ledger`] that keeps
//! client-side state over a [`Store`].
//!
//! All numbers shown anywhere (table row, summary tile, receipt) come from
//! [`PourTotals`], so they always agree.

pub use area::Area;
pub use consumables::{Catalog, CatalogEntry, ConsumableLineItem};
pub use cost::{PourTotals, ProfitSign};
pub use error::EngineError;
pub use ledger::{FetchTicket, Ledger, Session, Store};
pub use money::Money;
pub use pour::{LEGACY_CONSUMABLES_NAME, LineItemInput, Pour, PourInput, PourRecord};
pub use receipt::{
    BrandMark, DEFAULT_ROWS_PER_PAGE, LineKind, Receipt, ReceiptFormat, ReceiptHeader,
    ReceiptLine, ReceiptPage, RenderOptions,
};
pub use summary::{Summary, SummaryTile};
pub use util::MAX_QUANTITY;

pub mod area;
mod consumables;
pub mod cost;
mod error;
mod ledger;
pub mod money;
mod pour;
pub mod receipt;
mod summary;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
