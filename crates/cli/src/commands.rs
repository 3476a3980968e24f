//! Subcommands and their execution against a [`Ledger`].

use std::{io::Write, path::PathBuf};

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use engine::{
    Area, BrandMark, Catalog, CatalogEntry, EngineError, Ledger, LineItemInput, Money, PourInput,
    PourRecord, ReceiptFormat, RenderOptions, Session, Store, Summary,
};
use uuid::Uuid;

use crate::{
    config::CliConfig,
    error::{AppError, Result},
    export,
};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the consumables catalog.
    Consumables(Consumables),
    /// Record, edit and list pours.
    Pours(Pours),
    /// Totals across every pour.
    Summary,
    /// Save the receipt of one pour.
    Receipt(ReceiptArgs),
    /// Write every pour as CSV.
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct Consumables {
    #[command(subcommand)]
    pub command: ConsumablesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConsumablesCommand {
    List,
    Add {
        name: String,
        /// Default unit price, e.g. 15 or 15.50.
        price: String,
    },
    Rm {
        id: Uuid,
    },
}

#[derive(Debug, Args)]
pub struct Pours {
    #[command(subcommand)]
    pub command: PoursCommand,
}

#[derive(Debug, Subcommand)]
pub enum PoursCommand {
    List,
    /// Print the itemized receipt of one pour.
    Show {
        /// Record id or pour label.
        pour: String,
    },
    Add(PourFields),
    /// Replace a pour; flags left out keep their current value.
    Edit {
        /// Record id or pour label.
        pour: String,
        #[command(flatten)]
        fields: PourFields,
    },
    Rm {
        /// Record id or pour label.
        pour: String,
    },
}

#[derive(Debug, Args)]
pub struct ReceiptArgs {
    /// Record id or pour label.
    pub pour: String,
    /// pdf, html or text.
    #[arg(long, default_value = "pdf")]
    pub format: ReceiptFormat,
    /// Output file; defaults to `receipt-<pour>.<ext>` in the receipt directory.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Pour form fields. Amounts are plain decimals such as `1234.50`.
#[derive(Debug, Default, Args)]
pub struct PourFields {
    #[arg(long)]
    pub pour_id: Option<String>,
    /// YYYY-MM-DD or M/D/YYYY.
    #[arg(long)]
    pub date: Option<String>,
    /// Square feet.
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long)]
    pub price_per_sqft: Option<String>,
    #[arg(long)]
    pub labor: Option<String>,
    #[arg(long)]
    pub equipment: Option<String>,
    #[arg(long)]
    pub fuel: Option<String>,
    #[arg(long)]
    pub repairs: Option<String>,
    #[arg(long)]
    pub misc: Option<String>,
    #[arg(long)]
    pub lunch: Option<String>,
    /// Catalog entry by id or name, with optional quantity after a space:
    /// `Rebar`, `Rebar x3` or `Mesh 6x6 x2`. `Mesh 6x6` is a name.
    #[arg(long = "consumable", value_name = "ENTRY[ xQTY]")]
    pub consumables: Vec<String>,
    /// Free line item: `Sealer=42.50` or `Sealer=42.50x2`.
    #[arg(long = "item", value_name = "NAME=PRICE[xQTY]")]
    pub items: Vec<String>,
    /// Drop the current line items before adding new ones.
    #[arg(long)]
    pub clear_items: bool,
}

impl PourFields {
    /// Writes every given flag onto `input`. Line items are appended after
    /// the existing ones.
    pub fn apply(self, input: &mut PourInput, catalog: &Catalog) -> Result<()> {
        if let Some(pour_id) = self.pour_id {
            input.pour_id = Some(pour_id);
        }
        if let Some(date) = self.date {
            input.date = Some(parse_date(&date)?);
        }
        if let Some(area) = self.area {
            input.area = Some(parse_field::<Area>("area", &area)?);
        }
        let amounts = [
            (self.price_per_sqft, "price_per_sqft", &mut input.price_per_sqft),
            (self.labor, "labor_cost", &mut input.labor_cost),
            (self.equipment, "equipment_cost", &mut input.equipment_cost),
            (self.fuel, "fuel_cost", &mut input.fuel_cost),
            (self.repairs, "repairs_cost", &mut input.repairs_cost),
            (self.misc, "misc_cost", &mut input.misc_cost),
            (self.lunch, "lunch_cost", &mut input.lunch_cost),
        ];
        for (raw, field, slot) in amounts {
            if let Some(raw) = raw {
                *slot = Some(parse_field::<Money>(field, &raw)?);
            }
        }

        if self.clear_items {
            input.consumable_items.clear();
            input.legacy_consumables_cost = None;
        }
        for raw in self.consumables {
            let (reference, quantity) = split_entry(&raw)?;
            let entry = find_entry(catalog, reference)?;
            let item = catalog.select(entry.id, quantity)?;
            input.consumable_items.push(LineItemInput::from(item));
        }
        for raw in self.items {
            input.consumable_items.push(parse_item(&raw)?);
        }
        Ok(())
    }
}

fn parse_field<T>(field: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr<Err = EngineError>,
{
    raw.parse::<T>().map_err(|err| match err {
        EngineError::Validation(msg) => EngineError::Validation(format!("{field}: {msg}")).into(),
        other => other.into(),
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .map_err(|_| EngineError::Validation(format!("date: invalid date {raw:?}")).into())
}

/// `"Rebar x3"` → `("Rebar", 3)`; no suffix means one.
fn split_quantity(raw: &str) -> Result<(&str, u32)> {
    let raw = raw.trim();
    if let Some((head, tail)) = raw.rsplit_once(['x', 'X'])
        && !tail.is_empty()
        && tail.chars().all(|c| c.is_ascii_digit())
    {
        let quantity = tail
            .parse::<u32>()
            .map_err(|_| AppError::Usage(format!("invalid quantity in {raw:?}")))?;
        return Ok((head.trim(), quantity));
    }
    Ok((raw, 1))
}

/// Catalog reference with an optional ` xN` suffix. The `x` must follow
/// whitespace so names such as `Mesh 6x6` stay whole.
fn split_entry(raw: &str) -> Result<(&str, u32)> {
    let raw = raw.trim();
    if let Some((head, tail)) = raw.rsplit_once(char::is_whitespace)
        && let Some(digits) = tail.strip_prefix(['x', 'X'])
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
    {
        let quantity = digits
            .parse::<u32>()
            .map_err(|_| AppError::Usage(format!("invalid quantity in {raw:?}")))?;
        return Ok((head.trim_end(), quantity));
    }
    Ok((raw, 1))
}

fn parse_item(raw: &str) -> Result<LineItemInput> {
    let (name, rest) = raw
        .split_once('=')
        .ok_or_else(|| AppError::Usage(format!("expected NAME=PRICE[xQTY], got {raw:?}")))?;
    let (price, quantity) = split_quantity(rest)?;
    Ok(LineItemInput {
        name: Some(name.trim().to_string()),
        unit_price: Some(parse_field::<Money>("unit_price", price)?),
        quantity: Some(quantity),
    })
}

fn find_entry<'a>(catalog: &'a Catalog, reference: &str) -> Result<&'a CatalogEntry> {
    let by_id = Uuid::parse_str(reference)
        .ok()
        .and_then(|id| catalog.get(id));
    by_id
        .or_else(|| {
            catalog
                .list()
                .iter()
                .find(|entry| entry.name.eq_ignore_ascii_case(reference))
        })
        .ok_or_else(|| EngineError::NotFound(format!("consumable {reference}")).into())
}

/// Record id first, then pour label.
fn resolve(ledger: &Ledger, reference: &str) -> Result<Uuid> {
    let reference = reference.trim();
    let by_id = Uuid::parse_str(reference)
        .ok()
        .and_then(|id| ledger.pour(id));
    by_id
        .or_else(|| ledger.find_by_label(reference))
        .map(|record| record.id)
        .ok_or_else(|| EngineError::NotFound(format!("pour {reference}")).into())
}

pub fn print_catalog(catalog: &Catalog, out: &mut impl Write) -> Result<()> {
    if catalog.is_empty() {
        writeln!(out, "No consumables yet.")?;
        return Ok(());
    }
    for entry in catalog.list() {
        writeln!(
            out,
            "{}  {:<30} {:>12}",
            entry.id,
            entry.name,
            entry.default_price.to_string()
        )?;
    }
    Ok(())
}

pub fn print_pours(pours: &[PourRecord], out: &mut impl Write) -> Result<()> {
    if pours.is_empty() {
        writeln!(out, "No pours yet.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<10}  {:<16} {:>12} {:>14} {:>14} {:>14}",
        "Date", "Pour", "Area (ft²)", "Total Cost", "Total Price", "Profit"
    )?;
    for record in pours {
        let totals = record.totals();
        writeln!(
            out,
            "{:<10}  {:<16} {:>12} {:>14} {:>14} {:>14}  {}",
            record.pour.date().format("%Y-%m-%d").to_string(),
            record.pour.pour_id(),
            record.pour.area().to_string(),
            totals.total_cost.to_string(),
            totals.total_price.to_string(),
            totals.profit.to_string(),
            totals.sign().as_str(),
        )?;
    }
    Ok(())
}

pub fn print_summary(summary: &Summary, out: &mut impl Write) -> Result<()> {
    for tile in summary.tiles() {
        writeln!(out, "{:<24} {}", tile.label, tile.value)?;
    }
    writeln!(out, "{:<24} {}", "Outcome", summary.profit_sign().as_str())?;
    Ok(())
}

/// Runs one command. The ledger must already hold a fresh snapshot.
pub async fn execute<S: Store>(
    command: Command,
    ledger: &mut Ledger,
    store: &S,
    session: &Session,
    config: &CliConfig,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Consumables(Consumables { command }) => match command {
            ConsumablesCommand::List => print_catalog(ledger.catalog(), out)?,
            ConsumablesCommand::Add { name, price } => {
                let price = parse_field::<Money>("default_price", &price)?;
                let entry = ledger.create_consumable(store, session, &name, price).await?;
                writeln!(out, "Added {} ({}) {}", entry.name, entry.default_price, entry.id)?;
            }
            ConsumablesCommand::Rm { id } => {
                ledger.delete_consumable(store, session, id).await?;
                writeln!(out, "Removed consumable {id}")?;
            }
        },
        Command::Pours(Pours { command }) => match command {
            PoursCommand::List => print_pours(ledger.pours(), out)?,
            PoursCommand::Show { pour } => {
                let id = resolve(ledger, &pour)?;
                let receipt = ledger.receipt(id, BrandMark::default(), &render_options(config))?;
                write!(out, "{}", engine::receipt::text::render(&receipt))?;
            }
            PoursCommand::Add(fields) => {
                let mut input = PourInput::default();
                fields.apply(&mut input, ledger.catalog())?;
                let record = ledger.create_pour(store, session, input).await?;
                print_saved("Created", record, out)?;
            }
            PoursCommand::Edit { pour, fields } => {
                let id = resolve(ledger, &pour)?;
                let mut input = ledger
                    .pour(id)
                    .map(|record| PourInput::from(&record.pour))
                    .unwrap_or_default();
                fields.apply(&mut input, ledger.catalog())?;
                let record = ledger.update_pour(store, session, id, input).await?;
                print_saved("Updated", record, out)?;
            }
            PoursCommand::Rm { pour } => {
                let id = resolve(ledger, &pour)?;
                ledger.delete_pour(store, session, id).await?;
                writeln!(out, "Removed pour {id}")?;
            }
        },
        Command::Summary => print_summary(&ledger.summary(), out)?,
        Command::Receipt(args) => {
            let id = resolve(ledger, &args.pour)?;
            let brand = BrandMark::load(config.brand.as_deref());
            let receipt = ledger.receipt(id, brand, &render_options(config))?;
            let path = export::save_receipt(&receipt, args.format, &config.receipt_dir, args.out)?;
            writeln!(out, "Saved {}", path.display())?;
        }
        Command::Export(args) => match args.out {
            Some(path) => {
                export::write_csv(ledger.pours(), std::fs::File::create(&path)?)?;
                writeln!(out, "Exported {} pours to {}", ledger.pours().len(), path.display())?;
            }
            None => export::write_csv(ledger.pours(), &mut *out)?,
        },
    }
    Ok(())
}

fn render_options(config: &CliConfig) -> RenderOptions {
    RenderOptions {
        rows_per_page: config.rows_per_page,
    }
}

fn print_saved(verb: &str, record: &PourRecord, out: &mut impl Write) -> Result<()> {
    let totals = record.totals();
    writeln!(
        out,
        "{verb} {} ({}): cost {}, price {}, {} {}",
        record.pour.pour_id(),
        record.id,
        totals.total_cost,
        totals.total_price,
        totals.sign().as_str(),
        totals.profit,
    )?;
    Ok(())
}
