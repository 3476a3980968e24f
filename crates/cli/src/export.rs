//! File outputs: pour CSV and saved receipts.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use csv::Writer;
use engine::{PourRecord, Receipt, ReceiptFormat};
use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
struct ExportRow<'a> {
    id: String,
    pour_id: &'a str,
    date: String,
    area_sqft: String,
    price_per_sqft: String,
    labor: String,
    equipment: String,
    fuel: String,
    repairs: String,
    misc: String,
    lunch: String,
    consumables: String,
    total_cost: String,
    total_price: String,
    profit: String,
    outcome: &'static str,
}

impl<'a> From<&'a PourRecord> for ExportRow<'a> {
    fn from(record: &'a PourRecord) -> Self {
        let pour = &record.pour;
        let totals = record.totals();
        Self {
            id: record.id.to_string(),
            pour_id: pour.pour_id(),
            date: pour.date().format("%Y-%m-%d").to_string(),
            area_sqft: pour.area().to_plain_string(),
            price_per_sqft: pour.price_per_sqft().to_plain_string(),
            labor: pour.labor_cost().to_plain_string(),
            equipment: pour.equipment_cost().to_plain_string(),
            fuel: pour.fuel_cost().to_plain_string(),
            repairs: pour.repairs_cost().to_plain_string(),
            misc: pour.misc_cost().to_plain_string(),
            lunch: pour.lunch_cost().to_plain_string(),
            consumables: totals.consumables.to_plain_string(),
            total_cost: totals.total_cost.to_plain_string(),
            total_price: totals.total_price.to_plain_string(),
            profit: totals.profit.to_plain_string(),
            outcome: totals.sign().as_str(),
        }
    }
}

/// One CSV row per pour, in the order given, with a header line.
pub fn write_csv<W: Write>(records: &[PourRecord], out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    for record in records {
        writer.serialize(ExportRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Renders `receipt` and writes it to `path`, or to
/// `<dir>/receipt-<pourId>.<ext>` when no path is given.
pub fn save_receipt(
    receipt: &Receipt,
    format: ReceiptFormat,
    dir: &Path,
    path: Option<PathBuf>,
) -> Result<PathBuf> {
    let path = path.unwrap_or_else(|| dir.join(receipt.file_name(format)));
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, format.render(receipt)?)?;
    tracing::info!(path = %path.display(), pages = receipt.page_count(), "receipt saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use engine::{
        Area, BrandMark, LineItemInput, Money, PourInput, RenderOptions,
    };
    use uuid::Uuid;

    fn record(pour_id: &str, labor: i64) -> PourRecord {
        let pour = PourInput {
            pour_id: Some(pour_id.to_string()),
            date: NaiveDate::from_ymd_opt(2026, 5, 1),
            area: Some(Area::from_sqft(100)),
            price_per_sqft: Some(Money::new(500)),
            labor_cost: Some(Money::new(labor)),
            equipment_cost: Some(Money::new(5_000)),
            fuel_cost: Some(Money::new(2_000)),
            repairs_cost: Some(Money::ZERO),
            misc_cost: Some(Money::new(1_000)),
            consumable_items: vec![LineItemInput {
                name: Some("Rebar".to_string()),
                unit_price: Some(Money::new(1_500)),
                quantity: Some(3),
            }],
            ..PourInput::default()
        }
        .validate()
        .unwrap();
        PourRecord::new(Uuid::new_v4(), pour)
    }

    #[test]
    fn csv_has_plain_amounts_and_outcome() {
        let mut out = Vec::new();
        write_csv(&[record("P-1", 20_000), record("P-2", 80_000)], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,pour_id,date,area_sqft"));
        assert!(lines[1].contains(",P-1,2026-05-01,100.00,5.00,"));
        assert!(lines[1].ends_with(",45.00,325.00,500.00,175.00,profit"));
        assert!(lines[2].ends_with(",-425.00,loss"));
    }

    #[test]
    fn receipt_lands_in_dir_under_its_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let record = record("A/7", 20_000);
        let receipt = Receipt::render(
            &record,
            &record.totals(),
            BrandMark::default(),
            &RenderOptions::default(),
        );

        let path = save_receipt(&receipt, ReceiptFormat::Text, dir.path(), None).unwrap();
        assert_eq!(path, dir.path().join("receipt-A-7.txt"));
        let saved = fs::read_to_string(path).unwrap();
        assert!(saved.contains("Concrete Pour Receipt"));
        assert!(saved.contains("$175.00"));
    }

    #[test]
    fn pdf_receipt_is_the_default_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let record = record("P-3", 20_000);
        let receipt = Receipt::render(
            &record,
            &record.totals(),
            BrandMark::default(),
            &RenderOptions::default(),
        );

        let path = save_receipt(&receipt, ReceiptFormat::default(), dir.path(), None).unwrap();
        assert_eq!(path, dir.path().join("receipt-P-3.pdf"));
        assert!(fs::read(path).unwrap().starts_with(b"%PDF-"));
    }
}
