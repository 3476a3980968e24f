//! Receipt renderer.
//!
//! [`Receipt::render`] turns one [`PourRecord`] plus its [`PourTotals`] into a
//! backend-independent, paginated document. The backends in [`pdf`], [`html`]
//! and [`text`] only lay that document out; they never touch a pour or compute
//! a number.
//!
//! The table row order is fixed:
//!
//! 1. `Area (ft²)`, `Price per ft²`
//! 2. `Labor`, `Equipment`, `Fuel`, `Repairs`
//! 3. one row per consumable followed by `Consumables Total`, or a single
//!    `Consumables` row when the pour has no items
//! 4. `Misc`
//!
//! followed by the summary block `Total Cost`, `Total Price`, `Profit`. The
//! legacy lunch cost is part of `Total Cost` but has no row of its own.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::{EngineError, PourRecord, PourTotals, ProfitSign, ResultEngine};

pub use brand::{BrandMark, DEFAULT_BRAND_TEXT};

mod brand;
pub mod html;
pub mod pdf;
pub mod text;

pub const RECEIPT_TITLE: &str = "Concrete Pour Receipt";
pub const DEFAULT_ROWS_PER_PAGE: usize = 24;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Table rows per page. Values below 1 are treated as 1.
    pub rows_per_page: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

/// Role of a line, used by backends for indentation and emphasis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Charge,
    Consumable,
    Subtotal,
    Total,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptLine {
    pub label: String,
    pub amount: String,
    pub kind: LineKind,
}

impl ReceiptLine {
    fn new(label: impl Into<String>, amount: impl ToString, kind: LineKind) -> Self {
        Self {
            label: label.into(),
            amount: amount.to_string(),
            kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptHeader {
    pub brand: BrandMark,
    pub title: String,
    pub pour_id: String,
    pub date: NaiveDate,
}

impl ReceiptHeader {
    /// US short date, e.g. `3/14/2025`.
    #[must_use]
    pub fn date_label(&self) -> String {
        self.date.format("%-m/%-d/%Y").to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptPage {
    /// 1-based.
    pub number: usize,
    pub lines: Vec<ReceiptLine>,
}

/// A rendered receipt, ready for a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub header: ReceiptHeader,
    /// Itemized table, split into pages. Never empty.
    pub pages: Vec<ReceiptPage>,
    /// `Total Cost`, `Total Price`, `Profit`; placed after the last page.
    pub summary: Vec<ReceiptLine>,
    pub outcome: ProfitSign,
}

impl Receipt {
    /// Builds the document. Pure: the record is only read.
    #[must_use]
    pub fn render(
        record: &PourRecord,
        totals: &PourTotals,
        brand: BrandMark,
        options: &RenderOptions,
    ) -> Self {
        let pour = &record.pour;

        let mut lines = vec![
            ReceiptLine::new("Area (ft²)", pour.area(), LineKind::Charge),
            ReceiptLine::new("Price per ft²", pour.price_per_sqft(), LineKind::Charge),
            ReceiptLine::new("Labor", pour.labor_cost(), LineKind::Charge),
            ReceiptLine::new("Equipment", pour.equipment_cost(), LineKind::Charge),
            ReceiptLine::new("Fuel", pour.fuel_cost(), LineKind::Charge),
            ReceiptLine::new("Repairs", pour.repairs_cost(), LineKind::Charge),
        ];

        if pour.consumable_items().is_empty() {
            lines.push(ReceiptLine::new(
                "Consumables",
                totals.consumables,
                LineKind::Charge,
            ));
        } else {
            lines.extend(pour.consumable_items().iter().map(|item| {
                ReceiptLine::new(
                    format!("{} ({} × {})", item.name, item.quantity, item.unit_price),
                    item.total(),
                    LineKind::Consumable,
                )
            }));
            lines.push(ReceiptLine::new(
                "Consumables Total",
                totals.consumables,
                LineKind::Subtotal,
            ));
        }

        lines.push(ReceiptLine::new("Misc", pour.misc_cost(), LineKind::Charge));

        let rows_per_page = options.rows_per_page.max(1);
        let pages = lines
            .chunks(rows_per_page)
            .enumerate()
            .map(|(index, chunk)| ReceiptPage {
                number: index + 1,
                lines: chunk.to_vec(),
            })
            .collect();

        let summary = vec![
            ReceiptLine::new("Total Cost", totals.total_cost, LineKind::Total),
            ReceiptLine::new("Total Price", totals.total_price, LineKind::Total),
            ReceiptLine::new("Profit", totals.profit, LineKind::Total),
        ];

        Self {
            header: ReceiptHeader {
                brand,
                title: RECEIPT_TITLE.to_string(),
                pour_id: pour.pour_id().to_string(),
                date: pour.date(),
            },
            pages,
            summary,
            outcome: totals.sign(),
        }
    }

    /// Every table line, in order, across pages.
    pub fn lines(&self) -> impl Iterator<Item = &ReceiptLine> {
        self.pages.iter().flat_map(|page| page.lines.iter())
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// `receipt-<pourId>.<ext>`, with characters that cannot appear in a
    /// file name replaced by `-`.
    #[must_use]
    pub fn file_name(&self, format: ReceiptFormat) -> String {
        let stem: String = self
            .header
            .pour_id
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
                c if c.is_control() => '-',
                c => c,
            })
            .collect();
        format!("receipt-{stem}.{}", format.extension())
    }
}

/// Output backend for a [`Receipt`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReceiptFormat {
    #[default]
    Pdf,
    Html,
    Text,
}

impl ReceiptFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Text => "txt",
        }
    }

    /// Renders to the bytes of a file in this format.
    pub fn render(self, receipt: &Receipt) -> ResultEngine<Vec<u8>> {
        match self {
            Self::Pdf => pdf::render(receipt),
            Self::Html => Ok(html::render(receipt).into_bytes()),
            Self::Text => Ok(text::render(receipt).into_bytes()),
        }
    }
}

impl FromStr for ReceiptFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "html" | "htm" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            other => Err(EngineError::Validation(format!(
                "unsupported receipt format: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{Area, LineItemInput, Money, PourInput};

    fn record(items: &[(&str, i64, u32)]) -> PourRecord {
        let pour = PourInput {
            pour_id: Some("P-001".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 3, 14),
            area: Some(Area::from_sqft(100)),
            price_per_sqft: Some(Money::new(5_00)),
            labor_cost: Some(Money::new(200_00)),
            equipment_cost: Some(Money::new(50_00)),
            fuel_cost: Some(Money::new(20_00)),
            repairs_cost: Some(Money::ZERO),
            misc_cost: Some(Money::new(10_00)),
            lunch_cost: Some(Money::new(7_00)),
            consumable_items: items
                .iter()
                .map(|&(name, price, quantity)| LineItemInput {
                    name: Some(name.to_string()),
                    unit_price: Some(Money::new(price)),
                    quantity: Some(quantity),
                })
                .collect(),
            legacy_consumables_cost: None,
        }
        .validate()
        .unwrap();
        PourRecord::new(Uuid::nil(), pour)
    }

    fn render(record: &PourRecord, rows_per_page: usize) -> Receipt {
        Receipt::render(
            record,
            &record.totals(),
            BrandMark::default(),
            &RenderOptions { rows_per_page },
        )
    }

    fn labels(receipt: &Receipt) -> Vec<&str> {
        receipt.lines().map(|line| line.label.as_str()).collect()
    }

    #[test]
    fn itemized_rows_in_fixed_order() {
        let record = record(&[("Rebar", 15_00, 3), ("Tie wire", 2_50, 2)]);
        let receipt = render(&record, DEFAULT_ROWS_PER_PAGE);
        assert_eq!(
            labels(&receipt),
            [
                "Area (ft²)",
                "Price per ft²",
                "Labor",
                "Equipment",
                "Fuel",
                "Repairs",
                "Rebar (3 × $15.00)",
                "Tie wire (2 × $2.50)",
                "Consumables Total",
                "Misc",
            ]
        );
        let amounts: Vec<_> = receipt.lines().map(|l| l.amount.as_str()).collect();
        assert_eq!(amounts[6], "$45.00");
        assert_eq!(amounts[7], "$5.00");
        assert_eq!(amounts[8], "$50.00");
    }

    #[test]
    fn no_items_renders_a_single_consumables_row() {
        let record = record(&[]);
        let receipt = render(&record, DEFAULT_ROWS_PER_PAGE);
        assert_eq!(
            labels(&receipt),
            [
                "Area (ft²)",
                "Price per ft²",
                "Labor",
                "Equipment",
                "Fuel",
                "Repairs",
                "Consumables",
                "Misc",
            ]
        );
        assert!(receipt.lines().all(|l| l.label != "Lunch"));
    }

    #[test]
    fn summary_block_uses_the_totals() {
        let record = record(&[("Rebar", 15_00, 3)]);
        let receipt = render(&record, DEFAULT_ROWS_PER_PAGE);
        let summary: Vec<_> = receipt
            .summary
            .iter()
            .map(|l| (l.label.as_str(), l.amount.as_str()))
            .collect();
        // lunch (7.00) is in the total cost even though it has no row
        assert_eq!(
            summary,
            [
                ("Total Cost", "$332.00"),
                ("Total Price", "$500.00"),
                ("Profit", "$168.00"),
            ]
        );
        assert_eq!(receipt.outcome, ProfitSign::Profit);
    }

    #[test]
    fn rendering_is_deterministic_and_read_only() {
        let record = record(&[("Rebar", 15_00, 3)]);
        let before = record.clone();
        let first = render(&record, 4);
        let second = render(&record, 4);
        assert_eq!(first, second);
        assert_eq!(record, before);
    }

    #[test]
    fn pages_split_rows_without_reordering() {
        let record = record(&[("A", 1_00, 1), ("B", 1_00, 1), ("C", 1_00, 1)]);
        let one_page = render(&record, DEFAULT_ROWS_PER_PAGE);
        let paged = render(&record, 4);

        assert_eq!(one_page.page_count(), 1);
        assert_eq!(paged.page_count(), 3);
        assert_eq!(paged.pages[0].lines.len(), 4);
        assert_eq!(paged.pages[2].number, 3);
        assert_eq!(labels(&one_page), labels(&paged));
    }

    #[test]
    fn zero_rows_per_page_is_clamped() {
        let record = record(&[]);
        let receipt = render(&record, 0);
        assert_eq!(receipt.page_count(), 8);
    }

    #[test]
    fn file_name_follows_convention() {
        let record = record(&[]);
        let receipt = render(&record, DEFAULT_ROWS_PER_PAGE);
        assert_eq!(receipt.file_name(ReceiptFormat::Pdf), "receipt-P-001.pdf");
        assert_eq!(receipt.file_name(ReceiptFormat::Html), "receipt-P-001.html");
        assert_eq!(receipt.file_name(ReceiptFormat::Text), "receipt-P-001.txt");

        let mut odd = receipt.clone();
        odd.header.pour_id = "lot 4/b".to_string();
        assert_eq!(odd.file_name(ReceiptFormat::Text), "receipt-lot 4-b.txt");
    }

    #[test]
    fn header_carries_pour_identity() {
        let record = record(&[]);
        let receipt = render(&record, DEFAULT_ROWS_PER_PAGE);
        assert_eq!(receipt.header.title, RECEIPT_TITLE);
        assert_eq!(receipt.header.pour_id, "P-001");
        assert_eq!(receipt.header.date_label(), "3/14/2025");
    }

    #[test]
    fn format_parses_names_and_extensions() {
        assert_eq!("HTML".parse::<ReceiptFormat>().unwrap(), ReceiptFormat::Html);
        assert_eq!("txt".parse::<ReceiptFormat>().unwrap(), ReceiptFormat::Text);
        assert_eq!(" PDF ".parse::<ReceiptFormat>().unwrap(), ReceiptFormat::Pdf);
        assert_eq!(ReceiptFormat::default(), ReceiptFormat::Pdf);
        assert!("docx".parse::<ReceiptFormat>().is_err());
    }

    #[test]
    fn every_backend_is_byte_identical_across_renders() {
        let record = record(&[("Rebar", 15_00, 3), ("Tie wire", 2_50, 2)]);
        for format in [ReceiptFormat::Pdf, ReceiptFormat::Html, ReceiptFormat::Text] {
            let first = render(&record, 4);
            let second = render(&record, 4);
            assert_eq!(
                format.render(&first).unwrap(),
                format.render(&second).unwrap(),
                "{format:?}"
            );
        }
    }
}
