//! Self-contained HTML receipt. Each page is a `<section class="page">` with
//! a print page break between sections; the logo, if any, is inlined.

use std::fmt::Write as _;

use super::{LineKind, Receipt, ReceiptHeader, ReceiptLine};

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
.page{page-break-after:always}\
.page:last-of-type{page-break-after:auto}\
table{width:100%;border-collapse:collapse}\
td{padding:2px 4px}\
td.amount{text-align:right}\
tr.consumable td.label{padding-left:2em}\
tr.subtotal td,tr.total td{font-weight:bold;border-top:1px solid #000}\
.profit{color:#1a7f37}.loss{color:#b42318}\
.brand img{max-height:64px}";

#[must_use]
pub fn render(receipt: &Receipt) -> String {
    let pages = receipt.page_count();
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(
        out,
        "<title>{} {}</title>",
        escape(&receipt.header.title),
        escape(&receipt.header.pour_id)
    );
    let _ = writeln!(out, "<style>{STYLE}</style>\n</head>\n<body>");

    for (index, page) in receipt.pages.iter().enumerate() {
        let _ = writeln!(out, "<section class=\"page\">");
        write_header(&mut out, &receipt.header);
        if pages > 1 {
            let _ = writeln!(out, "<p class=\"page-no\">Page {} of {pages}</p>", page.number);
        }
        out.push_str("<table>\n");
        for line in &page.lines {
            write_row(&mut out, line, None);
        }
        if index + 1 == pages {
            let outcome = receipt.outcome.as_str();
            for line in &receipt.summary {
                let class = (line.label == "Profit").then_some(outcome);
                write_row(&mut out, line, class);
            }
        }
        out.push_str("</table>\n</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn write_header(out: &mut String, header: &ReceiptHeader) {
    out.push_str("<header>\n");
    match header.brand.data_uri() {
        Some(uri) => {
            let _ = writeln!(
                out,
                "<div class=\"brand\"><img src=\"{uri}\" alt=\"{}\"></div>",
                escape(header.brand.text())
            );
        }
        None => {
            let _ = writeln!(
                out,
                "<div class=\"brand\">{}</div>",
                escape(header.brand.text())
            );
        }
    }
    let _ = writeln!(out, "<h1>{}</h1>", escape(&header.title));
    let _ = writeln!(
        out,
        "<p>Pour: {}<br>Date: {}</p>",
        escape(&header.pour_id),
        header.date_label()
    );
    out.push_str("</header>\n");
}

fn write_row(out: &mut String, line: &ReceiptLine, amount_class: Option<&str>) {
    let row_class = match line.kind {
        LineKind::Charge => "charge",
        LineKind::Consumable => "consumable",
        LineKind::Subtotal => "subtotal",
        LineKind::Total => "total",
    };
    let amount_class = match amount_class {
        Some(extra) => format!("amount {extra}"),
        None => "amount".to_string(),
    };
    let _ = writeln!(
        out,
        "<tr class=\"{row_class}\"><td class=\"label\">{}</td><td class=\"{amount_class}\">{}</td></tr>",
        escape(&line.label),
        escape(&line.amount)
    );
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::{
        Area, BrandMark, LineItemInput, Money, PourInput, PourRecord, RenderOptions,
    };

    fn receipt(item: &str, labor: i64, rows_per_page: usize, brand: BrandMark) -> Receipt {
        let pour = PourInput {
            pour_id: Some("P<1>".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 1, 9),
            area: Some(Area::from_sqft(10)),
            price_per_sqft: Some(Money::new(1_00)),
            labor_cost: Some(Money::new(labor)),
            equipment_cost: Some(Money::ZERO),
            fuel_cost: Some(Money::ZERO),
            repairs_cost: Some(Money::ZERO),
            misc_cost: Some(Money::ZERO),
            consumable_items: vec![LineItemInput {
                name: Some(item.to_string()),
                unit_price: Some(Money::new(1_00)),
                quantity: Some(1),
            }],
            ..PourInput::default()
        }
        .validate()
        .unwrap();
        let record = PourRecord::new(Uuid::nil(), pour);
        Receipt::render(
            &record,
            &record.totals(),
            brand,
            &RenderOptions { rows_per_page },
        )
    }

    #[test]
    fn user_text_is_escaped() {
        let out = render(&receipt("Bolts & <nuts>", 0, 24, BrandMark::default()));
        assert!(out.contains("Bolts &amp; &lt;nuts&gt;"));
        assert!(out.contains("P&lt;1&gt;"));
        assert!(!out.contains("<nuts>"));
    }

    #[test]
    fn loss_is_marked() {
        let out = render(&receipt("Rebar", 50_00, 24, BrandMark::default()));
        assert!(out.contains("<td class=\"amount loss\">-$41.00</td>"));
    }

    #[test]
    fn one_section_per_page_with_summary_last() {
        let out = render(&receipt("Rebar", 0, 3, BrandMark::default()));
        assert_eq!(out.matches("<section class=\"page\">").count(), 3);
        let last = out.rfind("<section").unwrap();
        assert!(out.find("Total Cost").unwrap() > last);
    }

    #[test]
    fn image_brand_is_inlined() {
        let brand = BrandMark::Image {
            mime: "image/png",
            bytes: vec![1, 2, 3],
        };
        let out = render(&receipt("Rebar", 0, 24, brand));
        assert!(out.contains("<img src=\"data:image/png;base64,AQID\""));
    }
}
