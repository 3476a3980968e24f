//! Plain-text receipt. Pages are separated by a form feed.

use std::fmt::Write as _;

use super::{LineKind, Receipt, ReceiptLine};

const LABEL_WIDTH: usize = 40;
const AMOUNT_WIDTH: usize = 16;
const WIDTH: usize = LABEL_WIDTH + AMOUNT_WIDTH;
const PAGE_BREAK: char = '\u{c}';

#[must_use]
pub fn render(receipt: &Receipt) -> String {
    let header = &receipt.header;
    let pages = receipt.page_count();
    let mut out = String::new();

    for (index, page) in receipt.pages.iter().enumerate() {
        if index > 0 {
            out.push(PAGE_BREAK);
        }
        let _ = writeln!(out, "{}", header.brand.text());
        let _ = writeln!(out, "{}", header.title);
        let _ = writeln!(out, "Pour: {}", header.pour_id);
        let _ = writeln!(out, "Date: {}", header.date_label());
        if pages > 1 {
            let _ = writeln!(out, "Page {} of {pages}", page.number);
        }
        let _ = writeln!(out, "{}", "=".repeat(WIDTH));

        for line in &page.lines {
            write_line(&mut out, line);
        }
    }

    let _ = writeln!(out, "{}", "-".repeat(WIDTH));
    for line in &receipt.summary {
        write_line(&mut out, line);
    }
    out
}

fn write_line(out: &mut String, line: &ReceiptLine) {
    let label = match line.kind {
        LineKind::Consumable => format!("  {}", line.label),
        _ => line.label.clone(),
    };
    let _ = writeln!(
        out,
        "{label:<lw$}{amount:>aw$}",
        amount = line.amount,
        lw = LABEL_WIDTH,
        aw = AMOUNT_WIDTH,
    );
}
