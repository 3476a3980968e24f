//! PDF receipt on A4, built with `printpdf`.
//!
//! Each [`ReceiptPage`] starts a new sheet with the full header; the summary
//! follows the last page. A page holding more rows than fit on one sheet
//! continues on the next one under the same page number.
//!
//! Document id and dates are derived from the receipt, so the same receipt
//! always produces the same bytes.

use std::io::{BufWriter, Cursor};

use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, CustomPdfConformance, Image, ImageTransform, IndirectFontRef, Line, Mm,
    PdfConformance, PdfDocument, PdfDocumentReference, PdfLayerReference, Point,
    image_crate::codecs::{jpeg::JpegDecoder, png::PngDecoder},
};
use time::OffsetDateTime;

use super::{BrandMark, LineKind, Receipt, ReceiptFormat, ReceiptLine, ReceiptPage};
use crate::{EngineError, ResultEngine};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LAYER: &str = "Layer 1";

const LEFT: f32 = 15.0;
const RIGHT: f32 = 195.0;
const INDENT: f32 = 20.0;
const AMOUNT_X: f32 = 160.0;
const PAGE_LABEL_X: f32 = 160.0;
const TOP: f32 = 282.0;
const BOTTOM: f32 = 20.0;
const ROW_STEP: f32 = 6.0;

const LOGO_MAX_HEIGHT: f32 = 16.0;
const LOGO_MAX_WIDTH: f32 = 60.0;
const LOGO_DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Decoded logo and its placed size in millimetres.
struct Logo {
    image: Image,
    scale: f32,
    height: f32,
}

struct Layout<'a> {
    doc: &'a PdfDocumentReference,
    receipt: &'a Receipt,
    fonts: Fonts,
    logo: Option<Logo>,
    layer: PdfLayerReference,
    y: f32,
}

pub fn render(receipt: &Receipt) -> ResultEngine<Vec<u8>> {
    let id = document_id(receipt);
    let stamp = timestamp(receipt.header.date);

    let (doc, first_page, first_layer) = PdfDocument::new(
        receipt.header.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        LAYER,
    );
    let doc = doc
        .with_conformance(PdfConformance::Custom(CustomPdfConformance {
            requires_icc_profile: false,
            requires_xmp_metadata: false,
            ..CustomPdfConformance::default()
        }))
        .with_document_id(id.clone())
        .with_creation_date(stamp)
        .with_mod_date(stamp)
        .with_metadata_date(stamp);

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(render_error)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(render_error)?,
    };

    let mut layout = Layout {
        doc: &doc,
        receipt,
        fonts,
        logo: logo(&receipt.header.brand),
        layer: doc.get_page(first_page).get_layer(first_layer),
        y: TOP,
    };
    for (index, page) in receipt.pages.iter().enumerate() {
        if index > 0 {
            layout.next_sheet();
        }
        layout.header(page);
        for line in &page.lines {
            layout.ensure_room(page, ROW_STEP);
            layout.row(line);
        }
    }

    if let Some(last) = receipt.pages.last() {
        layout.ensure_room(last, ROW_STEP * (receipt.summary.len() as f32 + 1.0));
    }
    layout.y += ROW_STEP / 2.0;
    layout.divider();
    layout.y -= ROW_STEP;
    for line in &receipt.summary {
        layout.row(line);
    }
    drop(layout);

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer).map_err(render_error)?;
    let bytes = writer.into_inner().map_err(render_error)?;
    Ok(pin_trailer_id(bytes, &id))
}

impl Layout<'_> {
    fn next_sheet(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
    }

    fn ensure_room(&mut self, page: &ReceiptPage, needed: f32) {
        if self.y - needed < BOTTOM {
            self.next_sheet();
            self.header(page);
        }
    }

    fn header(&mut self, page: &ReceiptPage) {
        let header = &self.receipt.header;
        match &self.logo {
            Some(logo) => {
                Image::from(logo.image.image.clone()).add_to_layer(
                    self.layer.clone(),
                    ImageTransform {
                        translate_x: Some(Mm(LEFT)),
                        translate_y: Some(Mm(self.y - logo.height + 4.0)),
                        scale_x: Some(logo.scale),
                        scale_y: Some(logo.scale),
                        dpi: Some(LOGO_DPI),
                        ..ImageTransform::default()
                    },
                );
                self.y -= logo.height + 4.0;
            }
            None => {
                self.text(header.brand.text(), 16.0, LEFT, true);
                self.y -= 10.0;
            }
        }

        self.text(&header.title, 14.0, LEFT, true);
        self.y -= 7.0;
        self.text(&format!("Pour: {}", header.pour_id), 10.0, LEFT, false);
        let pages = self.receipt.page_count();
        if pages > 1 {
            let label = format!("Page {} of {pages}", page.number);
            self.text(&label, 10.0, PAGE_LABEL_X, false);
        }
        self.y -= 5.0;
        self.text(&format!("Date: {}", header.date_label()), 10.0, LEFT, false);
        self.y -= 4.0;
        self.divider();
        self.y -= 8.0;
    }

    fn row(&mut self, line: &ReceiptLine) {
        let bold = matches!(line.kind, LineKind::Subtotal | LineKind::Total);
        let x = match line.kind {
            LineKind::Consumable => INDENT,
            _ => LEFT,
        };
        self.text(&line.label, 10.0, x, bold);
        self.text(&line.amount, 10.0, AMOUNT_X, bold);
        self.y -= ROW_STEP;
    }

    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold {
            &self.fonts.bold
        } else {
            &self.fonts.regular
        };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn divider(&self) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(LEFT), Mm(self.y)), false),
                (Point::new(Mm(RIGHT), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }
}

/// Decodes a PNG or JPEG brand. Anything else falls back to the brand text.
fn logo(brand: &BrandMark) -> Option<Logo> {
    let BrandMark::Image { mime, bytes } = brand else {
        return None;
    };
    let decoded = match *mime {
        "image/png" => PngDecoder::new(Cursor::new(bytes.as_slice()))
            .map_err(|err| err.to_string())
            .and_then(|decoder| Image::try_from(decoder).map_err(|err| err.to_string())),
        "image/jpeg" => JpegDecoder::new(Cursor::new(bytes.as_slice()))
            .map_err(|err| err.to_string())
            .and_then(|decoder| Image::try_from(decoder).map_err(|err| err.to_string())),
        other => Err(format!("{other} cannot be embedded in a PDF")),
    };
    let image = match decoded {
        Ok(image) => image,
        Err(err) => {
            tracing::warn!("brand image not usable in PDF, using text: {err}");
            return None;
        }
    };

    let width = image.image.width.0 as f32 * MM_PER_INCH / LOGO_DPI;
    let height = image.image.height.0 as f32 * MM_PER_INCH / LOGO_DPI;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let scale = (LOGO_MAX_HEIGHT / height).min(LOGO_MAX_WIDTH / width);
    Some(Logo {
        image,
        scale,
        height: height * scale,
    })
}

/// 32 hex characters from the receipt's file name.
fn document_id(receipt: &Receipt) -> String {
    let hex: String = receipt
        .file_name(ReceiptFormat::Pdf)
        .bytes()
        .map(|b| format!("{b:02X}"))
        .collect();
    format!("{hex:0<32}").chars().take(32).collect()
}

/// Midnight UTC of the pour date.
fn timestamp(date: NaiveDate) -> OffsetDateTime {
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().timestamp())
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// The trailer `/ID` pair ends with a per-save instance id; both halves are
/// set to the document id.
fn pin_trailer_id(bytes: Vec<u8>, id: &str) -> Vec<u8> {
    let Some(start) = bytes.windows(3).rposition(|window| window == b"/ID") else {
        return bytes;
    };
    let Some(end) = bytes[start..]
        .iter()
        .position(|&b| b == b']')
        .map(|offset| start + offset + 1)
    else {
        return bytes;
    };

    let mut pinned = Vec::with_capacity(bytes.len());
    pinned.extend_from_slice(&bytes[..start]);
    pinned.extend_from_slice(format!("/ID[({id})({id})]").as_bytes());
    pinned.extend_from_slice(&bytes[end..]);
    pinned
}

fn render_error(err: impl std::fmt::Display) -> EngineError {
    EngineError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::{Area, LineItemInput, Money, PourInput, PourRecord, RenderOptions};

    fn receipt(items: usize, rows_per_page: usize, brand: BrandMark) -> Receipt {
        let pour = PourInput {
            pour_id: Some("P-9".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 6, 2),
            area: Some(Area::from_sqft(250)),
            price_per_sqft: Some(Money::new(6_00)),
            labor_cost: Some(Money::new(400_00)),
            equipment_cost: Some(Money::new(90_00)),
            fuel_cost: Some(Money::new(35_00)),
            repairs_cost: Some(Money::ZERO),
            misc_cost: Some(Money::new(12_00)),
            consumable_items: (0..items)
                .map(|n| LineItemInput {
                    name: Some(format!("Item {n}")),
                    unit_price: Some(Money::new(1_25)),
                    quantity: Some(2),
                })
                .collect(),
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

    fn page_objects(pdf: &[u8]) -> usize {
        pdf.windows(10).filter(|w| w == b"/Type/Page").count()
            + pdf.windows(11).filter(|w| w == b"/Type /Page").count()
    }

    #[test]
    fn renders_a_pdf_document() {
        let pdf = render(&receipt(2, 24, BrandMark::default())).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        assert!(pdf.windows(5).any(|w| w == b"%%EOF"));
    }

    #[test]
    fn same_receipt_same_bytes() {
        let receipt = receipt(3, 4, BrandMark::default());
        assert_eq!(render(&receipt).unwrap(), render(&receipt).unwrap());
    }

    #[test]
    fn one_sheet_per_receipt_page() {
        let single = render(&receipt(3, 24, BrandMark::default())).unwrap();
        let paged = render(&receipt(3, 4, BrandMark::default())).unwrap();
        assert!(paged.len() > single.len());
        assert!(page_objects(&paged) > page_objects(&single));
    }

    #[test]
    fn long_pages_continue_on_another_sheet() {
        let tall = render(&receipt(80, 200, BrandMark::default())).unwrap();
        let short = render(&receipt(2, 200, BrandMark::default())).unwrap();
        assert!(page_objects(&tall) > page_objects(&short));
    }

    #[test]
    fn unreadable_logo_falls_back_to_text() {
        let brand = BrandMark::Image {
            mime: "image/png",
            bytes: b"not a png".to_vec(),
        };
        assert!(logo(&brand).is_none());
        let pdf = render(&receipt(1, 24, brand)).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        let svg = BrandMark::Image {
            mime: "image/svg+xml",
            bytes: b"<svg/>".to_vec(),
        };
        assert!(logo(&svg).is_none());
    }

    #[test]
    fn document_id_is_32_hex_chars() {
        let id = document_id(&receipt(0, 24, BrandMark::default()));
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn trailer_id_is_pinned() {
        let raw = b"xref\ntrailer\n<</ID[(aaaa)(bbbb)]/Size 3>>\nstartxref\n9\n%%EOF".to_vec();
        let pinned = pin_trailer_id(raw, "cafe");
        assert_eq!(
            pinned,
            b"xref\ntrailer\n<</ID[(cafe)(cafe)]/Size 3>>\nstartxref\n9\n%%EOF".to_vec()
        );
    }
}
