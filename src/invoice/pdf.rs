//! Invoice PDF rendering.
//!
//! A5-ish single page: header, hostel/tenant identification, line-item
//! table, total, payment link, and a Code 39 barcode of the order id.

use chrono::{DateTime, Utc};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{BuiltinFont, Color, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Rgb};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::invoice::barcode::{self, BarcodeError};
use crate::invoice::format_rupiah;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),
    #[error("Barcode error: {0}")]
    Barcode(#[from] BarcodeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct InvoiceLine {
    pub name: String,
    pub amount: i64,
}

/// Everything the rendered document shows.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub order_id: String,
    pub hostel_name: String,
    pub room_number: String,
    pub tenant_name: String,
    pub due_at: DateTime<Utc>,
    pub lines: Vec<InvoiceLine>,
    pub total: i64,
    pub payment_url: String,
}

const PAGE_WIDTH_MM: f32 = 148.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 14.0;

pub fn render_pdf(invoice: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Invoice {}", invoice.order_id),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    layer.use_text("INVOICE", 18.0, Mm(MARGIN_MM), Mm(y), &font_bold);
    y -= 8.0;
    layer.use_text(&invoice.order_id, 9.0, Mm(MARGIN_MM), Mm(y), &font);
    y -= 12.0;

    layer.use_text(
        format!("{} - Room {}", invoice.hostel_name, invoice.room_number),
        11.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font_bold,
    );
    y -= 6.0;
    layer.use_text(
        format!("Billed to: {}", invoice.tenant_name),
        10.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );
    y -= 6.0;
    layer.use_text(
        format!("Due: {}", invoice.due_at.format("%Y-%m-%d")),
        10.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );
    y -= 12.0;

    for line in &invoice.lines {
        layer.use_text(&line.name, 10.0, Mm(MARGIN_MM), Mm(y), &font);
        layer.use_text(
            format_rupiah(line.amount),
            10.0,
            Mm(PAGE_WIDTH_MM - MARGIN_MM - 36.0),
            Mm(y),
            &font,
        );
        y -= 6.0;
    }

    y -= 4.0;
    layer.use_text("Total", 11.0, Mm(MARGIN_MM), Mm(y), &font_bold);
    layer.use_text(
        format_rupiah(invoice.total),
        11.0,
        Mm(PAGE_WIDTH_MM - MARGIN_MM - 36.0),
        Mm(y),
        &font_bold,
    );
    y -= 12.0;

    layer.use_text(
        format!("Pay online: {}", invoice.payment_url),
        8.0,
        Mm(MARGIN_MM),
        Mm(y),
        &font,
    );

    draw_barcode(&layer, &invoice.order_id, MARGIN_MM, 24.0, 16.0)?;
    layer.use_text(&invoice.order_id, 7.0, Mm(MARGIN_MM), Mm(18.0), &font);

    Ok(doc.save_to_bytes()?)
}

/// Render the invoice and write it to `<dir>/<order_id>.pdf`.
pub fn write_invoice(dir: &Path, invoice: &InvoiceDocument) -> Result<PathBuf, RenderError> {
    let bytes = render_pdf(invoice)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.pdf", invoice.order_id));
    fs::write(&path, bytes)?;
    Ok(path)
}

fn draw_barcode(
    layer: &PdfLayerReference,
    text: &str,
    x_mm: f32,
    y_mm: f32,
    height_mm: f32,
) -> Result<(), RenderError> {
    let modules = barcode::encode(text)?;

    // Scale the narrow-bar unit so the code fits inside the margins.
    let available = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let unit = (available / barcode::total_units(&modules) as f32).min(0.5);

    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    let mut x = x_mm;
    for module in modules {
        let width = f32::from(module.width) * unit;
        if module.is_bar {
            let rect = Polygon {
                rings: vec![vec![
                    (Point::new(Mm(x), Mm(y_mm)), false),
                    (Point::new(Mm(x + width), Mm(y_mm)), false),
                    (Point::new(Mm(x + width), Mm(y_mm + height_mm)), false),
                    (Point::new(Mm(x), Mm(y_mm + height_mm)), false),
                ]],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            };
            layer.add_polygon(rect);
        }
        x += width;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_invoice() -> InvoiceDocument {
        InvoiceDocument {
            order_id: "INV-0A1B2C-1700000000".to_string(),
            hostel_name: "Pondok Melati".to_string(),
            room_number: "A-12".to_string(),
            tenant_name: "Siti Rahma".to_string(),
            due_at: Utc::now() + Duration::days(1),
            lines: vec![
                InvoiceLine {
                    name: "Monthly rent".to_string(),
                    amount: 1_000_000,
                },
                InvoiceLine {
                    name: "Laundry".to_string(),
                    amount: 50_000,
                },
            ],
            total: 1_050_000,
            payment_url: "https://pay.example/abc".to_string(),
        }
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = render_pdf(&sample_invoice()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_render_rejects_unencodable_order_id() {
        let mut invoice = sample_invoice();
        invoice.order_id = "INV_ÖRDER".to_string();
        assert!(matches!(
            render_pdf(&invoice),
            Err(RenderError::Barcode(_))
        ));
    }
}
