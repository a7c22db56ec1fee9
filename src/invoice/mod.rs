pub mod barcode;
pub mod pdf;

pub use pdf::{render_pdf, write_invoice, InvoiceDocument, InvoiceLine, RenderError};

/// Format an amount in integer minor units as rupiah, e.g. 1050000 ->
/// "Rp1.050.000".
pub fn format_rupiah(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        let remaining = digits.len() - i;
        if i > 0 && remaining % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if negative {
        format!("-Rp{}", grouped)
    } else {
        format!("Rp{}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah_grouping() {
        assert_eq!(format_rupiah(0), "Rp0");
        assert_eq!(format_rupiah(500), "Rp500");
        assert_eq!(format_rupiah(50_000), "Rp50.000");
        assert_eq!(format_rupiah(1_050_000), "Rp1.050.000");
        assert_eq!(format_rupiah(-25_000), "-Rp25.000");
    }
}
