//! The invoice as a hand-built PDF, plus a last-resort variant that only
//! carries the order reference and total.

use crate::builder::{RawPdf, RawPdfBuilder};
use crate::content::TextStream;
use crate::error::RawPdfError;
use crate::object::{ObjRef, PdfDict, PdfValue};
use folio_types::{format_zar, shipping_label, InvoiceData, PageFormat, SellerProfile};
use log::{debug, error, warn};

const MARGIN: f32 = 50.0;

fn font(builder: &mut RawPdfBuilder, base: &str, encoded: bool) -> ObjRef {
    let mut dict = PdfDict::new()
        .with("Type", PdfValue::name("Font"))
        .with("Subtype", PdfValue::name("Type1"))
        .with("BaseFont", PdfValue::name(base));
    if encoded {
        dict.insert("Encoding", PdfValue::name("WinAnsiEncoding"));
    }
    builder.add(dict)
}

/// Catalog, page tree and a single page showing `content`.
fn single_page(
    version: &str,
    fonts: &[(&str, &str)],
    encoded: bool,
    content: TextStream,
) -> Result<RawPdf, RawPdfError> {
    let page_format = PageFormat::A4;
    let mut builder = RawPdfBuilder::new(version);
    let catalog = builder.reserve();
    let pages = builder.reserve();

    let mut font_dict = PdfDict::new();
    for (resource, base) in fonts {
        let id = font(&mut builder, base, encoded);
        font_dict.insert(resource, id);
    }
    let contents = builder.add_stream(PdfDict::new(), content.finish());
    let page = builder.add(
        PdfDict::new()
            .with("Type", PdfValue::name("Page"))
            .with("Parent", pages)
            .with(
                "MediaBox",
                vec![
                    0_i64.into(),
                    0_i64.into(),
                    page_format.width_pt().into(),
                    page_format.height_pt().into(),
                ],
            )
            .with("Resources", PdfDict::new().with("Font", font_dict))
            .with("Contents", contents),
    );
    builder.define(
        pages,
        PdfDict::new()
            .with("Type", PdfValue::name("Pages"))
            .with("Kids", vec![page.into()])
            .with("Count", 1_i64),
    )?;
    builder.define(
        catalog,
        PdfDict::new()
            .with("Type", PdfValue::name("Catalog"))
            .with("Pages", pages),
    )?;
    builder.set_root(catalog);
    builder.build()
}

/// The full minimal invoice: PDF 1.4, regular and bold Helvetica.
pub fn minimal_invoice_pdf(invoice: &InvoiceData, seller: &SellerProfile) -> Result<RawPdf, RawPdfError> {
    let invoice = invoice.sanitized();
    let page_height = PageFormat::A4.height_pt();
    let right_column = 330.0;
    let mut s = TextStream::new(page_height);

    s.text("F2", 16.0, MARGIN, 60.0, &seller.company_name);
    let mut y = 78.0;
    for line in &seller.address_lines {
        s.text("F1", 9.0, MARGIN, y, line);
        y += 12.0;
    }

    s.text("F2", 22.0, MARGIN, 150.0, "INVOICE");
    s.text("F1", 10.0, MARGIN, 168.0, &format!("Reference: {}", invoice.order_ref));
    s.rule(MARGIN, PageFormat::A4.width_pt() - MARGIN, 180.0, 0.5);

    s.text("F2", 11.0, MARGIN, 205.0, "Bill To");
    let mut bill_to = vec![invoice.customer.full_name()];
    bill_to.extend(invoice.shipping_address.lines());
    bill_to.push(invoice.customer.email.clone());
    let mut y = 221.0;
    for line in bill_to.iter().filter(|l| !l.is_empty()) {
        s.text("F1", 10.0, MARGIN, y, line);
        y += 14.0;
    }

    s.text("F2", 10.0, right_column, 205.0, "Invoice Date:");
    s.text("F1", 10.0, right_column + 90.0, 205.0, &invoice.invoice_date_label());
    s.text("F2", 10.0, right_column, 221.0, "Due Date:");
    s.text("F1", 10.0, right_column + 90.0, 221.0, &invoice.due_date_label());

    let totals_top = y.max(260.0) + 20.0;
    let rows = [
        ("Subtotal:", format_zar(invoice.subtotal()), "F1"),
        ("Shipping:", shipping_label(invoice.shipping_fee), "F1"),
        ("Total:", format_zar(invoice.total), "F2"),
    ];
    let mut y = totals_top;
    for (label, value, font) in rows {
        s.text(font, 11.0, right_column, y, label);
        s.text(font, 11.0, right_column + 90.0, y, &value);
        y += 16.0;
    }

    let bank = &seller.bank;
    let mut y = y + 30.0;
    s.text("F2", 11.0, MARGIN, y, "Payment by EFT");
    y += 16.0;
    for line in [
        format!("Bank: {} ({})", bank.bank_name, bank.account_type),
        format!("Account Holder: {}", bank.account_holder),
        format!("Account Number: {}   Branch Code: {}", bank.account_number, bank.branch_code),
        format!("Reference: {}", invoice.payment_reference()),
    ] {
        s.text("F1", 10.0, MARGIN, y, &line);
        y += 14.0;
    }

    let footer = page_height - 50.0;
    s.rule(MARGIN, PageFormat::A4.width_pt() - MARGIN, footer - 14.0, 0.5);
    s.text("F1", 8.0, MARGIN, footer, &seller.registration_line());
    s.text("F1", 8.0, MARGIN, footer + 11.0, &seller.contact_line());

    single_page("1.4", &[("F1", "Helvetica"), ("F2", "Helvetica-Bold")], true, s)
}

/// PDF 1.0 with one font and one block of text.
pub fn fallback_invoice_pdf(invoice: &InvoiceData) -> Result<RawPdf, RawPdfError> {
    let total = if invoice.total.is_finite() && invoice.total >= 0.0 {
        invoice.total
    } else {
        0.0
    };
    let mut s = TextStream::new(PageFormat::A4.height_pt());
    s.text("F1", 14.0, MARGIN, 80.0, &format!("Invoice {}", invoice.order_ref));
    s.text("F1", 12.0, MARGIN, 100.0, &format!("Total: {}", format_zar(total)));
    single_page("1.0", &[("F1", "Helvetica")], false, s)
}

fn with_fallback<P, F>(order: &str, primary: P, fallback: F) -> Result<RawPdf, RawPdfError>
where
    P: FnOnce() -> Result<RawPdf, RawPdfError>,
    F: FnOnce() -> Result<RawPdf, RawPdfError>,
{
    match primary() {
        Ok(pdf) => Ok(pdf),
        Err(primary_error) => {
            warn!(
                "[RAW-PDF] Order {}: minimal invoice failed ({}), using reference-and-total fallback.",
                order, primary_error
            );
            fallback().map_err(|e| {
                error!("[RAW-PDF] Order {}: fallback PDF failed: {}", order, e);
                RawPdfError::Fatal(e.to_string())
            })
        }
    }
}

/// Builds the invoice without any PDF library and returns it base64 encoded.
///
/// Falls back to [`fallback_invoice_pdf`] if the full document cannot be
/// built; only a failure of that fallback is returned as [`RawPdfError::Fatal`].
pub fn build_minimal_pdf(invoice: &InvoiceData, seller: &SellerProfile) -> Result<String, RawPdfError> {
    let order = invoice.order_ref.to_string();
    let pdf = with_fallback(
        &order,
        || minimal_invoice_pdf(invoice, seller),
        || fallback_invoice_pdf(invoice),
    )?;
    debug!("[RAW-PDF] Order {}: {} bytes", order, pdf.as_bytes().len());
    Ok(pdf.to_base64())
}
