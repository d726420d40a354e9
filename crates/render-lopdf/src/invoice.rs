//! Native-text invoice assembly. Everything is drawn as PDF text and fills
//! with the standard Helvetica faces, so no rasterization is involved.

use crate::canvas::{BOLD_FONT, PageCanvas, REGULAR_FONT};
use crate::flow::PageFlow;
use crate::table::{draw_table, Column, TableStyle};
use crate::writer::StreamingPdfWriter;
use folio_render_core::metrics::wrap_text;
use folio_render_core::utils::helvetica_font_name;
use folio_render_core::{PdfBytes, RenderError};
use folio_types::{format_zar, shipping_label, Color, InvoiceData, PageFormat, SellerProfile};
use lopdf::{dictionary, Dictionary, Object};
use log::debug;
use std::io::Cursor;

const MARGIN: f32 = 40.0;
const TEXT: Color = Color::rgb(0x22, 0x22, 0x22);
const MUTED: Color = Color::rgb(0x66, 0x66, 0x66);
const RULE: Color = Color::rgb(0xdd, 0xdd, 0xdd);

fn font_resources() -> Dictionary {
    let font = |bold: bool| {
        Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => helvetica_font_name(bold),
            "Encoding" => "WinAnsiEncoding",
        })
    };
    dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => font(false),
            BOLD_FONT => font(true),
        },
    }
}

fn item_columns() -> [Column; 6] {
    [
        Column::left("Item", 170.0),
        Column::left("SKU", 80.0),
        Column::left("Size", 50.0),
        Column::right("Qty", 40.0),
        Column::right("Unit Price", 85.0),
        Column::right("Total", 90.0),
    ]
}

fn item_rows(invoice: &InvoiceData) -> Vec<Vec<String>> {
    invoice
        .items
        .iter()
        .map(|item| {
            vec![
                item.name.clone(),
                item.sku_or_empty().to_string(),
                item.size_or_empty().to_string(),
                item.quantity.to_string(),
                format_zar(item.unit_price),
                format_zar(item.line_total()),
            ]
        })
        .collect()
}

/// Draws `label: value` pairs right-aligned against the right margin.
fn draw_key_values(flow: &mut PageFlow, top: f32, rows: &[(&str, String)], label_x: f32) -> f32 {
    let right = flow.right();
    let mut y = top;
    for (label, value) in rows {
        let canvas = flow.canvas();
        canvas.text(label_x, y, label, 9.0, true, MUTED);
        canvas.text_right(right, y, value, 9.0, false, TEXT);
        y += 13.0;
    }
    y
}

fn draw_heading(flow: &mut PageFlow, heading: &str) {
    flow.ensure_space(30.0);
    let (x, y) = (flow.left(), flow.y());
    flow.canvas().text(x, y, heading, 10.0, true, TEXT);
    flow.advance(15.0);
}

fn draw_lines(flow: &mut PageFlow, lines: &[String], size: f32, color: Color) {
    for line in lines {
        flow.ensure_space(size + 4.0);
        let (x, y) = (flow.left(), flow.y());
        flow.canvas().text(x, y, line, size, false, color);
        flow.advance(size + 4.0);
    }
}

fn draw_header(flow: &mut PageFlow, invoice: &InvoiceData, seller: &SellerProfile) {
    let left = flow.left();
    let right = flow.right();
    let top = flow.y();

    flow.canvas().text(left, top, "INVOICE", 24.0, true, TEXT);
    flow.canvas()
        .text_right(right, top + 6.0, &invoice.order_ref.to_string(), 12.0, true, MUTED);
    flow.advance(40.0);

    // Seller on the left, order metadata on the right.
    let block_top = flow.y();
    let mut seller_y = block_top;
    flow.canvas()
        .text(left, seller_y, &seller.company_name, 11.0, true, TEXT);
    seller_y += 15.0;
    let mut seller_lines = seller.address_lines.clone();
    seller_lines.push(seller.registration_line());
    seller_lines.push(seller.contact_line());
    for line in seller_lines.iter().filter(|l| !l.is_empty()) {
        flow.canvas().text(left, seller_y, line, 9.0, false, MUTED);
        seller_y += 12.0;
    }

    let meta = [
        ("Invoice No:", invoice.order_ref.to_string()),
        ("Date:", invoice.invoice_date_label()),
        ("Due Date:", invoice.due_date_label()),
        ("Payment:", invoice.payment.method.clone()),
        ("Status:", invoice.payment.status.clone()),
    ];
    let meta_bottom = draw_key_values(flow, block_top, &meta, right - 200.0);

    let bottom = seller_y.max(meta_bottom) + 10.0;
    flow.advance(bottom - flow.y());
    let y = flow.y();
    flow.canvas().hline(left, right, y, 0.75, RULE);
    flow.advance(15.0);
}

fn draw_bill_to(flow: &mut PageFlow, invoice: &InvoiceData) {
    draw_heading(flow, "BILL TO");
    let mut lines = vec![invoice.customer.full_name()];
    lines.extend(invoice.shipping_address.lines());
    if !invoice.customer.email.is_empty() {
        lines.push(invoice.customer.email.clone());
    }
    if let Some(phone) = invoice.customer.phone.as_ref().filter(|p| !p.is_empty()) {
        lines.push(phone.clone());
    }
    lines.retain(|l| !l.is_empty());
    draw_lines(flow, &lines, 9.0, TEXT);
    flow.advance(12.0);
}

fn draw_totals(flow: &mut PageFlow, invoice: &InvoiceData) {
    flow.advance(10.0);
    flow.ensure_space(60.0);
    let right = flow.right();
    let label_x = right - 200.0;
    let top = flow.y();
    let rows = [
        ("Subtotal:", format_zar(invoice.subtotal())),
        ("Shipping:", shipping_label(invoice.shipping_fee)),
    ];
    let y = draw_key_values(flow, top, &rows, label_x);
    flow.canvas().hline(label_x, right, y + 2.0, 0.75, RULE);
    let total_y = y + 8.0;
    flow.canvas().text(label_x, total_y, "Total:", 11.0, true, TEXT);
    flow.canvas()
        .text_right(right, total_y, &format_zar(invoice.total), 11.0, true, TEXT);
    flow.advance(total_y + 30.0 - top);
}

fn draw_banking(flow: &mut PageFlow, invoice: &InvoiceData, seller: &SellerProfile) {
    draw_heading(flow, "BANKING DETAILS");
    let bank = &seller.bank;
    let lines = [
        format!("Account Holder: {}", bank.account_holder),
        format!("Bank: {}", bank.bank_name),
        format!("Account Type: {}", bank.account_type),
        format!("Account Number: {}", bank.account_number),
        format!("Branch Code: {}", bank.branch_code),
        format!("Payment Reference: {}", invoice.payment_reference()),
    ];
    draw_lines(flow, &lines, 9.0, TEXT);
    flow.advance(12.0);
}

fn draw_closing_note(flow: &mut PageFlow, seller: &SellerProfile) {
    let width = flow.content_width();
    let lines = wrap_text(&seller.closing_note, 9.0, false, width);
    draw_lines(flow, &lines, 9.0, MUTED);
}

/// Draws the checkout invoice on as many A4 pages as the item table needs.
pub fn assemble_invoice(invoice: &InvoiceData, seller: &SellerProfile) -> Result<PdfBytes, RenderError> {
    let invoice = invoice.sanitized();
    let page = PageFormat::A4;
    let mut flow = PageFlow::new(page, MARGIN);

    draw_header(&mut flow, &invoice, seller);
    draw_bill_to(&mut flow, &invoice);
    let breaks = draw_table(&mut flow, &item_columns(), &item_rows(&invoice), &TableStyle::default());
    draw_totals(&mut flow, &invoice);
    draw_banking(&mut flow, &invoice, seller);
    draw_closing_note(&mut flow, seller);

    let mut writer = StreamingPdfWriter::new(Cursor::new(Vec::new()), "1.7", font_resources())?;
    writer.set_title(&format!("Invoice {}", invoice.order_ref));
    let pages: Vec<PageCanvas> = flow.into_pages();
    for canvas in pages {
        let content_id = writer.buffer_content_stream(canvas.into_content())?;
        writer.add_page(content_id, page.width_pt(), page.height_pt());
    }
    let page_count = writer.page_count();
    let bytes = writer.finish()?.into_inner();

    debug!(
        "[ASSEMBLE] Order {}: drew {} items on {} page(s) ({} table breaks), {} bytes",
        invoice.order_ref,
        invoice.items.len(),
        page_count,
        breaks,
        bytes.len()
    );
    Ok(PdfBytes::new(bytes))
}
