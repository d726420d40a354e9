//! The admin / order-detail invoice as a renderable surface, laid out in CSS
//! pixels on an A4-wide page. The image-embed path captures this surface.

use crate::pipeline::orchestrator::CAPTURE_TARGET;
use folio_render_core::wrap_text;
use folio_surface::{NodeSpec, RenderableDocument, TextAlign, TextRun};
use folio_types::{format_zar, shipping_label, Color, InvoiceData, PageFormat, Rect, SellerProfile};

const PAD: f32 = 40.0;
const DARK: Color = Color::rgb(0x1a, 0x1a, 0x1a);
const TEXT: Color = Color::rgb(0x22, 0x22, 0x22);
const MUTED: Color = Color::rgb(0x66, 0x66, 0x66);
const RULE: Color = Color::rgb(0xdd, 0xdd, 0xdd);
const STRIPE: Color = Color::rgb(0xf5, 0xf5, 0xf5);

const COLUMNS: [(&str, f32, TextAlign); 6] = [
    ("Item", 230.0, TextAlign::Left),
    ("SKU", 110.0, TextAlign::Left),
    ("Size", 70.0, TextAlign::Left),
    ("Qty", 55.0, TextAlign::Right),
    ("Unit Price", 120.0, TextAlign::Right),
    ("Total", 129.0, TextAlign::Right),
];
const HEADER_HEIGHT: f32 = 28.0;
const ROW_HEIGHT: f32 = 26.0;

/// Accumulates absolutely placed nodes top to bottom.
struct Layout {
    width: f32,
    y: f32,
    nodes: Vec<NodeSpec>,
}

impl Layout {
    fn text(&mut self, x: f32, y: f32, width: f32, run: TextRun) {
        let height = run.font_size * 1.3;
        self.nodes.push(NodeSpec::text(Rect::new(x, y, width, height), run));
    }

    fn line(&mut self, content: &str, size: f32, color: Color) {
        let (x, y, w) = (PAD, self.y, self.width - 2.0 * PAD);
        self.text(x, y, w, TextRun::new(content, size).colored(color));
        self.y += size * 1.45;
    }

    fn heading(&mut self, content: &str) {
        let (x, y, w) = (PAD, self.y, self.width - 2.0 * PAD);
        self.text(x, y, w, TextRun::new(content, 13.0).bold().colored(TEXT));
        self.y += 22.0;
    }

    fn rule(&mut self, x: f32, width: f32, y: f32) {
        self.nodes
            .push(NodeSpec::rule(Rect::new(x, y, width, 1.0), RULE, 1.0));
    }

    /// `label  value` pair with the value flush against the right padding.
    fn key_value(&mut self, x: f32, y: f32, label: &str, value: &str, size: f32, bold: bool) {
        let right = self.width - PAD;
        let label_run = TextRun::new(label, size).bold().colored(if bold { TEXT } else { MUTED });
        self.text(x, y, 120.0, label_run);
        let mut value_run = TextRun::new(value, size)
            .colored(TEXT)
            .aligned(TextAlign::Right);
        if bold {
            value_run = value_run.bold();
        }
        self.text(x + 120.0, y, right - x - 120.0, value_run);
    }
}

fn header(layout: &mut Layout, invoice: &InvoiceData, seller: &SellerProfile) {
    let width = layout.width;
    layout.text(PAD, PAD, 300.0, TextRun::new("INVOICE", 30.0).bold().colored(DARK));
    layout.text(
        width - PAD - 300.0,
        PAD + 10.0,
        300.0,
        TextRun::new(invoice.order_ref.as_str(), 16.0)
            .bold()
            .colored(MUTED)
            .aligned(TextAlign::Right),
    );

    let top = 110.0;
    layout.y = top;
    let mut seller_lines = seller.address_lines.clone();
    seller_lines.push(seller.registration_line());
    seller_lines.push(seller.contact_line());
    layout.text(PAD, top, 380.0, TextRun::new(&seller.company_name, 15.0).bold().colored(TEXT));
    let mut y = top + 24.0;
    for line in seller_lines.iter().filter(|l| !l.is_empty()) {
        layout.text(PAD, y, 380.0, TextRun::new(line, 12.0).colored(MUTED));
        y += 17.0;
    }

    let meta_x = width - PAD - 280.0;
    let meta = [
        ("Invoice No:", invoice.order_ref.to_string()),
        ("Date:", invoice.invoice_date_label()),
        ("Due Date:", invoice.due_date_label()),
        ("Payment:", invoice.payment.method.clone()),
        ("Status:", invoice.payment.status.clone()),
    ];
    let mut meta_y = top;
    for (label, value) in &meta {
        layout.key_value(meta_x, meta_y, label, value, 12.0, false);
        meta_y += 18.0;
    }

    layout.y = y.max(meta_y) + 12.0;
    let rule_y = layout.y;
    layout.rule(PAD, width - 2.0 * PAD, rule_y);
    layout.y += 20.0;
}

fn bill_to(layout: &mut Layout, invoice: &InvoiceData) {
    layout.heading("BILL TO");
    let mut lines = vec![invoice.customer.full_name()];
    lines.extend(invoice.shipping_address.lines());
    lines.push(invoice.customer.email.clone());
    if let Some(phone) = &invoice.customer.phone {
        lines.push(phone.clone());
    }
    for line in lines.iter().filter(|l| !l.is_empty()) {
        layout.line(line, 12.0, TEXT);
    }
    layout.y += 16.0;
}

fn cell(layout: &mut Layout, x: f32, y: f32, width: f32, height: f32, content: &str, align: TextAlign, header: bool) {
    let size = 12.0;
    let mut run = TextRun::new(content, size).aligned(align);
    run = if header {
        run.bold().colored(Color::WHITE)
    } else {
        run.colored(TEXT)
    };
    let text_y = y + (height - size * 1.3) / 2.0;
    layout.text(x + 8.0, text_y, width - 16.0, run);
}

fn items_table(layout: &mut Layout, invoice: &InvoiceData) {
    let table_width: f32 = COLUMNS.iter().map(|(_, w, _)| w).sum();
    let header = NodeSpec::block(Rect::new(PAD, layout.y, table_width, HEADER_HEIGHT)).with_background(DARK);
    layout.nodes.push(header);
    let mut x = PAD;
    let y = layout.y;
    for (title, width, align) in COLUMNS {
        cell(layout, x, y, width, HEADER_HEIGHT, title, align, true);
        x += width;
    }
    layout.y += HEADER_HEIGHT;

    for (index, item) in invoice.items.iter().enumerate() {
        let y = layout.y;
        if index % 2 == 1 {
            layout
                .nodes
                .push(NodeSpec::block(Rect::new(PAD, y, table_width, ROW_HEIGHT)).with_background(STRIPE));
        }
        let values = [
            item.name.clone(),
            item.sku_or_empty().to_string(),
            item.size_or_empty().to_string(),
            item.quantity.to_string(),
            format_zar(item.unit_price),
            format_zar(item.line_total()),
        ];
        let mut x = PAD;
        for ((_, width, align), value) in COLUMNS.iter().zip(values.iter()) {
            cell(layout, x, y, *width, ROW_HEIGHT, value, *align, false);
            x += width;
        }
        layout.rule(PAD, table_width, y + ROW_HEIGHT - 1.0);
        layout.y += ROW_HEIGHT;
    }
    layout.y += 20.0;
}

fn totals(layout: &mut Layout, invoice: &InvoiceData) {
    let x = layout.width - PAD - 280.0;
    let rows = [
        ("Subtotal:", format_zar(invoice.subtotal())),
        ("Shipping:", shipping_label(invoice.shipping_fee)),
    ];
    for (label, value) in &rows {
        let y = layout.y;
        layout.key_value(x, y, label, value, 13.0, false);
        layout.y += 20.0;
    }
    let rule_y = layout.y + 2.0;
    layout.rule(x, 280.0, rule_y);
    layout.y += 10.0;
    let y = layout.y;
    layout.key_value(x, y, "Total:", &format_zar(invoice.total), 15.0, true);
    layout.y += 40.0;
}

fn banking(layout: &mut Layout, invoice: &InvoiceData, seller: &SellerProfile) {
    layout.heading("BANKING DETAILS");
    let bank = &seller.bank;
    for line in [
        format!("Account Holder: {}", bank.account_holder),
        format!("Bank: {}", bank.bank_name),
        format!("Account Type: {}", bank.account_type),
        format!("Account Number: {}", bank.account_number),
        format!("Branch Code: {}", bank.branch_code),
        format!("Payment Reference: {}", invoice.payment_reference()),
    ] {
        layout.line(&line, 12.0, TEXT);
    }
    layout.y += 16.0;
}

/// Builds the invoice surface. The returned document is detached; attach it
/// once it is mounted.
pub fn invoice_document(invoice: &InvoiceData, seller: &SellerProfile) -> RenderableDocument {
    let invoice = invoice.sanitized();
    let width = PageFormat::A4.width_css_px();
    let mut layout = Layout {
        width,
        y: PAD,
        nodes: Vec::new(),
    };

    header(&mut layout, &invoice, seller);
    bill_to(&mut layout, &invoice);
    items_table(&mut layout, &invoice);
    totals(&mut layout, &invoice);
    banking(&mut layout, &invoice, seller);
    for line in wrap_text(&seller.closing_note, 12.0, false, width - 2.0 * PAD) {
        layout.line(&line, 12.0, MUTED);
    }

    let height = layout.y + PAD;
    let root = NodeSpec::block(Rect::new(0.0, 0.0, width, height))
        .named(CAPTURE_TARGET)
        .with_background(Color::WHITE)
        .with_children(layout.nodes);
    RenderableDocument::from_spec(root)
}
