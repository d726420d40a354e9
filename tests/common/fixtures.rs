use chrono::{TimeZone, Utc};
use folio::types::{Address, Customer, InvoiceData, LineItem, OrderRef, PaymentInfo};

pub fn customer() -> Customer {
    Customer {
        first_name: "Thandi".into(),
        last_name: "Mokoena".into(),
        email: "thandi@example.com".into(),
        phone: Some("+27 82 555 0101".into()),
    }
}

pub fn address() -> Address {
    Address {
        line1: "22 Jacaranda Avenue".into(),
        line2: None,
        city: "Pretoria".into(),
        province: "Gauteng".into(),
        postal_code: "0181".into(),
        country: "South Africa".into(),
    }
}

pub fn item(name: &str, quantity: u32, unit_price: f64) -> LineItem {
    LineItem {
        name: name.into(),
        sku: Some(format!("SKU-{}", name.len())),
        size: Some("7".into()),
        quantity,
        unit_price,
    }
}

/// An order dated 1 March 2024 with the given totals.
pub fn invoice_with(total: f64, shipping_fee: f64, items: Vec<LineItem>) -> InvoiceData {
    InvoiceData {
        order_ref: OrderRef::new("ORD-1042"),
        created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
        customer: customer(),
        shipping_address: address(),
        items,
        total,
        shipping_fee,
        payment: PaymentInfo {
            method: "EFT".into(),
            status: "Awaiting payment".into(),
        },
    }
}

/// One loafer at R 1,200.00 plus R 150.00 shipping.
pub fn paid_shipping_invoice() -> InvoiceData {
    invoice_with(1350.0, 150.0, vec![item("Leather Loafer", 1, 1200.0)])
}

/// Two sneakers at R 600.00 each with free shipping.
pub fn free_shipping_invoice() -> InvoiceData {
    invoice_with(1200.0, 0.0, vec![item("Canvas Sneaker", 2, 600.0)])
}

/// Enough line items to spill the item table onto further pages.
pub fn long_invoice(items: usize) -> InvoiceData {
    let lines = (0..items)
        .map(|i| item(&format!("Ankle Boot {i}"), 1, 450.0))
        .collect();
    invoice_with(450.0 * items as f64, 0.0, lines)
}

pub fn invoice_json() -> &'static str {
    r#"{
        "orderRef": "ORD-2001",
        "createdAt": "2024-03-01T10:00:00Z",
        "customer": { "firstName": "Sipho", "lastName": "Dlamini", "email": "sipho@example.com" },
        "shippingAddress": { "line1": "5 Long Street", "city": "Cape Town", "postalCode": "8001" },
        "items": [ { "name": "Suede Mule", "quantity": 1, "unitPrice": 899.0 } ],
        "total": 899.0,
        "shippingFee": null
    }"#
}
