//! The read-only order record every PDF path renders from.
//!
//! Records arrive from the order store with optional fields missing; every
//! absent value falls back to an empty string or zero instead of failing.

use crate::ids::OrderRef;
use crate::money::{format_zar, shipping_label};
use chrono::{DateTime, Days, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// Days between the order date and the payment due date.
pub const PAYMENT_TERMS_DAYS: u64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceData {
    pub order_ref: OrderRef,
    pub created_at: Option<DateTime<Utc>>,
    pub customer: Customer,
    pub shipping_address: Address,
    pub items: Vec<LineItem>,
    #[serde(deserialize_with = "lenient_amount")]
    pub total: f64,
    #[serde(deserialize_with = "lenient_amount")]
    pub shipping_fee: f64,
    pub payment: PaymentInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub name: String,
    pub sku: Option<String>,
    pub size: Option<String>,
    pub quantity: u32,
    #[serde(deserialize_with = "lenient_amount")]
    pub unit_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentInfo {
    pub method: String,
    pub status: String,
}

/// Accepts a number, `null` or a missing field; the latter two become zero.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn sanitize_amount(value: f64, field: &str, order_ref: &OrderRef) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!(
            "[INVOICE] Order {}: monetary field '{}' is {}, substituting 0.",
            order_ref, field, value
        );
        0.0
    }
}

impl InvoiceData {
    /// Returns a copy whose monetary fields are all finite and non-negative.
    pub fn sanitized(&self) -> InvoiceData {
        let mut clean = self.clone();
        clean.total = sanitize_amount(self.total, "total", &self.order_ref);
        clean.shipping_fee = sanitize_amount(self.shipping_fee, "shippingFee", &self.order_ref);
        for item in &mut clean.items {
            item.unit_price = sanitize_amount(item.unit_price, "unitPrice", &self.order_ref);
        }
        clean
    }

    /// `total - shipping_fee`, the subtotal every surface displays.
    pub fn subtotal(&self) -> f64 {
        self.total - self.shipping_fee
    }

    pub fn invoice_date(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or_else(Utc::now)
    }

    /// Order date plus the payment terms. `None` only when the date would
    /// overflow the calendar.
    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.invoice_date()
            .checked_add_days(Days::new(PAYMENT_TERMS_DAYS))
    }

    /// Order date as printed on invoices, e.g. `01 March 2024`.
    pub fn invoice_date_label(&self) -> String {
        format_date(&self.invoice_date())
    }

    pub fn due_date_label(&self) -> String {
        self.due_date().map(|d| format_date(&d)).unwrap_or_default()
    }

    /// Bank transfer reference: order identifier followed by the surname.
    pub fn payment_reference(&self) -> String {
        let surname = self.customer.last_name.trim();
        if surname.is_empty() {
            self.order_ref.to_string()
        } else {
            format!("{}-{}", self.order_ref, surname.to_uppercase())
        }
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d %B %Y").to_string()
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

impl Address {
    /// Non-empty address lines in display order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for line in [Some(&self.line1), self.line2.as_ref()].into_iter().flatten() {
            if !line.trim().is_empty() {
                lines.push(line.trim().to_string());
            }
        }
        let locality = [self.city.trim(), self.province.trim(), self.postal_code.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if !locality.is_empty() {
            lines.push(locality);
        }
        if !self.country.trim().is_empty() {
            lines.push(self.country.trim().to_string());
        }
        lines
    }
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }

    pub fn sku_or_empty(&self) -> &str {
        self.sku.as_deref().unwrap_or("")
    }

    pub fn size_or_empty(&self) -> &str {
        self.size.as_deref().unwrap_or("")
    }
}

/// The totals block as the storefront order summary shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl OrderSummary {
    pub fn from_invoice(invoice: &InvoiceData) -> Self {
        let invoice = invoice.sanitized();
        Self {
            subtotal: format_zar(invoice.subtotal()),
            shipping: shipping_label(invoice.shipping_fee),
            total: format_zar(invoice.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::amounts_match;
    use chrono::TimeZone;

    fn invoice(total: f64, shipping_fee: f64) -> InvoiceData {
        InvoiceData {
            order_ref: OrderRef::new("ORD-1042"),
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
            customer: Customer {
                first_name: "Thandi".into(),
                last_name: "Mokoena".into(),
                ..Default::default()
            },
            total,
            shipping_fee,
            ..Default::default()
        }
    }

    #[test]
    fn summary_with_paid_shipping() {
        let summary = OrderSummary::from_invoice(&invoice(1350.0, 150.0));
        assert_eq!(summary.subtotal, "R 1,200.00");
        assert_eq!(summary.shipping, "R 150.00");
        assert_eq!(summary.total, "R 1,350.00");
    }

    #[test]
    fn summary_with_free_shipping() {
        let summary = OrderSummary::from_invoice(&invoice(1200.0, 0.0));
        assert_eq!(summary.shipping, "Free");
        assert_eq!(summary.subtotal, "R 1,200.00");
    }

    #[test]
    fn subtotal_is_total_minus_shipping() {
        let data = invoice(1350.0, 150.0);
        assert!(amounts_match(data.subtotal() + data.shipping_fee, data.total));
    }

    #[test]
    fn missing_and_null_fields_default() {
        let json = r#"{
            "orderRef": "ORD-7",
            "total": null,
            "items": [{ "name": "Loafer", "quantity": 2, "unitPrice": 450.5 }]
        }"#;
        let data: InvoiceData = serde_json::from_str(json).unwrap();
        assert_eq!(data.total, 0.0);
        assert_eq!(data.shipping_fee, 0.0);
        assert_eq!(data.items[0].sku_or_empty(), "");
        assert!(amounts_match(data.items[0].line_total(), 901.0));
        assert!(data.shipping_address.line2.is_none());
    }

    #[test]
    fn sanitizes_invalid_amounts() {
        let mut data = invoice(f64::INFINITY, -10.0);
        data.items.push(LineItem {
            unit_price: f64::NAN,
            quantity: 1,
            ..Default::default()
        });
        let clean = data.sanitized();
        assert_eq!(clean.total, 0.0);
        assert_eq!(clean.shipping_fee, 0.0);
        assert_eq!(clean.items[0].unit_price, 0.0);
    }

    #[test]
    fn due_date_is_seven_days_later() {
        let data = invoice(0.0, 0.0);
        let due = data.due_date().unwrap();
        assert_eq!(due.format("%Y-%m-%d").to_string(), "2024-03-08");
        assert_eq!(data.invoice_date_label(), "01 March 2024");
        assert_eq!(data.due_date_label(), "08 March 2024");
    }

    #[test]
    fn payment_reference_uses_surname() {
        assert_eq!(invoice(0.0, 0.0).payment_reference(), "ORD-1042-MOKOENA");
        let mut anonymous = invoice(0.0, 0.0);
        anonymous.customer.last_name.clear();
        assert_eq!(anonymous.payment_reference(), "ORD-1042");
    }

    #[test]
    fn address_lines_skip_blanks() {
        let address = Address {
            line1: "12 Long Street".into(),
            line2: Some("  ".into()),
            city: "Cape Town".into(),
            province: "Western Cape".into(),
            postal_code: "8001".into(),
            country: "South Africa".into(),
        };
        assert_eq!(
            address.lines(),
            vec![
                "12 Long Street".to_string(),
                "Cape Town, Western Cape, 8001".to_string(),
                "South Africa".to_string()
            ]
        );
    }
}
