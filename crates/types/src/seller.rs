//! The selling company as it appears on every invoice.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellerProfile {
    pub company_name: String,
    pub address_lines: Vec<String>,
    pub registration_number: String,
    pub vat_number: String,
    pub email: String,
    pub phone: String,
    pub bank: BankDetails,
    pub closing_note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankDetails {
    pub account_holder: String,
    pub bank_name: String,
    pub account_type: String,
    pub account_number: String,
    pub branch_code: String,
}

impl Default for SellerProfile {
    fn default() -> Self {
        Self {
            company_name: "Maison Lerato Footwear (Pty) Ltd".to_string(),
            address_lines: vec![
                "14 Bree Street".to_string(),
                "Cape Town, Western Cape, 8001".to_string(),
                "South Africa".to_string(),
            ],
            registration_number: "2019/482113/07".to_string(),
            vat_number: "4820281734".to_string(),
            email: "orders@maisonlerato.co.za".to_string(),
            phone: "+27 21 555 0134".to_string(),
            bank: BankDetails::default(),
            closing_note: "Thank you for your order. Goods remain the property of the seller until paid in full."
                .to_string(),
        }
    }
}

impl Default for BankDetails {
    fn default() -> Self {
        Self {
            account_holder: "Maison Lerato Footwear (Pty) Ltd".to_string(),
            bank_name: "First National Bank".to_string(),
            account_type: "Business Cheque".to_string(),
            account_number: "62849301755".to_string(),
            branch_code: "250655".to_string(),
        }
    }
}

impl SellerProfile {
    /// "Reg: ... | VAT: ..." with empty parts left out.
    pub fn registration_line(&self) -> String {
        let mut parts = Vec::new();
        if !self.registration_number.is_empty() {
            parts.push(format!("Reg: {}", self.registration_number));
        }
        if !self.vat_number.is_empty() {
            parts.push(format!("VAT: {}", self.vat_number));
        }
        parts.join(" | ")
    }

    pub fn contact_line(&self) -> String {
        [self.email.as_str(), self.phone.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let seller: SellerProfile =
            serde_json::from_str(r#"{ "companyName": "Test Co", "bank": { "branchCode": "123" } }"#).unwrap();
        assert_eq!(seller.company_name, "Test Co");
        assert_eq!(seller.bank.branch_code, "123");
        assert_eq!(seller.bank.bank_name, BankDetails::default().bank_name);
        assert!(!seller.closing_note.is_empty());
    }

    #[test]
    fn footer_lines_skip_empty_parts() {
        let seller = SellerProfile {
            vat_number: String::new(),
            phone: String::new(),
            ..SellerProfile::default()
        };
        assert_eq!(seller.registration_line(), "Reg: 2019/482113/07");
        assert_eq!(seller.contact_line(), "orders@maisonlerato.co.za");
    }
}
