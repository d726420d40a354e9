//! The single currency display rule shared by every rendering surface.

/// Literal shown instead of an amount when no shipping fee applies.
pub const FREE_SHIPPING_LABEL: &str = "Free";

const TOLERANCE: f64 = 0.005;

/// Formats an amount as South African Rand with two decimals and comma
/// grouping, e.g. `R 1,350.00`. Negative amounts render as `-R 5.00`.
pub fn format_zar(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u64;
    let negative = amount < 0.0 && cents > 0;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R {grouped}.{fraction:02}")
}

/// Shipping cell text: `Free` when the fee is exactly zero, otherwise the
/// formatted amount.
pub fn shipping_label(fee: f64) -> String {
    if fee == 0.0 {
        FREE_SHIPPING_LABEL.to_string()
    } else {
        format_zar(fee)
    }
}

/// Compares two monetary values within half a cent.
pub fn amounts_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE
}
