//! Formatting utilities for amounts and quantities
//!
//! Centralizes number display so every table and confirmation line renders
//! amounts the same way: thousands separated by commas, decimal point, and
//! the owning profile's display precision.

use rust_decimal::Decimal;

/// Format a decimal with thousands separators and a fixed number of
/// decimal places.
///
/// # Examples
/// ```
/// use costbook::utils::format_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount(dec!(1234.5), 2), "1,234.50");
/// assert_eq!(format_amount(dec!(-500), 0), "-500");
/// ```
pub fn format_amount(value: Decimal, precision: u32) -> String {
    let is_negative = value < Decimal::ZERO;
    let abs_value = value.abs();

    let formatted = format!("{:.*}", precision as usize, abs_value);
    let mut parts = formatted.splitn(2, '.');
    let integer_part = parts.next().unwrap_or("0");
    let decimal_part = parts.next();

    // Group the integer digits in threes from the right
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    match decimal_part {
        Some(frac) => format!("{}{}.{}", sign, with_separators, frac),
        None => format!("{}{}", sign, with_separators),
    }
}

/// Format an amount followed by its currency code: "1,234.50 EUR"
///
/// # Examples
/// ```
/// use costbook::utils::format_money;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_money(dec!(1234.5), "EUR", 2), "1,234.50 EUR");
/// ```
pub fn format_money(value: Decimal, currency: &str, precision: u32) -> String {
    format!("{} {}", format_amount(value, precision), currency)
}
