/// Format an amount with two decimals and comma-grouped thousands,
/// e.g. `format_amount("₦", 1234.5)` -> `"₦1,234.50"`.
pub fn format_amount(symbol: &str, amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_decimals() {
        assert_eq!(format_amount("₦", 42.5), "₦42.50");
        assert_eq!(format_amount("₦", 0.0), "₦0.00");
        assert_eq!(format_amount("$", 7.005), "$7.00");
    }

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(format_amount("₦", 1234.5), "₦1,234.50");
        assert_eq!(format_amount("₦", 999.999), "₦1,000.00");
        assert_eq!(format_amount("₦", 1234567.891), "₦1,234,567.89");
        assert_eq!(format_amount("₦", 100000.0), "₦100,000.00");
    }

    #[test]
    fn test_negative() {
        assert_eq!(format_amount("₦", -3.2), "-₦3.20");
        assert_eq!(format_amount("₦", -0.001), "₦0.00");
    }
}
