pub const CURRENCY: &str = "GHS";

/// `1250000.0` -> `1,250,000`; fractional amounts keep two decimals
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }

    let rounded = (amount * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let abs = rounded.abs();
    let whole = abs.trunc() as u64;
    let cents = ((abs - abs.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if cents == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{cents:02}")
    }
}

pub fn format_price(amount: f64) -> String {
    format!("{CURRENCY} {}", format_amount(amount))
}

/// First `max` characters, with `...` when something was cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_grouped_by_thousands() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(950.0), "950");
        assert_eq!(format_amount(1_250_000.0), "1,250,000");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_price(85_000.0), "GHS 85,000");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 100), "short");
        assert_eq!(truncate("àéîõü", 3), "àéî...");
    }
}
