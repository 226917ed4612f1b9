/// US-dollar formatting with thousands separators, e.g. `$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}

/// Shekel amount as shown in the salary preview.
pub fn format_shekels(amount: f64) -> String {
    format!("₪{:.2}", amount)
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(145.5), "$145.50");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-12.0), "-$12.00");
    }

    #[test]
    fn test_format_shekels() {
        assert_eq!(format_shekels(842.0), "₪842.00");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("noa cohen"), "NC");
        assert_eq!(initials("  Moshe   Ben  David "), "MBD");
        assert_eq!(initials(""), "");
    }
}
