pub const CURRENCY_SYMBOL: &str = "€";

const NO_BREAK_SPACE: char = '\u{a0}';

/// Whole euros in Dutch notation: `€ 1.432`, `€ -250`. Non-finite amounts
/// render as zero.
pub fn format_currency(amount: f64) -> String {
    let rounded = if amount.is_finite() { amount.round() } else { 0.0 };
    let digits = group_thousands(rounded.abs() as u64);
    if rounded < 0.0 {
        format!("{CURRENCY_SYMBOL}{NO_BREAK_SPACE}-{digits}")
    } else {
        format!("{CURRENCY_SYMBOL}{NO_BREAK_SPACE}{digits}")
    }
}

/// Percentage with one decimal and a Dutch decimal comma: `58,3%`.
pub fn format_percent(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.1}%").replace('.', ",")
}

fn group_thousands(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_euros_with_dot_grouping() {
        assert_eq!(format_currency(0.0), "€\u{a0}0");
        assert_eq!(format_currency(999.4), "€\u{a0}999");
        assert_eq!(format_currency(1432.25), "€\u{a0}1.432");
        assert_eq!(format_currency(300_000.0), "€\u{a0}300.000");
        assert_eq!(format_currency(1_234_567.5), "€\u{a0}1.234.568");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(format_currency(2.5), "€\u{a0}3");
        assert_eq!(format_currency(-2.5), "€\u{a0}-3");
    }

    #[test]
    fn negative_zero_and_non_finite_render_as_zero() {
        assert_eq!(format_currency(-0.3), "€\u{a0}0");
        assert_eq!(format_currency(f64::NAN), "€\u{a0}0");
        assert_eq!(format_currency(f64::INFINITY), "€\u{a0}0");
    }

    #[test]
    fn percent_uses_decimal_comma() {
        assert_eq!(format_percent(58.333), "58,3%");
        assert_eq!(format_percent(100.0), "100,0%");
    }
}
