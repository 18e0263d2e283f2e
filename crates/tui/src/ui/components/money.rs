use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// Whole-unit amount with dot thousands separators, the way the Gateway's
/// spreadsheet shows them ("1.234.567").
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

/// Signed variant for balances.
pub fn format_signed(amount: i64) -> String {
    if amount < 0 {
        format!("-{}", format_amount(amount.unsigned_abs()))
    } else {
        format_amount(amount as u64)
    }
}

/// Colored span for a balance: green when positive, red when negative.
pub fn styled_balance(amount: i64, theme: &Theme) -> Span<'static> {
    let color = if amount > 0 {
        theme.positive
    } else if amount < 0 {
        theme.negative
    } else {
        theme.text
    };
    Span::styled(format_signed(amount), Style::default().fg(color))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1000), "1.000");
        assert_eq!(format_amount(120000), "120.000");
        assert_eq!(format_amount(1234567), "1.234.567");
    }

    #[test]
    fn signed_amounts_keep_the_sign_outside_the_grouping() {
        assert_eq!(format_signed(-1234567), "-1.234.567");
        assert_eq!(format_signed(500), "500");
        assert_eq!(format_signed(0), "0");
    }
}
