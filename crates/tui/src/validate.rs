//! Pre-network form validation. Failures stay inside the owning form as an
//! inline message; nothing here ever issues a request.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Data non valida (usa AAAA-MM-GG).")]
    BadDate,
    #[error("Non puoi scegliere una data nel futuro.")]
    FutureDate,
    #[error("Importo non valido.")]
    BadAmount,
    #[error("L'importo deve essere maggiore di zero.")]
    NonPositiveAmount,
    #[error("Seleziona una categoria.")]
    MissingCategory,
    #[error("Inserisci almeno una parola chiave.")]
    EmptyKeyword,
}

/// Input form is the query form, `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| ValidationError::BadDate)
}

/// Rejects dates past the client clock's today.
pub fn not_in_future(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date > today {
        return Err(ValidationError::FutureDate);
    }
    Ok(())
}

/// Accepts thousands-dot formatting ("120.000"); must be a positive whole
/// amount.
pub fn parse_amount(input: &str) -> Result<u64, ValidationError> {
    let digits: String = input
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '.' | ' '))
        .collect();
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::BadAmount);
    }
    let amount: u64 = digits.parse().map_err(|_| ValidationError::BadAmount)?;
    if amount == 0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(amount)
}

pub fn category(selected: Option<&str>) -> Result<String, ValidationError> {
    match selected {
        Some(name) if !name.trim().is_empty() => Ok(name.trim().to_string()),
        _ => Err(ValidationError::MissingCategory),
    }
}

pub fn keyword_text(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyKeyword);
    }
    Ok(trimmed.to_string())
}

/// Month number as typed in the month inputs ("3", "03").
pub fn parse_month(input: &str) -> Option<u32> {
    let month: u32 = input.trim().parse().ok()?;
    (1..=12).contains(&month).then_some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn zero_amount_is_rejected_locally() {
        assert_eq!(parse_amount("0"), Err(ValidationError::NonPositiveAmount));
        assert_eq!(parse_amount("000"), Err(ValidationError::NonPositiveAmount));
    }

    #[test]
    fn amount_accepts_thousands_dots() {
        assert_eq!(parse_amount("120.000"), Ok(120_000));
        assert_eq!(parse_amount(" 1.234.567 "), Ok(1_234_567));
        assert_eq!(parse_amount("50"), Ok(50));
    }

    #[test]
    fn amount_rejects_non_numeric_input() {
        assert_eq!(parse_amount(""), Err(ValidationError::BadAmount));
        assert_eq!(parse_amount("12a"), Err(ValidationError::BadAmount));
        assert_eq!(parse_amount("-5"), Err(ValidationError::BadAmount));
    }

    #[test]
    fn future_dates_are_rejected_locally() {
        let today = date(2024, 3, 15);
        assert_eq!(
            not_in_future(date(2024, 3, 16), today),
            Err(ValidationError::FutureDate)
        );
        assert_eq!(not_in_future(today, today), Ok(()));
        assert_eq!(not_in_future(date(2024, 3, 1), today), Ok(()));
    }

    #[test]
    fn date_parsing_uses_the_query_form() {
        assert_eq!(parse_date("2024-03-05"), Ok(date(2024, 3, 5)));
        assert_eq!(parse_date("05/03/2024"), Err(ValidationError::BadDate));
    }

    #[test]
    fn category_must_be_selected() {
        assert_eq!(category(None), Err(ValidationError::MissingCategory));
        assert_eq!(category(Some("  ")), Err(ValidationError::MissingCategory));
        assert_eq!(category(Some("Spesa")), Ok("Spesa".to_string()));
    }

    #[test]
    fn keyword_text_must_be_non_empty() {
        assert_eq!(keyword_text("   "), Err(ValidationError::EmptyKeyword));
        assert_eq!(keyword_text(" bar "), Ok("bar".to_string()));
    }

    #[test]
    fn month_parsing_bounds_the_range() {
        assert_eq!(parse_month("3"), Some(3));
        assert_eq!(parse_month("03"), Some(3));
        assert_eq!(parse_month("12"), Some(12));
        assert_eq!(parse_month("0"), None);
        assert_eq!(parse_month("13"), None);
        assert_eq!(parse_month("marzo"), None);
    }
}
