//! The add/edit transaction form and its validation gate.

use api_types::{
    GatewayWrite,
    transaction::{Transaction, TransactionKind, TransactionPayload},
};
use chrono::NaiveDate;

use crate::validate::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Amount,
    Kind,
    Category,
    Content,
    Note,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            Self::Date => Self::Amount,
            Self::Amount => Self::Kind,
            Self::Kind => Self::Category,
            Self::Category => Self::Content,
            Self::Content => Self::Note,
            Self::Note => Self::Date,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "Data",
            Self::Amount => "Importo",
            Self::Kind => "Tipo",
            Self::Category => "Categoria",
            Self::Content => "Contenuto",
            Self::Note => "Nota",
        }
    }
}

#[derive(Debug)]
pub struct TransactionForm {
    /// Id of the row being edited; `None` for a new transaction.
    pub editing_id: Option<String>,
    pub date_input: String,
    pub amount_input: String,
    pub kind: TransactionKind,
    pub categories: Vec<String>,
    pub category_index: usize,
    pub content: String,
    pub note: String,
    pub focus: FormField,
    pub error: Option<String>,
    pub submitting: bool,
}

/// A validated form, ready for the wire.
#[derive(Debug)]
pub struct ParsedForm {
    pub write: GatewayWrite,
    pub date: NaiveDate,
}

impl TransactionForm {
    pub fn add(today: NaiveDate, categories: Vec<String>) -> Self {
        Self {
            editing_id: None,
            date_input: today.format("%Y-%m-%d").to_string(),
            amount_input: String::new(),
            kind: TransactionKind::Income,
            categories,
            category_index: 0,
            content: String::new(),
            note: String::new(),
            focus: FormField::Date,
            error: None,
            submitting: false,
        }
    }

    pub fn edit(tx: &Transaction, categories: Vec<String>) -> Self {
        let category_index = categories
            .iter()
            .position(|category| *category == tx.category)
            .unwrap_or(0);
        Self {
            editing_id: Some(tx.id.clone()),
            date_input: tx.date.format("%Y-%m-%d").to_string(),
            amount_input: tx.amount.to_string(),
            kind: tx.kind,
            categories,
            category_index,
            content: tx.content.clone(),
            note: tx.note.clone().unwrap_or_default(),
            focus: FormField::Date,
            error: None,
            submitting: false,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn cycle_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// The free-text input under the cursor, if the focused field is one.
    pub fn focused_input_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Date => Some(&mut self.date_input),
            FormField::Amount => Some(&mut self.amount_input),
            FormField::Content => Some(&mut self.content),
            FormField::Note => Some(&mut self.note),
            FormField::Kind | FormField::Category => None,
        }
    }

    pub fn toggle_kind(&mut self) {
        self.kind = match self.kind {
            TransactionKind::Income => TransactionKind::Expense,
            TransactionKind::Expense => TransactionKind::Income,
        };
    }

    pub fn select_category(&mut self, delta: i64) {
        if self.categories.is_empty() {
            return;
        }
        let len = self.categories.len() as i64;
        let next = (self.category_index as i64 + delta).rem_euclid(len);
        self.category_index = next as usize;
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.categories.get(self.category_index).map(String::as_str)
    }

    /// The validation gate: no request is built, let alone sent, unless
    /// every local check passes.
    pub fn parse(&self, today: NaiveDate, sheet_id: &str) -> Result<ParsedForm, ValidationError> {
        let date = validate::parse_date(&self.date_input)?;
        validate::not_in_future(date, today)?;
        let amount = validate::parse_amount(&self.amount_input)?;
        let category = validate::category(self.selected_category())?;

        let payload = TransactionPayload::new(
            self.editing_id.clone(),
            date,
            amount,
            self.kind,
            category,
            self.content.trim().to_string(),
            self.note.trim().to_string(),
            sheet_id.to_string(),
        );
        let write = if self.is_edit() {
            GatewayWrite::UpdateTransaction(payload)
        } else {
            GatewayWrite::AddTransaction(payload)
        };
        Ok(ParsedForm { write, date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn form() -> TransactionForm {
        let mut form = TransactionForm::add(today(), vec!["Spesa".to_string()]);
        form.amount_input = "120.000".to_string();
        form.content = "pranzo".to_string();
        form
    }

    #[test]
    fn valid_form_builds_an_add_write() {
        let parsed = form().parse(today(), "sheet-1").unwrap();
        assert_eq!(parsed.date, today());
        let value = serde_json::to_value(&parsed.write).unwrap();
        assert_eq!(value["action"], "addTransaction");
        assert_eq!(value["amount"], 120_000);
    }

    #[test]
    fn zero_amount_is_stopped_before_any_request_is_built() {
        let mut form = form();
        form.amount_input = "0".to_string();
        assert_eq!(
            form.parse(today(), "sheet-1").unwrap_err(),
            ValidationError::NonPositiveAmount
        );
    }

    #[test]
    fn future_date_is_stopped_before_any_request_is_built() {
        let mut form = form();
        form.date_input = "2024-03-16".to_string();
        assert_eq!(
            form.parse(today(), "sheet-1").unwrap_err(),
            ValidationError::FutureDate
        );
    }

    #[test]
    fn missing_category_fails_validation() {
        let mut form = form();
        form.categories.clear();
        assert_eq!(
            form.parse(today(), "sheet-1").unwrap_err(),
            ValidationError::MissingCategory
        );
    }

    #[test]
    fn editing_builds_an_update_write_with_the_row_id() {
        let mut form = form();
        form.editing_id = Some("42".to_string());
        let parsed = form.parse(today(), "sheet-1").unwrap();
        let value = serde_json::to_value(&parsed.write).unwrap();
        assert_eq!(value["action"], "updateTransaction");
        assert_eq!(value["id"], "42");
    }

    #[test]
    fn category_selection_wraps_in_both_directions() {
        let mut form = TransactionForm::add(
            today(),
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
        );
        form.select_category(-1);
        assert_eq!(form.selected_category(), Some("C"));
        form.select_category(1);
        form.select_category(1);
        assert_eq!(form.selected_category(), Some("B"));
    }
}
