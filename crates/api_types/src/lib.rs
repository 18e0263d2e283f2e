use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod wire {
    //! Serde helpers for the Gateway's spreadsheet-flavored JSON.

    /// Row dates travel as `DD/MM/YYYY` strings (query parameters use
    /// `YYYY-MM-DD` instead, see the client's request builder).
    pub mod date_ddmmyyyy {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer, de};

        const FORMAT: &str = "%d/%m/%Y";

        pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&date.format(FORMAT).to_string())
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = String::deserialize(deserializer)?;
            NaiveDate::parse_from_str(raw.trim(), FORMAT).map_err(de::Error::custom)
        }
    }

    /// Row ids arrive as either JSON strings or numbers depending on how the
    /// sheet column was filled; normalize both to `String`.
    pub mod id {
        use serde::{Deserialize, Deserializer};

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(match Raw::deserialize(deserializer)? {
                Raw::Text(text) => text,
                Raw::Number(number) => number.to_string(),
            })
        }
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    /// One ledger row as served by the Gateway.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Transaction {
        #[serde(deserialize_with = "wire::id::deserialize")]
        pub id: String,
        #[serde(with = "wire::date_ddmmyyyy")]
        pub date: NaiveDate,
        pub amount: u64,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub category: String,
        pub content: String,
        #[serde(default)]
        pub note: Option<String>,
    }

    /// Fields common to add/update writes.
    ///
    /// `month` is derived from `date` in the constructor because the Gateway
    /// partitions its storage by month; callers cannot set it independently.
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionPayload {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: String,
        amount: u64,
        #[serde(rename = "type")]
        kind: TransactionKind,
        category: String,
        note: String,
        #[serde(with = "wire::date_ddmmyyyy")]
        date: NaiveDate,
        month: String,
        sheet_id: String,
    }

    impl TransactionPayload {
        pub fn new(
            id: Option<String>,
            date: NaiveDate,
            amount: u64,
            kind: TransactionKind,
            category: String,
            content: String,
            note: String,
            sheet_id: String,
        ) -> Self {
            Self {
                id,
                content,
                amount,
                kind,
                category,
                note,
                month: date.format("%m").to_string(),
                date,
                sheet_id,
            }
        }
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionDelete {
        id: String,
        month: String,
        sheet_id: String,
    }

    impl TransactionDelete {
        pub fn new(id: String, date: NaiveDate, sheet_id: String) -> Self {
            Self {
                id,
                month: date.format("%m").to_string(),
                sheet_id,
            }
        }
    }
}

pub mod keyword {
    use super::*;

    /// A category with its comma-joined auto-classification terms.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct KeywordEntry {
        pub category: String,
        pub keywords: String,
    }

    impl KeywordEntry {
        /// Individual terms, trimmed, in sheet order.
        pub fn terms(&self) -> Vec<&str> {
            self.keywords
                .split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .collect()
        }

        /// Case-insensitive membership test, used by the soft delete guard.
        pub fn contains_term(&self, term: &str) -> bool {
            let needle = term.trim().to_lowercase();
            self.terms()
                .iter()
                .any(|candidate| candidate.to_lowercase() == needle)
        }
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct KeywordAdd {
        pub category: String,
        pub keywords: String,
        pub sheet_id: String,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct KeywordDelete {
        pub category: String,
        pub keyword: String,
        pub sheet_id: String,
    }
}

pub mod stats {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
    pub struct FinancialSummary {
        #[serde(default)]
        pub income: i64,
        #[serde(default)]
        pub expense: i64,
    }

    impl FinancialSummary {
        pub fn balance(&self) -> i64 {
            self.income - self.expense
        }
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ChartSlice {
        pub category: String,
        pub amount: u64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ChartData {
        pub chart_data: Vec<ChartSlice>,
        pub categories: Vec<String>,
    }

    /// Income/expense totals of one month of the requested year.
    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct MonthlySummary {
        pub month: u32,
        #[serde(default)]
        pub income: i64,
        #[serde(default)]
        pub expense: i64,
    }
}

pub mod search {
    use super::*;
    use crate::transaction::Transaction;

    /// Server-paged search result. Missing counters default the way the
    /// Gateway's older deployments omit them.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SearchResponse {
        #[serde(default)]
        pub transactions: Vec<Transaction>,
        #[serde(default)]
        pub total_transactions: u64,
        #[serde(default = "default_page")]
        pub total_pages: u32,
        #[serde(default = "default_page")]
        pub current_page: u32,
    }

    fn default_page() -> u32 {
        1
    }
}

/// Write actions accepted by the Gateway, discriminated by the `action`
/// field of the POST body.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum GatewayWrite {
    AddTransaction(transaction::TransactionPayload),
    UpdateTransaction(transaction::TransactionPayload),
    DeleteTransaction(transaction::TransactionDelete),
    AddKeyword(keyword::KeywordAdd),
    DeleteKeyword(keyword::KeywordDelete),
}

#[cfg(test)]
mod tests {
    use super::keyword::KeywordEntry;
    use super::transaction::{Transaction, TransactionKind, TransactionPayload};
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn transaction_parses_wire_date_and_numeric_id() {
        let raw = r#"{
            "id": 42,
            "date": "05/03/2024",
            "amount": 120000,
            "type": "Expense",
            "category": "Food",
            "content": "lunch"
        }"#;
        let tx: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.id, "42");
        assert_eq!(tx.date, date(2024, 3, 5));
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.note, None);
    }

    #[test]
    fn transaction_accepts_string_id() {
        let raw = r#"{
            "id": "tx-9",
            "date": "31/12/2023",
            "amount": 1,
            "type": "Income",
            "category": "Salary",
            "content": "bonus",
            "note": "year end"
        }"#;
        let tx: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.id, "tx-9");
        assert_eq!(tx.note.as_deref(), Some("year end"));
    }

    #[test]
    fn add_write_carries_action_tag_and_derived_month() {
        let payload = TransactionPayload::new(
            None,
            date(2024, 3, 15),
            50000,
            TransactionKind::Income,
            "Salary".to_string(),
            "advance".to_string(),
            String::new(),
            "sheet-1".to_string(),
        );
        let value = serde_json::to_value(GatewayWrite::AddTransaction(payload)).unwrap();
        assert_eq!(value["action"], "addTransaction");
        assert_eq!(value["month"], "03");
        assert_eq!(value["date"], "15/03/2024");
        assert_eq!(value["sheetId"], "sheet-1");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn delete_write_derives_month_from_date() {
        let del = transaction::TransactionDelete::new(
            "7".to_string(),
            date(2024, 11, 2),
            "sheet-1".to_string(),
        );
        let value = serde_json::to_value(GatewayWrite::DeleteTransaction(del)).unwrap();
        assert_eq!(value["action"], "deleteTransaction");
        assert_eq!(value["month"], "11");
        assert_eq!(value["id"], "7");
    }

    #[test]
    fn keyword_terms_are_trimmed_and_matched_case_insensitively() {
        let entry = KeywordEntry {
            category: "Food".to_string(),
            keywords: "pizza, Bar , coffee".to_string(),
        };
        assert_eq!(entry.terms(), vec!["pizza", "Bar", "coffee"]);
        assert!(entry.contains_term("bar"));
        assert!(entry.contains_term(" COFFEE "));
        assert!(!entry.contains_term("tea"));
    }

    #[test]
    fn search_response_defaults_missing_counters() {
        let raw = r#"{ "transactions": [] }"#;
        let res: search::SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(res.total_transactions, 0);
        assert_eq!(res.total_pages, 1);
        assert_eq!(res.current_page, 1);
    }
}
