use std::time::Duration;

use api_types::{
    GatewayWrite,
    keyword::KeywordEntry,
    search::SearchResponse,
    stats::{ChartData, FinancialSummary, MonthlySummary},
    transaction::Transaction,
};
use chrono::NaiveDate;
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    config::AppConfig,
    error::{AppError, Result},
};

/// Single failure kind for everything that can go wrong on the wire:
/// transport errors, non-2xx statuses, and 2xx bodies carrying an `error`
/// field. Callers only ever surface the message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::new("il gateway non ha risposto in tempo");
        }
        Self::new(format!("gateway non raggiungibile: {err}"))
    }
}

/// Search criteria. At least one of content/amount/category must be set
/// before a request is issued (checked by the caller).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub year: i32,
    pub month: Option<u32>,
    pub content: Option<String>,
    pub amount: Option<u64>,
    pub category: Option<String>,
}

impl SearchFilter {
    pub fn has_criteria(&self) -> bool {
        self.content.is_some() || self.amount.is_some() || self.category.is_some()
    }

    /// Deterministic encoding of every parameter that affects the result
    /// set (the page is not part of the key; pages are cached per key).
    pub fn cache_key(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            self.year,
            self.month.map_or_else(|| "all".to_string(), |m| m.to_string()),
            self.content.as_deref().unwrap_or(""),
            self.amount.map_or_else(String::new, |a| a.to_string()),
            self.category.as_deref().unwrap_or(""),
        )
    }
}

/// One Gateway read, with the parameters that action takes. Rendering the
/// query string lives here so encoding is centralized and testable.
#[derive(Debug, Clone)]
pub enum ReadAction {
    TransactionsByDate { date: NaiveDate },
    TransactionsByMonth { month: u32, year: i32 },
    Categories,
    Keywords,
    FinancialSummary { start: NaiveDate, end: NaiveDate },
    ChartData { start: NaiveDate, end: NaiveDate },
    MonthlyData { year: i32 },
    Search { filter: SearchFilter, page: u32, limit: u32 },
}

impl ReadAction {
    fn name(&self) -> &'static str {
        match self {
            Self::TransactionsByDate { .. } => "getTransactionsByDate",
            Self::TransactionsByMonth { .. } => "getTransactionsByMonth",
            Self::Categories => "getCategories",
            Self::Keywords => "getKeywords",
            Self::FinancialSummary { .. } => "getFinancialSummary",
            Self::ChartData { .. } => "getChartData",
            Self::MonthlyData { .. } => "getMonthlyData",
            Self::Search { .. } => "searchTransactions",
        }
    }

    /// Query parameters in a fixed order; dates use the `YYYY-MM-DD` query
    /// form (row payloads use `DD/MM/YYYY`, see `api_types::wire`).
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("action", self.name().to_string())];
        match self {
            Self::TransactionsByDate { date } => {
                params.push(("date", date.format("%Y-%m-%d").to_string()));
            }
            Self::TransactionsByMonth { month, year } => {
                params.push(("month", format!("{month:02}")));
                params.push(("year", year.to_string()));
            }
            Self::Categories | Self::Keywords => {}
            Self::FinancialSummary { start, end } | Self::ChartData { start, end } => {
                params.push(("startDate", start.format("%Y-%m-%d").to_string()));
                params.push(("endDate", end.format("%Y-%m-%d").to_string()));
            }
            Self::MonthlyData { year } => {
                params.push(("year", year.to_string()));
            }
            Self::Search {
                filter,
                page,
                limit,
            } => {
                params.push(("page", page.to_string()));
                params.push(("limit", limit.to_string()));
                if let Some(month) = filter.month {
                    params.push(("month", format!("{month:02}")));
                    params.push(("year", filter.year.to_string()));
                }
                if let Some(content) = &filter.content {
                    params.push(("content", content.clone()));
                }
                if let Some(amount) = filter.amount {
                    params.push(("amount", amount.to_string()));
                }
                if let Some(category) = &filter.category {
                    params.push(("category", category.clone()));
                }
            }
        }
        params
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    api_url: Url,
    relay_url: Url,
    sheet_id: String,
}

impl Client {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|err| AppError::InvalidConfig(format!("invalid api_url: {err}")))?;
        let relay_url = Url::parse(&config.relay_url)
            .map_err(|err| AppError::InvalidConfig(format!("invalid relay_url: {err}")))?;
        // The relay aborts upstream calls after ~5s; this bound only keeps a
        // dead relay from hanging the UI.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            api_url,
            relay_url,
            sheet_id: config.sheet_id.clone(),
        })
    }

    /// Gateway URL for a read, tenant id included.
    fn target_url(&self, action: &ReadAction) -> Url {
        let mut url = self.api_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in action.params() {
                pairs.append_pair(key, &value);
            }
            pairs.append_pair("sheetId", &self.sheet_id);
        }
        url
    }

    /// Wraps any destination into the relay's `?url=` envelope. The relay
    /// forwards method, body and content type unchanged.
    fn relay_wrap(&self, destination: &Url) -> Url {
        let mut url = self.relay_url.clone();
        url.query_pairs_mut()
            .append_pair("url", destination.as_str());
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        action: ReadAction,
    ) -> std::result::Result<T, GatewayError> {
        let target = self.target_url(&action);
        let url = self.relay_wrap(&target);
        tracing::debug!(action = action.name(), "gateway read");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    pub async fn transactions_by_date(
        &self,
        date: NaiveDate,
    ) -> std::result::Result<Vec<Transaction>, GatewayError> {
        self.get_json(ReadAction::TransactionsByDate { date }).await
    }

    pub async fn transactions_by_month(
        &self,
        month: u32,
        year: i32,
    ) -> std::result::Result<Vec<Transaction>, GatewayError> {
        self.get_json(ReadAction::TransactionsByMonth { month, year })
            .await
    }

    pub async fn categories(&self) -> std::result::Result<Vec<String>, GatewayError> {
        self.get_json(ReadAction::Categories).await
    }

    pub async fn keywords(&self) -> std::result::Result<Vec<KeywordEntry>, GatewayError> {
        self.get_json(ReadAction::Keywords).await
    }

    pub async fn financial_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> std::result::Result<FinancialSummary, GatewayError> {
        self.get_json(ReadAction::FinancialSummary { start, end })
            .await
    }

    pub async fn chart_data(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> std::result::Result<ChartData, GatewayError> {
        self.get_json(ReadAction::ChartData { start, end }).await
    }

    pub async fn monthly_data(
        &self,
        year: i32,
    ) -> std::result::Result<Vec<MonthlySummary>, GatewayError> {
        self.get_json(ReadAction::MonthlyData { year }).await
    }

    pub async fn search(
        &self,
        filter: &SearchFilter,
        page: u32,
        limit: u32,
    ) -> std::result::Result<SearchResponse, GatewayError> {
        self.get_json(ReadAction::Search {
            filter: filter.clone(),
            page,
            limit,
        })
        .await
    }

    /// One mutation POST. Never touches any cache; the mutation handlers
    /// invalidate after a confirmed success.
    pub async fn write(&self, payload: &GatewayWrite) -> std::result::Result<(), GatewayError> {
        let url = self.relay_wrap(&self.api_url);
        tracing::debug!("gateway write");
        let response = self.http.post(url).json(payload).send().await?;
        decode::<serde_json::Value>(response).await.map(|_| ())
    }
}

/// Collapses the three failure shapes into `GatewayError` and parses the
/// payload otherwise. A 2xx body with an `error` field is still a failure.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> std::result::Result<T, GatewayError> {
    let status = response.status();
    let text = response.text().await?;
    let value: serde_json::Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(GatewayError::new(format!("HTTP {status}")));
        }
        Err(err) => {
            return Err(GatewayError::new(format!(
                "risposta non valida dal gateway: {err}"
            )));
        }
    };
    if let Some(message) = value.get("error").and_then(serde_json::Value::as_str) {
        tracing::warn!(%message, "gateway reported error");
        return Err(GatewayError::new(message));
    }
    if !status.is_success() {
        return Err(GatewayError::new(format!("HTTP {status}")));
    }
    serde_json::from_value(value)
        .map_err(|err| GatewayError::new(format!("payload inatteso dal gateway: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Client {
        let config = AppConfig {
            api_url: "https://script.example.com/exec".to_string(),
            relay_url: "https://relay.example.com/proxy".to_string(),
            sheet_id: "sheet-1".to_string(),
            ..AppConfig::default()
        };
        Client::new(&config).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_read_uses_query_date_form_and_tenant() {
        let client = test_client();
        let url = client.target_url(&ReadAction::TransactionsByDate {
            date: date(2024, 3, 5),
        });
        assert_eq!(
            url.as_str(),
            "https://script.example.com/exec?action=getTransactionsByDate&date=2024-03-05&sheetId=sheet-1"
        );
    }

    #[test]
    fn relay_wrap_percent_encodes_the_destination() {
        let client = test_client();
        let target = client.target_url(&ReadAction::Categories);
        let url = client.relay_wrap(&target);
        assert!(url.as_str().starts_with("https://relay.example.com/proxy?url="));
        assert!(url.as_str().contains("https%3A%2F%2Fscript.example.com"));
        // The inner query survives the round trip intact.
        let (_, inner) = url.query_pairs().next().unwrap();
        assert_eq!(inner, target.as_str());
    }

    #[test]
    fn search_read_includes_only_set_filters() {
        let client = test_client();
        let filter = SearchFilter {
            year: 2024,
            month: Some(3),
            content: Some("caffè".to_string()),
            amount: None,
            category: None,
        };
        let url = client.target_url(&ReadAction::Search {
            filter,
            page: 2,
            limit: 10,
        });
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("page".to_string(), "2".to_string())));
        assert!(query.contains(&("month".to_string(), "03".to_string())));
        assert!(query.contains(&("year".to_string(), "2024".to_string())));
        assert!(query.contains(&("content".to_string(), "caffè".to_string())));
        assert!(!query.iter().any(|(k, _)| k == "amount"));
        assert!(!query.iter().any(|(k, _)| k == "category"));
    }

    #[test]
    fn search_filter_cache_key_is_deterministic_and_parameter_sensitive() {
        let base = SearchFilter {
            year: 2024,
            month: None,
            content: Some("bar".to_string()),
            amount: None,
            category: None,
        };
        assert_eq!(base.cache_key(), base.clone().cache_key());

        let other = SearchFilter {
            month: Some(2),
            ..base.clone()
        };
        assert_ne!(base.cache_key(), other.cache_key());
    }

    #[test]
    fn search_filter_requires_at_least_one_criterion() {
        let empty = SearchFilter {
            year: 2024,
            ..SearchFilter::default()
        };
        assert!(!empty.has_criteria());
        let with_amount = SearchFilter {
            amount: Some(100),
            ..empty
        };
        assert!(with_amount.has_criteria());
    }
}
