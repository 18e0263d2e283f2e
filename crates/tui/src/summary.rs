use api_types::transaction::{Transaction, TransactionKind};

/// Income/expense/balance of one fetched result set, computed client-side
/// for the daily and monthly views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: i64,
    pub expense: i64,
}

impl Totals {
    pub fn balance(&self) -> i64 {
        self.income - self.expense
    }
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut acc = Totals::default();
    for tx in transactions {
        match tx.kind {
            TransactionKind::Income => acc.income += tx.amount as i64,
            TransactionKind::Expense => acc.expense += tx.amount as i64,
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(amount: u64, kind: TransactionKind) -> Transaction {
        Transaction {
            id: "1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            amount,
            kind,
            category: "Varie".to_string(),
            content: String::new(),
            note: None,
        }
    }

    #[test]
    fn totals_split_by_kind() {
        let txs = vec![
            tx(1000, TransactionKind::Income),
            tx(300, TransactionKind::Expense),
            tx(200, TransactionKind::Expense),
        ];
        let totals = totals(&txs);
        assert_eq!(totals.income, 1000);
        assert_eq!(totals.expense, 500);
        assert_eq!(totals.balance(), 500);
    }

    #[test]
    fn empty_set_has_zero_totals() {
        assert_eq!(totals(&[]), Totals::default());
    }
}
