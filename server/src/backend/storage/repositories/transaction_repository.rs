use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{format_timestamp, row_to_transaction};
use crate::backend::domain::models::transaction::Transaction;
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::TransactionStorage;

/// Repository for reading the `transactions` collection.
/// Transactions are only ever written through the ledger.
#[derive(Clone)]
pub struct TransactionRepository {
    db: DbConnection,
}

impl TransactionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionStorage for TransactionRepository {
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, parent_id, student_id, amount, date
            FROM transactions
            WHERE student_id = ?
            ORDER BY date DESC, rowid DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }

    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, parent_id, student_id, amount, date
            FROM transactions
            WHERE date >= ?
            ORDER BY date, rowid
            "#,
        )
        .bind(format_timestamp(&since))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::repositories::test_utils::{create_parent, create_student};
    use crate::backend::storage::repositories::LedgerRepository;
    use crate::backend::storage::traits::LedgerStorage;
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn test_list_since_only_returns_later_transactions() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let parent = create_parent(&db, "dana@example.com").await;
        let noa = create_student(&db, &parent.id, "Noa", "1234", 0).await;
        let ledger = LedgerRepository::new(db.clone());

        let month_start = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        for (amount, date) in [
            (150, month_start - Duration::hours(1)),
            (10, month_start),
            (30, month_start + Duration::days(3)),
        ] {
            let transaction = Transaction {
                id: Transaction::generate_id(date.timestamp_millis()),
                parent_id: parent.id.clone(),
                student_id: noa.id.clone(),
                amount,
                date,
            };
            ledger.apply_top_up(&transaction).await.unwrap().expect("Top-up rejected");
        }

        let repo = TransactionRepository::new(db);
        let since: Vec<i64> = repo
            .list_since(month_start)
            .await
            .unwrap()
            .iter()
            .map(|t| t.amount)
            .collect();
        assert_eq!(since, vec![10, 30]);

        let history = repo.list_for_student(&noa.id).await.unwrap();
        let amounts: Vec<i64> = history.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![30, 10, 150]);
    }
}
