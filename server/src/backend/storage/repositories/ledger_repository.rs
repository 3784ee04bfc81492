//! Balance-changing writes.
//!
//! A redemption or top-up touches two collections: the ledger record and the
//! student's balance. Both writes run inside one SQLite transaction, and the balance
//! change is a single conditional `UPDATE`, so concurrent kiosks and parents cannot
//! lose updates or drive a balance below zero.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};

use super::{format_date, format_timestamp, row_to_student};
use crate::backend::domain::models::{daily_log::DailyLog, transaction::Transaction};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::events::{Record, RecordEvent};
use crate::backend::storage::traits::{BalanceChange, Connection, LedgerStorage};

/// Repository for ledger writes spanning `students`, `transactions` and `daily_logs`
#[derive(Clone)]
pub struct LedgerRepository {
    db: DbConnection,
}

impl LedgerRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStorage for LedgerRepository {
    async fn redeem_meal(&self, log: &DailyLog) -> Result<Option<BalanceChange<DailyLog>>> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE students
            SET balance = balance - 1, updated_at = ?
            WHERE id = ? AND balance > 0
            RETURNING id, name, pin, balance, allergies, parent_id, created_at, updated_at
            "#,
        )
        .bind(format_timestamp(&Utc::now()))
        .bind(&log.student_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            warn!("Redemption rejected for student {}: no balance", log.student_id);
            return Ok(None);
        };
        let student = row_to_student(&row)?;

        sqlx::query(
            r#"
            INSERT INTO daily_logs (id, student_id, date, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.student_id)
        .bind(format_date(log.date))
        .bind(log.status.as_str())
        .bind(format_timestamp(&log.created_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            "Redeemed meal for student {} (remaining balance {})",
            student.id, student.balance
        );

        let mut record = log.clone();
        record.student_name = Some(student.name.clone());

        let events = self.db.events();
        events.publish(RecordEvent::created(Record::DailyLog(record.clone())));
        events.publish(RecordEvent::updated(Record::Student(student.clone())));

        Ok(Some(BalanceChange { record, student }))
    }

    async fn apply_top_up(&self, transaction: &Transaction) -> Result<Option<BalanceChange<Transaction>>> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE students
            SET balance = balance + ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, pin, balance, allergies, parent_id, created_at, updated_at
            "#,
        )
        .bind(transaction.amount)
        .bind(format_timestamp(&Utc::now()))
        .bind(&transaction.student_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            warn!("Top-up rejected: student {} not found", transaction.student_id);
            return Ok(None);
        };
        let student = row_to_student(&row)?;

        sqlx::query(
            r#"
            INSERT INTO transactions (id, parent_id, student_id, amount, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.parent_id)
        .bind(&transaction.student_id)
        .bind(transaction.amount)
        .bind(format_timestamp(&transaction.date))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            "Applied top-up {} of {} meals to student {} (balance {})",
            transaction.id, transaction.amount, student.id, student.balance
        );

        let events = self.db.events();
        events.publish(RecordEvent::created(Record::Transaction(transaction.clone())));
        events.publish(RecordEvent::updated(Record::Student(student.clone())));

        Ok(Some(BalanceChange {
            record: transaction.clone(),
            student,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::events::{Collection, RecordAction};
    use crate::backend::storage::repositories::test_utils::{create_parent, create_student};
    use crate::backend::storage::repositories::{DailyLogRepository, StudentRepository, TransactionRepository};
    use crate::backend::storage::traits::{DailyLogStorage, StudentStorage, TransactionStorage};

    async fn setup_test() -> (DbConnection, LedgerRepository, String) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let parent = create_parent(&db, "dana@example.com").await;
        (db.clone(), LedgerRepository::new(db), parent.id)
    }

    fn top_up(parent_id: &str, student_id: &str, amount: i64) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Transaction::generate_id(now.timestamp_millis()),
            parent_id: parent_id.to_string(),
            student_id: student_id.to_string(),
            amount,
            date: now,
        }
    }

    #[tokio::test]
    async fn test_redeem_meal_decrements_and_logs() {
        let (db, ledger, parent_id) = setup_test().await;
        let noa = create_student(&db, &parent_id, "Noa", "1234", 5).await;

        let log = DailyLog::eaten(&noa.id, Utc::now());
        let change = ledger
            .redeem_meal(&log)
            .await
            .expect("Failed to redeem")
            .expect("Redemption rejected");

        assert_eq!(change.student.balance, 4);
        assert_eq!(change.record.student_name.as_deref(), Some("Noa"));

        let logs = DailyLogRepository::new(db.clone())
            .list_for_student(&noa.id, 10)
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, log.id);
    }

    #[tokio::test]
    async fn test_redeem_meal_at_zero_balance_writes_nothing() {
        let (db, ledger, parent_id) = setup_test().await;
        let noa = create_student(&db, &parent_id, "Noa", "1234", 0).await;

        let result = ledger
            .redeem_meal(&DailyLog::eaten(&noa.id, Utc::now()))
            .await
            .expect("Failed to redeem");
        assert!(result.is_none());

        let reloaded = StudentRepository::new(db.clone()).get_student(&noa.id).await.unwrap().unwrap();
        assert_eq!(reloaded.balance, 0);
        let logs = DailyLogRepository::new(db).list_for_student(&noa.id, 10).await.unwrap();
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_redemptions_never_overdraw() {
        let (db, ledger, parent_id) = setup_test().await;
        let noa = create_student(&db, &parent_id, "Noa", "1234", 3).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            let student_id = noa.id.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .redeem_meal(&DailyLog::eaten(&student_id, Utc::now()))
                    .await
                    .expect("Failed to redeem")
                    .is_some()
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 3);
        let reloaded = StudentRepository::new(db.clone()).get_student(&noa.id).await.unwrap().unwrap();
        assert_eq!(reloaded.balance, 0);
        let logs = DailyLogRepository::new(db).list_for_student(&noa.id, 50).await.unwrap();
        assert_eq!(logs.len(), 3);
    }

    #[tokio::test]
    async fn test_apply_top_up_increments_and_records() {
        let (db, ledger, parent_id) = setup_test().await;
        let noa = create_student(&db, &parent_id, "Noa", "1234", 4).await;

        let change = ledger
            .apply_top_up(&top_up(&parent_id, &noa.id, 30))
            .await
            .expect("Failed to top up")
            .expect("Top-up rejected");
        assert_eq!(change.student.balance, 34);

        let transactions = TransactionRepository::new(db).list_for_student(&noa.id).await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 30);
    }

    #[tokio::test]
    async fn test_concurrent_top_ups_are_not_lost() {
        let (db, ledger, parent_id) = setup_test().await;
        let noa = create_student(&db, &parent_id, "Noa", "1234", 0).await;

        let mut handles = Vec::new();
        for amount in [10, 30, 150, 1, 9] {
            let ledger = ledger.clone();
            let transaction = top_up(&parent_id, &noa.id, amount);
            handles.push(tokio::spawn(async move { ledger.apply_top_up(&transaction).await }));
        }
        for handle in handles {
            handle.await.unwrap().expect("Failed to top up").expect("Top-up rejected");
        }

        let reloaded = StudentRepository::new(db).get_student(&noa.id).await.unwrap().unwrap();
        assert_eq!(reloaded.balance, 200);
    }

    #[tokio::test]
    async fn test_apply_top_up_for_missing_student_writes_nothing() {
        let (db, ledger, parent_id) = setup_test().await;

        let result = ledger
            .apply_top_up(&top_up(&parent_id, "student::missing", 10))
            .await
            .expect("Failed to top up");
        assert!(result.is_none());

        let recent = TransactionRepository::new(db)
            .list_since(Utc::now() - chrono::Duration::days(1))
            .await
            .unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn test_redeem_meal_publishes_expanded_log_event() {
        let (db, ledger, parent_id) = setup_test().await;
        let noa = create_student(&db, &parent_id, "Noa", "1234", 1).await;
        let mut logs = db.events().subscribe(Collection::DailyLogs);

        ledger.redeem_meal(&DailyLog::eaten(&noa.id, Utc::now())).await.unwrap();

        let event = logs.recv().await.expect("Failed to receive event");
        assert_eq!(event.action, RecordAction::Created);
        match event.record {
            Record::DailyLog(log) => assert_eq!(log.student_name.as_deref(), Some("Noa")),
            other => panic!("Unexpected record {:?}", other),
        }
    }
}
