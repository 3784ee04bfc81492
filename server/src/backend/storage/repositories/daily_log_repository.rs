use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;

use super::{format_date, row_to_daily_log};
use crate::backend::domain::models::daily_log::DailyLog;
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::DailyLogStorage;

/// Repository for reading the `daily_logs` collection.
/// Logs are only ever written through the ledger.
#[derive(Clone)]
pub struct DailyLogRepository {
    db: DbConnection,
}

impl DailyLogRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DailyLogStorage for DailyLogRepository {
    async fn list_for_date(&self, date: NaiveDate, limit: u32) -> Result<Vec<DailyLog>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.student_id, s.name AS student_name, l.date, l.status, l.created_at
            FROM daily_logs l
            LEFT JOIN students s ON s.id = l.student_id
            WHERE l.date = ?
            ORDER BY l.created_at DESC, l.rowid DESC
            LIMIT ?
            "#,
        )
        .bind(format_date(date))
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_daily_log).collect()
    }

    async fn list_for_student(&self, student_id: &str, limit: u32) -> Result<Vec<DailyLog>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.student_id, s.name AS student_name, l.date, l.status, l.created_at
            FROM daily_logs l
            LEFT JOIN students s ON s.id = l.student_id
            WHERE l.student_id = ?
            ORDER BY l.created_at DESC, l.rowid DESC
            LIMIT ?
            "#,
        )
        .bind(student_id)
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_daily_log).collect()
    }

    async fn list_ids_for_date(&self, date: NaiveDate) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT id FROM daily_logs WHERE date = ?")
            .bind(format_date(date))
            .fetch_all(self.db.pool())
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("id").map_err(anyhow::Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::repositories::test_utils::{create_parent, create_student};
    use crate::backend::storage::repositories::LedgerRepository;
    use crate::backend::storage::traits::LedgerStorage;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_list_for_date_expands_names_newest_first() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let parent = create_parent(&db, "dana@example.com").await;
        let noa = create_student(&db, &parent.id, "Noa", "1234", 5).await;
        let omer = create_student(&db, &parent.id, "Omer", "5678", 5).await;
        let ledger = LedgerRepository::new(db.clone());
        let repo = DailyLogRepository::new(db.clone());

        let morning = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let yesterday = morning - Duration::days(1);

        ledger.redeem_meal(&DailyLog::eaten(&noa.id, yesterday)).await.unwrap();
        ledger.redeem_meal(&DailyLog::eaten(&noa.id, morning)).await.unwrap();
        ledger
            .redeem_meal(&DailyLog::eaten(&omer.id, morning + Duration::minutes(5)))
            .await
            .unwrap();

        let today = repo.list_for_date(morning.date_naive(), 50).await.expect("Failed to list");
        let names: Vec<Option<&str>> = today.iter().map(|l| l.student_name.as_deref()).collect();
        assert_eq!(names, vec![Some("Omer"), Some("Noa")]);

        assert_eq!(repo.list_ids_for_date(morning.date_naive()).await.unwrap().len(), 2);
        assert_eq!(repo.list_ids_for_date(yesterday.date_naive()).await.unwrap().len(), 1);

        let limited = repo.list_for_date(morning.date_naive(), 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].student_id, omer.id);
    }

    #[tokio::test]
    async fn test_list_for_student_is_scoped() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let parent = create_parent(&db, "dana@example.com").await;
        let noa = create_student(&db, &parent.id, "Noa", "1234", 5).await;
        let omer = create_student(&db, &parent.id, "Omer", "5678", 5).await;
        let ledger = LedgerRepository::new(db.clone());

        ledger.redeem_meal(&DailyLog::eaten(&noa.id, Utc::now())).await.unwrap();
        ledger.redeem_meal(&DailyLog::eaten(&omer.id, Utc::now())).await.unwrap();

        let logs = DailyLogRepository::new(db).list_for_student(&noa.id, 30).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].student_id, noa.id);
    }
}
