//! SQLite repositories, one per collection plus the cross-collection ledger.

pub mod daily_log_repository;
pub mod ledger_repository;
pub mod parent_repository;
pub mod student_repository;
pub mod transaction_repository;

pub use daily_log_repository::DailyLogRepository;
pub use ledger_repository::LedgerRepository;
pub use parent_repository::ParentRepository;
pub use student_repository::StudentRepository;
pub use transaction_repository::TransactionRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::models::{daily_log::DailyLog, student::Student, transaction::Transaction};

/// Fixed-width RFC 3339 so that text ordering matches time ordering
pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid stored timestamp: {}", value))?
        .with_timezone(&Utc))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid stored date: {}", value))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

pub(crate) fn row_to_student(row: &SqliteRow) -> Result<Student> {
    Ok(Student {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        pin: row.try_get("pin")?,
        balance: row.try_get("balance")?,
        allergies: row.try_get("allergies")?,
        parent_id: row.try_get("parent_id")?,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
        updated_at: parse_timestamp(row.try_get("updated_at")?)?,
    })
}

pub(crate) fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
    Ok(Transaction {
        id: row.try_get("id")?,
        parent_id: row.try_get("parent_id")?,
        student_id: row.try_get("student_id")?,
        amount: row.try_get("amount")?,
        date: parse_timestamp(row.try_get("date")?)?,
    })
}

/// Expects the `student_name` column from a join on `students`
pub(crate) fn row_to_daily_log(row: &SqliteRow) -> Result<DailyLog> {
    let status: String = row.try_get("status")?;
    Ok(DailyLog {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        student_name: row.try_get("student_name")?,
        date: parse_date(row.try_get("date")?)?,
        status: status.parse().map_err(anyhow::Error::msg)?,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}

/// Fixtures shared by the repository and service tests
#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use crate::backend::domain::models::parent::Parent;
    use crate::backend::storage::traits::{ParentStorage, PinWrite, StudentStorage};
    use crate::backend::storage::DbConnection;

    pub async fn create_parent(db: &DbConnection, email: &str) -> Parent {
        let parent = Parent::new(email, "password123", Utc::now());
        let stored = ParentRepository::new(db.clone())
            .store_parent(&parent)
            .await
            .expect("Failed to store parent");
        assert!(stored, "email already registered: {}", email);
        parent
    }

    pub async fn create_student(
        db: &DbConnection,
        parent_id: &str,
        name: &str,
        pin: &str,
        balance: i64,
    ) -> Student {
        let now = Utc::now();
        let student = Student {
            id: Student::generate_id(now.timestamp_millis()),
            name: name.to_string(),
            pin: pin.to_string(),
            balance: 0,
            allergies: String::new(),
            parent_id: parent_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        let repo = StudentRepository::new(db.clone());
        match repo.store_student(&student).await.expect("Failed to store student") {
            PinWrite::Written(_) => {}
            other => panic!("Unexpected result storing student: {:?}", other),
        }
        if balance > 0 {
            sqlx::query("UPDATE students SET balance = ? WHERE id = ?")
                .bind(balance)
                .bind(&student.id)
                .execute(db.pool())
                .await
                .expect("Failed to seed balance");
        }
        repo.get_student(&student.id)
            .await
            .expect("Failed to reload student")
            .expect("Student missing after insert")
    }
}
