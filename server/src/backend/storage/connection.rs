use anyhow::{Context, Result};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::backend::storage::events::{EventHub, EVENT_CHANNEL_CAPACITY};
use crate::backend::storage::repositories::{
    DailyLogRepository, LedgerRepository, ParentRepository, StudentRepository,
    TransactionRepository,
};
use crate::backend::storage::traits::Connection;

const MAX_FILE_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// DbConnection owns the SQLite pool and the record event hub
#[derive(Clone)]
pub struct DbConnection {
    pool: SqlitePool,
    events: EventHub,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and set up the schema
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        // An in-memory database lives only as long as its connection, so it gets
        // exactly one that is never recycled.
        let pool = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(MAX_FILE_CONNECTIONS)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await?
        };

        Self::setup_schema(&pool).await?;
        info!("Database ready at {}", url);

        Ok(Self {
            pool,
            events: EventHub::new(EVENT_CHANNEL_CAPACITY),
        })
    }

    /// Initialize a private in-memory test database
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS parents (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                password_salt TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS students (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                pin TEXT NOT NULL,
                balance INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0),
                allergies TEXT NOT NULL DEFAULT '',
                parent_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (parent_id) REFERENCES parents (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // PIN is the kiosk lookup key and must identify one student
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_students_pin
            ON students(pin);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_students_parent_id
            ON students(parent_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                parent_id TEXT NOT NULL,
                student_id TEXT NOT NULL,
                amount INTEGER NOT NULL CHECK (amount > 0),
                date TEXT NOT NULL,
                FOREIGN KEY (student_id) REFERENCES students (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_student_id
            ON transactions(student_id);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_date
            ON transactions(date);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS daily_logs (
                id TEXT PRIMARY KEY,
                student_id TEXT NOT NULL,
                date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'eaten' CHECK (status = 'eaten'),
                created_at TEXT NOT NULL,
                FOREIGN KEY (student_id) REFERENCES students (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_daily_logs_date
            ON daily_logs(date, created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_daily_logs_student_id
            ON daily_logs(student_id, created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

impl Connection for DbConnection {
    type StudentRepository = StudentRepository;
    type LedgerRepository = LedgerRepository;
    type DailyLogRepository = DailyLogRepository;
    type TransactionRepository = TransactionRepository;
    type ParentRepository = ParentRepository;

    fn create_student_repository(&self) -> Self::StudentRepository {
        StudentRepository::new(self.clone())
    }

    fn create_ledger_repository(&self) -> Self::LedgerRepository {
        LedgerRepository::new(self.clone())
    }

    fn create_daily_log_repository(&self) -> Self::DailyLogRepository {
        DailyLogRepository::new(self.clone())
    }

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        TransactionRepository::new(self.clone())
    }

    fn create_parent_repository(&self) -> Self::ParentRepository {
        ParentRepository::new(self.clone())
    }

    fn events(&self) -> &EventHub {
        &self.events
    }
}
