//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! record-store backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::backend::domain::models::{
    daily_log::DailyLog, parent::Parent, student::Student, transaction::Transaction,
};
use crate::backend::storage::events::EventHub;

/// Outcome of a write that sets a student's PIN
#[derive(Debug, Clone, PartialEq)]
pub enum PinWrite {
    /// The PIN was stored; carries the updated student
    Written(Student),
    /// Another student already holds this PIN
    Taken,
    /// No student with the given ID
    Missing,
}

/// A ledger record together with the student row it changed
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceChange<T> {
    pub record: T,
    pub student: Student,
}

/// Trait defining the interface for student storage operations
#[async_trait]
pub trait StudentStorage: Send + Sync {
    /// Insert a new student. Reports `Taken` when the PIN is already in use.
    async fn store_student(&self, student: &Student) -> Result<PinWrite>;

    /// Retrieve a specific student by ID
    async fn get_student(&self, student_id: &str) -> Result<Option<Student>>;

    /// Exact-match lookup by PIN
    async fn find_by_pin(&self, pin: &str) -> Result<Option<Student>>;

    /// List a parent's students ordered by name
    async fn list_by_parent(&self, parent_id: &str) -> Result<Vec<Student>>;

    /// List every student ordered by name
    async fn list_students(&self) -> Result<Vec<Student>>;

    /// Overwrite the allergy / medical notes field
    async fn update_allergies(&self, student_id: &str, allergies: &str) -> Result<Option<Student>>;

    /// Set a new PIN. The PIN uniqueness constraint is enforced by the store.
    async fn update_pin(&self, student_id: &str, pin: &str) -> Result<PinWrite>;
}

/// Trait defining the balance-changing operations.
///
/// Each method writes the ledger record and the balance change atomically.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Decrement the student's balance by one if it is positive and append the log.
    /// Returns `None` without writing anything if the balance guard rejected it.
    async fn redeem_meal(&self, log: &DailyLog) -> Result<Option<BalanceChange<DailyLog>>>;

    /// Append the transaction and add its amount to the student's balance.
    /// Returns `None` without writing anything if the student does not exist.
    async fn apply_top_up(&self, transaction: &Transaction) -> Result<Option<BalanceChange<Transaction>>>;
}

/// Trait defining the interface for daily log queries
#[async_trait]
pub trait DailyLogStorage: Send + Sync {
    /// Logs for one date, expanded with the student name, newest first
    async fn list_for_date(&self, date: NaiveDate, limit: u32) -> Result<Vec<DailyLog>>;

    /// Logs for one student, newest first
    async fn list_for_student(&self, student_id: &str, limit: u32) -> Result<Vec<DailyLog>>;

    /// IDs of every log for one date
    async fn list_ids_for_date(&self, date: NaiveDate) -> Result<Vec<String>>;
}

/// Trait defining the interface for transaction queries
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// Transactions for one student, newest first
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<Transaction>>;

    /// Transactions dated at or after `since`, oldest first
    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<Transaction>>;
}

/// Trait defining the interface for parent account storage
#[async_trait]
pub trait ParentStorage: Send + Sync {
    /// Insert a parent. Returns false if the email is already registered.
    async fn store_parent(&self, parent: &Parent) -> Result<bool>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Parent>>;

    async fn get_parent(&self, parent_id: &str) -> Result<Option<Parent>>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides factory
/// methods for creating repositories, so the domain layer works with any record
/// store without knowing the implementation details.
pub trait Connection: Send + Sync + Clone + 'static {
    type StudentRepository: StudentStorage + Clone + 'static;
    type LedgerRepository: LedgerStorage + Clone + 'static;
    type DailyLogRepository: DailyLogStorage + Clone + 'static;
    type TransactionRepository: TransactionStorage + Clone + 'static;
    type ParentRepository: ParentStorage + Clone + 'static;

    fn create_student_repository(&self) -> Self::StudentRepository;
    fn create_ledger_repository(&self) -> Self::LedgerRepository;
    fn create_daily_log_repository(&self) -> Self::DailyLogRepository;
    fn create_transaction_repository(&self) -> Self::TransactionRepository;
    fn create_parent_repository(&self) -> Self::ParentRepository;

    /// Real-time change feed for this store
    fn events(&self) -> &EventHub;
}
