//! Domain model for a top-up transaction.

use chrono::{DateTime, Utc};

/// Append-only ledger entry recording meal credits bought by a parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub parent_id: String,
    pub student_id: String,
    /// Always positive
    pub amount: i64,
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn generate_id(epoch_millis: i64) -> String {
        super::generate_id("transaction", epoch_millis)
    }
}
