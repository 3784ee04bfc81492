//! Parent top-ups of a student's meal credit.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::commands::top_up::{AmountEntry, TopUpCommand, TopUpResult};
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::transaction::Transaction;
use crate::backend::domain::session::SessionContext;
use crate::backend::storage::{Connection, LedgerStorage, StudentStorage};

/// Preset buttons offered by the parent portal
pub const TOP_UP_PRESETS: [i64; 3] = [10, 30, 150];

/// Largest number of meals accepted in one top-up
pub const MAX_TOP_UP: i64 = 10_000;

/// A validated top-up amount in meals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopUpAmount(i64);

impl TopUpAmount {
    pub fn presets() -> Vec<TopUpAmount> {
        TOP_UP_PRESETS.iter().map(|&meals| TopUpAmount(meals)).collect()
    }

    pub fn new(meals: i64) -> DomainResult<Self> {
        if (1..=MAX_TOP_UP).contains(&meals) {
            Ok(TopUpAmount(meals))
        } else {
            Err(DomainError::InvalidAmount)
        }
    }

    /// Accepts whole numbers, whole-valued decimals and trimmed numeric text
    pub fn parse(entry: &AmountEntry) -> DomainResult<Self> {
        match entry {
            AmountEntry::Whole(meals) => Self::new(*meals),
            AmountEntry::Decimal(value) => Self::from_decimal(*value),
            AmountEntry::Text(text) => {
                let text = text.trim();
                if let Ok(meals) = text.parse::<i64>() {
                    return Self::new(meals);
                }
                match text.parse::<f64>() {
                    Ok(value) => Self::from_decimal(value),
                    Err(_) => Err(DomainError::InvalidAmount),
                }
            }
        }
    }

    fn from_decimal(value: f64) -> DomainResult<Self> {
        if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > MAX_TOP_UP as f64 {
            return Err(DomainError::InvalidAmount);
        }
        Ok(TopUpAmount(value as i64))
    }

    pub fn meals(&self) -> i64 {
        self.0
    }
}

#[derive(Clone)]
pub struct TopUpService<C: Connection> {
    student_repository: C::StudentRepository,
    ledger_repository: C::LedgerRepository,
}

impl<C: Connection> TopUpService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            ledger_repository: connection.create_ledger_repository(),
        }
    }

    /// Add meal credits to one of the session parent's children.
    pub async fn top_up(&self, session: &SessionContext, command: TopUpCommand) -> DomainResult<TopUpResult> {
        let amount = TopUpAmount::parse(&command.amount).map_err(|e| {
            warn!("Rejected top-up amount {:?}", command.amount);
            e
        })?;

        let student = self
            .student_repository
            .get_student(&command.student_id)
            .await?
            .filter(|student| student.is_owned_by(&session.parent_id))
            .ok_or_else(|| DomainError::not_found(format!("Student {}", command.student_id)))?;

        let now = Utc::now();
        let transaction = Transaction {
            id: Transaction::generate_id(now.timestamp_millis()),
            parent_id: session.parent_id.clone(),
            student_id: student.id.clone(),
            amount: amount.meals(),
            date: now,
        };

        let change = self
            .ledger_repository
            .apply_top_up(&transaction)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Student {}", student.id)))?;

        info!(
            "Parent {} added {} meals for {}",
            session.parent_id,
            amount.meals(),
            student.id
        );

        Ok(TopUpResult {
            transaction: change.record,
            new_balance: change.student.balance,
        })
    }
}
