//! Meal redemption at the dining-hall kiosk.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::commands::kiosk::{RedeemMealCommand, RedemptionReceipt};
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::{daily_log::DailyLog, student::Student};
use crate::backend::storage::{Connection, LedgerStorage, StudentStorage};

#[derive(Clone)]
pub struct KioskService<C: Connection> {
    student_repository: C::StudentRepository,
    ledger_repository: C::LedgerRepository,
}

impl<C: Connection> KioskService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            ledger_repository: connection.create_ledger_repository(),
        }
    }

    /// Spend one meal credit for the student holding `pin` and log the meal.
    ///
    /// A PIN that is not four digits can never match and is reported as
    /// `NotFound` without a lookup.
    pub async fn redeem_meal_by_pin(&self, command: RedeemMealCommand) -> DomainResult<RedemptionReceipt> {
        if !Student::is_valid_pin(&command.pin) {
            warn!("Rejected malformed kiosk PIN");
            return Err(DomainError::not_found("No student matches this code"));
        }

        let student = self
            .student_repository
            .find_by_pin(&command.pin)
            .await?
            .ok_or_else(|| DomainError::not_found("No student matches this code"))?;

        if !student.has_meal_credit() {
            warn!("Student {} has no meal credit", student.id);
            return Err(DomainError::InsufficientBalance);
        }

        // The store re-checks the balance; a concurrent redemption may have taken the last credit
        let change = self
            .ledger_repository
            .redeem_meal(&DailyLog::eaten(&student.id, Utc::now()))
            .await?
            .ok_or(DomainError::InsufficientBalance)?;

        info!(
            "Meal served to {} ({} credits left)",
            change.student.name, change.student.balance
        );

        Ok(RedemptionReceipt {
            student_id: change.student.id,
            student_name: change.student.name,
            remaining_balance: change.student.balance,
            log: change.record,
        })
    }
}
