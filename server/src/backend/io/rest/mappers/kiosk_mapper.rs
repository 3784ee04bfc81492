use crate::backend::domain::kiosk_flow::{KioskOutcome, OutcomeStatus};
use shared::{KioskResponse, KioskStatus};

pub struct KioskMapper;

impl KioskMapper {
    pub fn to_dto(outcome: KioskOutcome) -> KioskResponse {
        KioskResponse {
            status: match outcome.status {
                OutcomeStatus::Success => KioskStatus::Success,
                OutcomeStatus::Error => KioskStatus::Error,
            },
            message: outcome.message,
            student_name: outcome.student_name,
            remaining_balance: outcome.remaining_balance,
            reset_after_ms: outcome.reset_after.as_millis() as u64,
        }
    }
}
