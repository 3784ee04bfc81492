//! Kiosk-side interaction state: the PIN pad buffer and the screen outcome that
//! follows a redemption attempt.

use std::time::Duration;

use crate::backend::domain::commands::kiosk::RedemptionReceipt;
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::student::PIN_LENGTH;

pub const SUCCESS_RESET: Duration = Duration::from_secs(3);
pub const ERROR_RESET: Duration = Duration::from_secs(2);

/// What a key press asks the kiosk to do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PadAction {
    /// Keep collecting digits
    Pending,
    /// The code is complete and should be submitted once
    Submit(String),
    /// Input was dropped (non-digit, or the code is already complete)
    Ignored,
}

/// Four-digit entry buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinPad {
    digits: String,
}

impl PinPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: char) -> PadAction {
        if !key.is_ascii_digit() || self.is_complete() {
            return PadAction::Ignored;
        }

        self.digits.push(key);
        if self.is_complete() {
            PadAction::Submit(self.digits.clone())
        } else {
            PadAction::Pending
        }
    }

    /// Type a whole code on a fresh pad. Yields the PIN only if every key was
    /// accepted and the last one completed the code.
    pub fn replay(keys: &str) -> Option<String> {
        let mut pad = PinPad::new();
        let mut submitted = None;
        for key in keys.chars() {
            match pad.press(key) {
                PadAction::Pending => {}
                PadAction::Submit(pin) => submitted = Some(pin),
                PadAction::Ignored => return None,
            }
        }
        submitted
    }

    pub fn backspace(&mut self) {
        if !self.is_complete() {
            self.digits.pop();
        }
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn entered(&self) -> &str {
        &self.digits
    }

    pub fn is_complete(&self) -> bool {
        self.digits.len() == PIN_LENGTH
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// What the kiosk screen shows after a submission, and for how long
#[derive(Debug, Clone, PartialEq)]
pub struct KioskOutcome {
    pub status: OutcomeStatus,
    pub message: String,
    pub student_name: Option<String>,
    pub remaining_balance: Option<i64>,
    pub reset_after: Duration,
}

impl KioskOutcome {
    pub fn from_result(result: &Result<RedemptionReceipt, DomainError>) -> Self {
        match result {
            Ok(receipt) => Self {
                status: OutcomeStatus::Success,
                message: format!("Enjoy your meal, {}!", receipt.student_name),
                student_name: Some(receipt.student_name.clone()),
                remaining_balance: Some(receipt.remaining_balance),
                reset_after: SUCCESS_RESET,
            },
            Err(err) => Self::error(match err {
                DomainError::NotFound(_) => "Invalid code",
                DomainError::InsufficientBalance => "No balance",
                _ => "Processing error",
            }),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            status: OutcomeStatus::Error,
            message: message.to_string(),
            student_name: None,
            remaining_balance: None,
            reset_after: ERROR_RESET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::daily_log::DailyLog;
    use chrono::Utc;

    #[test]
    fn test_fourth_digit_submits_once() {
        let mut pad = PinPad::new();
        assert_eq!(pad.press('1'), PadAction::Pending);
        assert_eq!(pad.press('2'), PadAction::Pending);
        assert_eq!(pad.press('3'), PadAction::Pending);
        assert_eq!(pad.press('4'), PadAction::Submit("1234".to_string()));

        assert_eq!(pad.press('5'), PadAction::Ignored);
        assert_eq!(pad.entered(), "1234");

        pad.clear();
        assert_eq!(pad.entered(), "");
        assert_eq!(pad.press('9'), PadAction::Pending);
    }

    #[test]
    fn test_non_digits_and_backspace() {
        let mut pad = PinPad::new();
        assert_eq!(pad.press('x'), PadAction::Ignored);
        pad.press('1');
        pad.press('2');
        pad.backspace();
        assert_eq!(pad.entered(), "1");
    }

    #[test]
    fn test_replay_accepts_only_complete_codes() {
        assert_eq!(PinPad::replay("1234"), Some("1234".to_string()));
        assert_eq!(PinPad::replay("0007"), Some("0007".to_string()));

        for keys in ["", "123", "12345", "12a4", " 1234", "1234 "] {
            assert_eq!(PinPad::replay(keys), None, "{:?}", keys);
        }
    }

    #[test]
    fn test_success_outcome() {
        let receipt = RedemptionReceipt {
            student_id: "student::1::abcd".to_string(),
            student_name: "Noa".to_string(),
            remaining_balance: 4,
            log: DailyLog::eaten("student::1::abcd", Utc::now()),
        };

        let outcome = KioskOutcome::from_result(&Ok(receipt));
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.message, "Enjoy your meal, Noa!");
        assert_eq!(outcome.remaining_balance, Some(4));
        assert_eq!(outcome.reset_after, Duration::from_secs(3));
    }

    #[test]
    fn test_error_outcomes() {
        let cases = [
            (DomainError::not_found("pin"), "Invalid code"),
            (DomainError::InsufficientBalance, "No balance"),
            (DomainError::BackendUnavailable(anyhow::anyhow!("down")), "Processing error"),
        ];

        for (err, message) in cases {
            let outcome = KioskOutcome::from_result(&Err(err));
            assert_eq!(outcome.status, OutcomeStatus::Error);
            assert_eq!(outcome.message, message);
            assert_eq!(outcome.reset_after, Duration::from_secs(2));
            assert!(outcome.student_name.is_none());
        }
    }
}
