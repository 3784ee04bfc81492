//! Domain model for a student.

use chrono::{DateTime, Utc};

/// Number of digits in a kiosk PIN
pub const PIN_LENGTH: usize = 4;

/// A student holding a meal-credit balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub pin: String,
    /// Meal credits; never negative
    pub balance: i64,
    pub allergies: String,
    pub parent_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn generate_id(epoch_millis: i64) -> String {
        super::generate_id("student", epoch_millis)
    }

    /// A PIN is exactly four ASCII digits
    pub fn is_valid_pin(pin: &str) -> bool {
        pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn has_meal_credit(&self) -> bool {
        self.balance > 0
    }

    pub fn is_owned_by(&self, parent_id: &str) -> bool {
        self.parent_id == parent_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(balance: i64) -> Student {
        let now = Utc::now();
        Student {
            id: "student::1::abcd".to_string(),
            name: "Noa".to_string(),
            pin: "1234".to_string(),
            balance,
            allergies: String::new(),
            parent_id: "parent::1::abcd".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_is_valid_pin() {
        assert!(Student::is_valid_pin("1234"));
        assert!(Student::is_valid_pin("0007"));
        assert!(!Student::is_valid_pin("123"));
        assert!(!Student::is_valid_pin("12345"));
        assert!(!Student::is_valid_pin("12a4"));
        assert!(!Student::is_valid_pin(""));
        assert!(!Student::is_valid_pin("١٢٣٤")); // non-ASCII digits
    }

    #[test]
    fn test_has_meal_credit() {
        assert!(student(1).has_meal_credit());
        assert!(!student(0).has_meal_credit());
    }

    #[test]
    fn test_is_owned_by() {
        let s = student(3);
        assert!(s.is_owned_by("parent::1::abcd"));
        assert!(!s.is_owned_by("parent::2::abcd"));
    }
}
