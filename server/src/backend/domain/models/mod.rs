//! Domain models for the meal-credit system.
//!
//! These types carry `chrono` timestamps and domain invariants; the REST layer maps
//! them to the string-typed DTOs of the `shared` crate.

pub mod daily_log;
pub mod parent;
pub mod student;
pub mod transaction;

use uuid::Uuid;

/// Generate a record ID in the format `<prefix>::<epoch_millis>::<suffix>`.
///
/// The millisecond component keeps IDs roughly time-ordered; the random suffix keeps
/// records created within the same millisecond apart.
pub fn generate_id(prefix: &str, epoch_millis: i64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}::{}::{}", prefix, epoch_millis, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("student", 1_700_000_000_000);
        let parts: Vec<&str> = id.split("::").collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "student");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn test_generate_id_unique_within_same_millisecond() {
        let a = generate_id("log", 42);
        let b = generate_id("log", 42);
        assert_ne!(a, b);
    }
}
