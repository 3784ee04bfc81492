//! Domain model for a meal redemption log.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

/// Redemption status. Only eaten meals are ever recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealStatus {
    Eaten,
}

impl MealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealStatus::Eaten => "eaten",
        }
    }
}

impl fmt::Display for MealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eaten" => Ok(MealStatus::Eaten),
            other => Err(format!("Unknown meal status: {}", other)),
        }
    }
}

/// One successful kiosk redemption.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLog {
    pub id: String,
    pub student_id: String,
    /// Filled in when the query expands the student relation
    pub student_name: Option<String>,
    pub date: NaiveDate,
    pub status: MealStatus,
    pub created_at: DateTime<Utc>,
}

impl DailyLog {
    pub fn generate_id(epoch_millis: i64) -> String {
        super::generate_id("log", epoch_millis)
    }

    /// Build the log for a meal eaten at `now`; the date is the UTC calendar day.
    pub fn eaten(student_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::generate_id(now.timestamp_millis()),
            student_id: student_id.to_string(),
            student_name: None,
            date: now.date_naive(),
            status: MealStatus::Eaten,
            created_at: now,
        }
    }
}
