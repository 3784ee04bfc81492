//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs from the
//! `shared` crate to these internal types.

pub mod kiosk {
    use crate::backend::domain::models::daily_log::DailyLog;

    /// A PIN submitted at the kiosk.
    #[derive(Debug, Clone)]
    pub struct RedeemMealCommand {
        pub pin: String,
    }

    /// Result of a successful redemption.
    #[derive(Debug, Clone)]
    pub struct RedemptionReceipt {
        pub student_id: String,
        pub student_name: String,
        pub remaining_balance: i64,
        pub log: DailyLog,
    }
}

pub mod auth {
    /// Input for creating a parent account.
    #[derive(Debug, Clone)]
    pub struct SignupCommand {
        pub email: String,
        pub password: String,
        pub password_confirm: String,
    }

    /// Input for password login.
    #[derive(Debug, Clone)]
    pub struct LoginCommand {
        pub email: String,
        pub password: String,
    }
}

pub mod students {
    use crate::backend::domain::models::{daily_log::DailyLog, student::Student};

    /// Input for adding a child to the signed-in parent.
    #[derive(Debug, Clone)]
    pub struct RegisterStudentCommand {
        pub name: String,
        pub allergies: String,
    }

    /// Input for overwriting a student's allergy / medical notes.
    #[derive(Debug, Clone)]
    pub struct UpdateMedicalNotesCommand {
        pub student_id: String,
        pub notes: String,
    }

    /// Query for a student's recent meals.
    #[derive(Debug, Clone)]
    pub struct MealHistoryQuery {
        pub student_id: String,
        pub limit: Option<u32>,
    }

    /// Aggregates over one parent's children.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ChildrenSummary {
        pub total_children: usize,
        pub total_meals_remaining: i64,
        pub low_balance_count: usize,
        pub max_balance: i64,
    }

    /// Result of listing a parent's children.
    #[derive(Debug, Clone)]
    pub struct ChildrenListResult {
        pub children: Vec<Student>,
        pub summary: ChildrenSummary,
    }

    /// Result of a meal history query.
    #[derive(Debug, Clone)]
    pub struct MealHistoryResult {
        pub meals: Vec<DailyLog>,
    }
}

pub mod top_up {
    use crate::backend::domain::models::transaction::Transaction;

    /// Amount as the parent entered it, before validation.
    #[derive(Debug, Clone, PartialEq)]
    pub enum AmountEntry {
        Whole(i64),
        Decimal(f64),
        Text(String),
    }

    /// Input for adding meal credits to a student.
    #[derive(Debug, Clone)]
    pub struct TopUpCommand {
        pub student_id: String,
        pub amount: AmountEntry,
    }

    /// Result of a successful top-up.
    #[derive(Debug, Clone)]
    pub struct TopUpResult {
        pub transaction: Transaction,
        pub new_balance: i64,
    }
}

pub mod admin {
    use chrono::NaiveDate;

    use crate::backend::domain::models::daily_log::DailyLog;

    /// Result of the today's-redemptions query.
    #[derive(Debug, Clone)]
    pub struct TodayRedemptionsResult {
        pub date: NaiveDate,
        pub redemptions: Vec<DailyLog>,
    }
}
