use serde::{Deserialize, Serialize};

/// A student enrolled in the meal-credit program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    /// 4-digit kiosk code
    pub pin: String,
    /// Remaining meal credits
    pub balance: i64,
    /// Free-text allergy / medical notes
    pub allergies: String,
    pub parent_id: String,
    /// RFC 3339 timestamp
    pub created_at: String,
    /// RFC 3339 timestamp
    pub updated_at: String,
}

/// Immutable top-up ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub parent_id: String,
    pub student_id: String,
    /// Meal credits added
    pub amount: i64,
    /// RFC 3339 timestamp
    pub date: String,
}

/// Immutable redemption record written by the kiosk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: String,
    pub student_id: String,
    /// Expanded from the student relation when the query asked for it
    pub student_name: Option<String>,
    /// Calendar date (YYYY-MM-DD, UTC)
    pub date: String,
    pub status: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentAccount {
    pub id: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Kiosk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemMealRequest {
    pub pin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KioskStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KioskResponse {
    pub status: KioskStatus,
    /// Message shown on the kiosk screen
    pub message: String,
    pub student_name: Option<String>,
    pub remaining_balance: Option<i64>,
    /// How long the kiosk should show the message before returning to idle
    pub reset_after_ms: u64,
}

// ---------------------------------------------------------------------------
// Parent accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub parent: ParentAccount,
    /// RFC 3339 timestamp
    pub expires_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupResponse {
    pub parent: ParentAccount,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    #[serde(default)]
    pub allergies: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub student: Student,
    pub success_message: String,
}

/// Aggregates shown on the parent dashboard widgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildrenSummary {
    pub total_children: usize,
    pub total_meals_remaining: i64,
    pub low_balance_count: usize,
    pub max_balance: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildrenResponse {
    pub children: Vec<Student>,
    pub summary: ChildrenSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMedicalNotesRequest {
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealHistoryResponse {
    pub meals: Vec<DailyLog>,
}

// ---------------------------------------------------------------------------
// Top-up
// ---------------------------------------------------------------------------

/// Amount as typed by the parent: a preset button value, a number, or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopUpAmountInput {
    Whole(i64),
    Decimal(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUpRequest {
    pub amount: TopUpAmountInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUpResponse {
    pub transaction: Transaction,
    pub new_balance: i64,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUpPresetsResponse {
    pub presets: Vec<i64>,
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayRedemptionsResponse {
    pub date: String,
    pub redemptions: Vec<DailyLog>,
}

/// One row of the admin live feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveFeedEntry {
    pub log_id: String,
    pub student_name: String,
    /// RFC 3339 timestamp
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllergyCount {
    pub allergy: String,
    pub students: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub date: String,
    pub meals_served_today: u64,
    pub meals_purchased_this_month: i64,
    /// Predicted dining-hall load in percent
    pub predicted_load: u8,
    pub allergy_counts: Vec<AllergyCount>,
    pub live_feed: Vec<LiveFeedEntry>,
}

// ---------------------------------------------------------------------------
// Client logging
// ---------------------------------------------------------------------------

/// Log line forwarded by a kiosk / portal client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    pub component: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogResponse {
    pub success: bool,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
