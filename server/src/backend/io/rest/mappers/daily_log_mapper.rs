use crate::backend::domain::commands::admin::TodayRedemptionsResult;
use crate::backend::domain::models::daily_log::DailyLog as DomainDailyLog;
use shared::{DailyLog as SharedDailyLog, MealHistoryResponse, TodayRedemptionsResponse};

pub struct DailyLogMapper;

impl DailyLogMapper {
    pub fn to_dto(domain: DomainDailyLog) -> SharedDailyLog {
        SharedDailyLog {
            id: domain.id,
            student_id: domain.student_id,
            student_name: domain.student_name,
            date: domain.date.format("%Y-%m-%d").to_string(),
            status: domain.status.to_string(),
            created_at: domain.created_at.to_rfc3339(),
        }
    }

    pub fn to_history_dto(meals: Vec<DomainDailyLog>) -> MealHistoryResponse {
        MealHistoryResponse {
            meals: meals.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_today_dto(result: TodayRedemptionsResult) -> TodayRedemptionsResponse {
        TodayRedemptionsResponse {
            date: result.date.format("%Y-%m-%d").to_string(),
            redemptions: result.redemptions.into_iter().map(Self::to_dto).collect(),
        }
    }
}
