use crate::backend::domain::redemption_feed::{AdminDashboard as DomainDashboard, FeedEntry};
use shared::{AdminDashboard, AllergyCount, LiveFeedEntry};

pub struct FeedMapper;

impl FeedMapper {
    pub fn entry_to_dto(entry: FeedEntry) -> LiveFeedEntry {
        LiveFeedEntry {
            log_id: entry.log_id,
            student_name: entry.student_name,
            time: entry.time.to_rfc3339(),
        }
    }

    pub fn dashboard_to_dto(domain: DomainDashboard) -> AdminDashboard {
        AdminDashboard {
            date: domain.date.format("%Y-%m-%d").to_string(),
            meals_served_today: domain.meals_served_today,
            meals_purchased_this_month: domain.meals_purchased_this_month,
            predicted_load: domain.predicted_load,
            allergy_counts: domain
                .allergy_counts
                .into_iter()
                .map(|(allergy, students)| AllergyCount { allergy, students })
                .collect(),
            live_feed: domain.live_feed.into_iter().map(Self::entry_to_dto).collect(),
        }
    }
}
