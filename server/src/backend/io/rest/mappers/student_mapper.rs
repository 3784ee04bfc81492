use crate::backend::domain::commands::students::{ChildrenListResult, ChildrenSummary as DomainChildrenSummary};
use crate::backend::domain::models::student::Student as DomainStudent;
use shared::{ChildrenResponse, ChildrenSummary, Student as SharedStudent};

/// Mapper to convert domain Student models to shared DTOs.
pub struct StudentMapper;

impl StudentMapper {
    pub fn to_dto(domain: DomainStudent) -> SharedStudent {
        SharedStudent {
            id: domain.id,
            name: domain.name,
            pin: domain.pin,
            balance: domain.balance,
            allergies: domain.allergies,
            parent_id: domain.parent_id,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_summary_dto(domain: DomainChildrenSummary) -> ChildrenSummary {
        ChildrenSummary {
            total_children: domain.total_children,
            total_meals_remaining: domain.total_meals_remaining,
            low_balance_count: domain.low_balance_count,
            max_balance: domain.max_balance,
        }
    }

    pub fn to_children_dto(result: ChildrenListResult) -> ChildrenResponse {
        ChildrenResponse {
            children: result.children.into_iter().map(Self::to_dto).collect(),
            summary: Self::to_summary_dto(result.summary),
        }
    }
}
