use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::commands::students::{
    ChildrenListResult, ChildrenSummary, MealHistoryQuery, MealHistoryResult, RegisterStudentCommand,
    UpdateMedicalNotesCommand,
};
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::student::Student;
use crate::backend::domain::pin_service::PinService;
use crate::backend::domain::session::SessionContext;
use crate::backend::storage::{Connection, DailyLogStorage, StudentStorage};

pub const MAX_NAME_LENGTH: usize = 100;
pub const DEFAULT_MEAL_HISTORY_LIMIT: u32 = 30;
/// Children at or below this many meals are flagged on the parent dashboard
pub const LOW_BALANCE_THRESHOLD: i64 = 5;

/// Service for a parent's children: enrolment, notes and history
#[derive(Clone)]
pub struct StudentService<C: Connection> {
    student_repository: C::StudentRepository,
    daily_log_repository: C::DailyLogRepository,
    pin_service: PinService<C>,
}

impl<C: Connection> StudentService<C> {
    pub fn new(connection: Arc<C>, pin_service: PinService<C>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            daily_log_repository: connection.create_daily_log_repository(),
            pin_service,
        }
    }

    /// Add a child under the session parent with a zero balance and a fresh PIN
    pub async fn register_student(
        &self,
        session: &SessionContext,
        command: RegisterStudentCommand,
    ) -> DomainResult<Student> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("Student name cannot be empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::Validation(format!(
                "Student name cannot exceed {} characters",
                MAX_NAME_LENGTH
            )));
        }

        let now = Utc::now();
        let draft = Student {
            id: Student::generate_id(now.timestamp_millis()),
            name: name.to_string(),
            pin: String::new(),
            balance: 0,
            allergies: command.allergies.trim().to_string(),
            parent_id: session.parent_id.clone(),
            created_at: now,
            updated_at: now,
        };

        let student = self.pin_service.store_with_new_pin(&draft).await?;
        info!("Registered student {} for parent {}", student.id, session.parent_id);
        Ok(student)
    }

    pub async fn list_children(&self, session: &SessionContext) -> DomainResult<ChildrenListResult> {
        let children = self.student_repository.list_by_parent(&session.parent_id).await?;
        let summary = summarize(&children);
        Ok(ChildrenListResult { children, summary })
    }

    /// Overwrite the allergy / medical notes. Empty text clears them.
    pub async fn update_medical_notes(
        &self,
        session: &SessionContext,
        command: UpdateMedicalNotesCommand,
    ) -> DomainResult<Student> {
        self.owned_student(session, &command.student_id).await?;

        let student = self
            .student_repository
            .update_allergies(&command.student_id, &command.notes)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Student {}", command.student_id)))?;

        info!("Updated medical notes for student {}", student.id);
        Ok(student)
    }

    pub async fn meal_history(
        &self,
        session: &SessionContext,
        query: MealHistoryQuery,
    ) -> DomainResult<MealHistoryResult> {
        self.owned_student(session, &query.student_id).await?;

        let limit = query.limit.unwrap_or(DEFAULT_MEAL_HISTORY_LIMIT);
        let meals = self.daily_log_repository.list_for_student(&query.student_id, limit).await?;
        Ok(MealHistoryResult { meals })
    }

    async fn owned_student(&self, session: &SessionContext, student_id: &str) -> DomainResult<Student> {
        match self.student_repository.get_student(student_id).await? {
            Some(student) if student.is_owned_by(&session.parent_id) => Ok(student),
            Some(_) => {
                warn!("Parent {} asked for another parent's student {}", session.parent_id, student_id);
                Err(DomainError::not_found(format!("Student {}", student_id)))
            }
            None => Err(DomainError::not_found(format!("Student {}", student_id))),
        }
    }
}

/// Parent dashboard aggregates over a list of children
pub fn summarize(children: &[Student]) -> ChildrenSummary {
    ChildrenSummary {
        total_children: children.len(),
        total_meals_remaining: children.iter().map(|c| c.balance).sum(),
        low_balance_count: children.iter().filter(|c| c.balance <= LOW_BALANCE_THRESHOLD).count(),
        max_balance: children.iter().map(|c| c.balance).max().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::pin_service::test_utils::SequencePinGenerator;
    use crate::backend::domain::session::SessionStore;
    use crate::backend::storage::repositories::test_utils::{create_parent, create_student};
    use crate::backend::storage::{DbConnection, LedgerStorage};
    use crate::backend::domain::models::daily_log::DailyLog;

    async fn setup_test(candidates: &[&str]) -> (DbConnection, StudentService<DbConnection>, SessionContext) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let parent = create_parent(&db, "dana@example.com").await;
        let session = SessionStore::default().open(&parent, Utc::now());
        let connection = Arc::new(db.clone());
        let pin_service = PinService::new(connection.clone(), Arc::new(SequencePinGenerator::new(candidates, "0000")));
        (db, StudentService::new(connection, pin_service), session)
    }

    fn register(name: &str, allergies: &str) -> RegisterStudentCommand {
        RegisterStudentCommand {
            name: name.to_string(),
            allergies: allergies.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_student_assigns_free_pin() {
        let (db, service, session) = setup_test(&["1234", "2468"]).await;
        create_student(&db, &session.parent_id, "Noa", "1234", 5).await;

        let student = service
            .register_student(&session, register("  Omer ", " peanuts "))
            .await
            .expect("Register failed");

        assert_eq!(student.name, "Omer");
        assert_eq!(student.allergies, "peanuts");
        assert_eq!(student.pin, "2468");
        assert_eq!(student.balance, 0);
        assert_eq!(student.parent_id, session.parent_id);
    }

    #[tokio::test]
    async fn test_register_student_validates_name() {
        let (_db, service, session) = setup_test(&["2468"]).await;

        let empty = service.register_student(&session, register("   ", "")).await;
        assert!(matches!(empty, Err(DomainError::Validation(_))));

        let long = service.register_student(&session, register(&"a".repeat(101), "")).await;
        assert!(matches!(long, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_children_with_summary() {
        let (db, service, session) = setup_test(&["2468"]).await;
        create_student(&db, &session.parent_id, "Noa", "1234", 5).await;
        create_student(&db, &session.parent_id, "Ari", "5678", 34).await;
        let other = create_parent(&db, "eli@example.com").await;
        create_student(&db, &other.id, "Omer", "9999", 1).await;

        let result = service.list_children(&session).await.unwrap();

        let names: Vec<&str> = result.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ari", "Noa"]);
        assert_eq!(
            result.summary,
            ChildrenSummary {
                total_children: 2,
                total_meals_remaining: 39,
                low_balance_count: 1,
                max_balance: 34,
            }
        );
    }

    #[test]
    fn test_summary_of_no_children() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_children, 0);
        assert_eq!(summary.max_balance, 0);
    }

    #[tokio::test]
    async fn test_update_medical_notes_is_idempotent_and_allows_empty() {
        let (db, service, session) = setup_test(&["2468"]).await;
        let noa = create_student(&db, &session.parent_id, "Noa", "1234", 5).await;

        let command = UpdateMedicalNotesCommand {
            student_id: noa.id.clone(),
            notes: "gluten, nuts".to_string(),
        };
        let first = service.update_medical_notes(&session, command.clone()).await.unwrap();
        let second = service.update_medical_notes(&session, command).await.unwrap();
        assert_eq!(first.allergies, "gluten, nuts");
        assert_eq!(second.allergies, first.allergies);

        let cleared = service
            .update_medical_notes(
                &session,
                UpdateMedicalNotesCommand {
                    student_id: noa.id.clone(),
                    notes: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.allergies, "");
    }

    #[tokio::test]
    async fn test_update_medical_notes_requires_ownership() {
        let (db, service, session) = setup_test(&["2468"]).await;
        let other = create_parent(&db, "eli@example.com").await;
        let omer = create_student(&db, &other.id, "Omer", "9999", 1).await;

        let result = service
            .update_medical_notes(
                &session,
                UpdateMedicalNotesCommand {
                    student_id: omer.id,
                    notes: "dairy".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_meal_history_newest_first_with_limit() {
        let (db, service, session) = setup_test(&["2468"]).await;
        let noa = create_student(&db, &session.parent_id, "Noa", "1234", 5).await;
        let ledger = db.create_ledger_repository();

        let start = Utc::now() - chrono::Duration::days(3);
        for day in 0..3 {
            ledger
                .redeem_meal(&DailyLog::eaten(&noa.id, start + chrono::Duration::days(day)))
                .await
                .unwrap();
        }

        let history = service
            .meal_history(
                &session,
                MealHistoryQuery {
                    student_id: noa.id.clone(),
                    limit: Some(2),
                },
            )
            .await
            .unwrap();

        assert_eq!(history.meals.len(), 2);
        assert!(history.meals[0].created_at > history.meals[1].created_at);
        assert_eq!(history.meals[0].date, (start + chrono::Duration::days(2)).date_naive());
    }
}
