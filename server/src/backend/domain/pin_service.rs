//! Kiosk PIN issuance.
//!
//! Candidates are drawn from a [`PinGenerator`] and checked against the store
//! before writing. The unique index on `students.pin` is the final arbiter: a
//! write that loses a race to a concurrent issuer counts as a failed attempt.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;

use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::student::Student;
use crate::backend::domain::session::SessionContext;
use crate::backend::storage::{Connection, PinWrite, StudentStorage};

pub const MAX_PIN_ATTEMPTS: u32 = 50;

/// Source of PIN candidates
pub trait PinGenerator: Send + Sync {
    fn candidate(&self) -> String;

    /// Tried once after every candidate was taken
    fn fallback(&self, now: DateTime<Utc>) -> String {
        format!("{:04}", now.timestamp_millis().rem_euclid(10_000))
    }
}

/// Uniform candidates in 1000..=9999
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPinGenerator;

impl PinGenerator for RandomPinGenerator {
    fn candidate(&self) -> String {
        rand::thread_rng().gen_range(1000..=9999).to_string()
    }
}

/// Where a freshly chosen PIN is written
enum PinTarget<'a> {
    NewStudent(&'a Student),
    Existing(&'a str),
}

#[derive(Clone)]
pub struct PinService<C: Connection> {
    student_repository: C::StudentRepository,
    generator: Arc<dyn PinGenerator>,
}

impl<C: Connection> PinService<C> {
    pub fn new(connection: Arc<C>, generator: Arc<dyn PinGenerator>) -> Self {
        Self {
            student_repository: connection.create_student_repository(),
            generator,
        }
    }

    /// Replace the PIN of one of the session parent's children
    pub async fn issue_new_pin(&self, session: &SessionContext, student_id: &str) -> DomainResult<Student> {
        let student = self
            .student_repository
            .get_student(student_id)
            .await?
            .filter(|student| student.is_owned_by(&session.parent_id))
            .ok_or_else(|| DomainError::not_found(format!("Student {}", student_id)))?;

        let updated = self.place_pin(PinTarget::Existing(&student.id)).await?;
        info!("Issued new PIN for student {}", updated.id);
        Ok(updated)
    }

    /// Store a new student under a freshly chosen PIN
    pub async fn store_with_new_pin(&self, student: &Student) -> DomainResult<Student> {
        self.place_pin(PinTarget::NewStudent(student)).await
    }

    async fn place_pin(&self, target: PinTarget<'_>) -> DomainResult<Student> {
        for attempt in 1..=MAX_PIN_ATTEMPTS {
            let candidate = self.generator.candidate();
            if self.student_repository.find_by_pin(&candidate).await?.is_some() {
                continue;
            }

            match self.write_pin(&target, &candidate).await? {
                PinWrite::Written(student) => return Ok(student),
                PinWrite::Taken => debug!("PIN candidate taken concurrently (attempt {})", attempt),
                PinWrite::Missing => return Err(DomainError::not_found("Student")),
            }
        }

        let fallback = self.generator.fallback(Utc::now());
        warn!(
            "No free PIN after {} attempts, trying time-derived fallback",
            MAX_PIN_ATTEMPTS
        );

        match self.write_pin(&target, &fallback).await? {
            PinWrite::Written(student) => Ok(student),
            PinWrite::Taken => Err(DomainError::Conflict("No free PIN available".to_string())),
            PinWrite::Missing => Err(DomainError::not_found("Student")),
        }
    }

    async fn write_pin(&self, target: &PinTarget<'_>, pin: &str) -> anyhow::Result<PinWrite> {
        match target {
            PinTarget::NewStudent(student) => {
                let mut student = (*student).clone();
                student.pin = pin.to_string();
                self.student_repository.store_student(&student).await
            }
            PinTarget::Existing(student_id) => self.student_repository.update_pin(student_id, pin).await,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_utils::SequencePinGenerator;
    use super::*;
    use crate::backend::domain::session::SessionStore;
    use crate::backend::storage::repositories::test_utils::{create_parent, create_student};
    use crate::backend::storage::DbConnection;
    use chrono::TimeZone;

    async fn setup_test(generator: SequencePinGenerator) -> (DbConnection, PinService<DbConnection>, SessionContext) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let parent = create_parent(&db, "dana@example.com").await;
        let session = SessionStore::default().open(&parent, Utc::now());
        let service = PinService::new(Arc::new(db.clone()), Arc::new(generator));
        (db, service, session)
    }

    #[tokio::test]
    async fn test_first_free_candidate_is_selected() {
        let (db, service, session) =
            setup_test(SequencePinGenerator::new(&["1234", "1234", "5678"], "0000")).await;
        create_student(&db, &session.parent_id, "Noa", "1234", 0).await;
        let omer = create_student(&db, &session.parent_id, "Omer", "2222", 0).await;

        let updated = service.issue_new_pin(&session, &omer.id).await.expect("Issue failed");
        assert_eq!(updated.pin, "5678");

        let stored = db.create_student_repository().find_by_pin("5678").await.unwrap().unwrap();
        assert_eq!(stored.id, omer.id);
    }

    #[tokio::test]
    async fn test_reissue_changes_the_stored_pin() {
        let (db, service, session) = setup_test(SequencePinGenerator::new(&["1234", "4321"], "0000")).await;
        let noa = create_student(&db, &session.parent_id, "Noa", "1234", 5).await;

        let updated = service.issue_new_pin(&session, &noa.id).await.unwrap();
        assert_eq!(updated.pin, "4321");
        assert_eq!(updated.balance, 5);
    }

    #[tokio::test]
    async fn test_exhaustion_uses_fallback() {
        let (db, service, session) = setup_test(SequencePinGenerator::new(&["1234"], "0042")).await;
        let noa = create_student(&db, &session.parent_id, "Noa", "1234", 5).await;
        let omer = create_student(&db, &session.parent_id, "Omer", "2222", 0).await;

        let updated = service.issue_new_pin(&session, &omer.id).await.unwrap();
        assert_eq!(updated.pin, "0042");

        let reloaded = db.create_student_repository().get_student(&noa.id).await.unwrap().unwrap();
        assert_eq!(reloaded.pin, "1234");
    }

    #[tokio::test]
    async fn test_fallback_collision_is_conflict() {
        let (db, service, session) = setup_test(SequencePinGenerator::new(&["1234"], "1234")).await;
        create_student(&db, &session.parent_id, "Noa", "1234", 5).await;
        let omer = create_student(&db, &session.parent_id, "Omer", "2222", 0).await;

        let result = service.issue_new_pin(&session, &omer.id).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));

        let reloaded = db.create_student_repository().get_student(&omer.id).await.unwrap().unwrap();
        assert_eq!(reloaded.pin, "2222");
    }

    #[tokio::test]
    async fn test_other_parents_student_is_not_found() {
        let (db, service, session) = setup_test(SequencePinGenerator::new(&["5678"], "0000")).await;
        let other = create_parent(&db, "eli@example.com").await;
        let omer = create_student(&db, &other.id, "Omer", "2222", 0).await;

        let result = service.issue_new_pin(&session, &omer.id).await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_random_candidates_are_four_digits() {
        let generator = RandomPinGenerator;
        for _ in 0..500 {
            let pin = generator.candidate();
            assert!(Student::is_valid_pin(&pin), "{}", pin);
            assert!(!pin.starts_with('0'));
        }
    }

    #[test]
    fn test_default_fallback_uses_last_four_clock_digits() {
        let now = Utc.timestamp_millis_opt(1_760_000_001_234).unwrap();
        assert_eq!(RandomPinGenerator.fallback(now), "1234");

        let now = Utc.timestamp_millis_opt(1_760_000_000_007).unwrap();
        assert_eq!(RandomPinGenerator.fallback(now), "0007");
    }
}
