use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use log::info;

use super::{format_timestamp, is_unique_violation, row_to_student};
use crate::backend::domain::models::student::Student;
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::events::{Record, RecordEvent};
use crate::backend::storage::traits::{Connection, PinWrite, StudentStorage};

/// Repository for the `students` collection
#[derive(Clone)]
pub struct StudentRepository {
    db: DbConnection,
}

impl StudentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentStorage for StudentRepository {
    async fn store_student(&self, student: &Student) -> Result<PinWrite> {
        let result = sqlx::query(
            r#"
            INSERT INTO students (id, name, pin, balance, allergies, parent_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&student.id)
        .bind(&student.name)
        .bind(&student.pin)
        .bind(student.balance)
        .bind(&student.allergies)
        .bind(&student.parent_id)
        .bind(format_timestamp(&student.created_at))
        .bind(format_timestamp(&student.updated_at))
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => {
                info!("Stored student {}", student.id);
                self.db
                    .events()
                    .publish(RecordEvent::created(Record::Student(student.clone())));
                Ok(PinWrite::Written(student.clone()))
            }
            Err(e) if is_unique_violation(&e) => Ok(PinWrite::Taken),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<Student>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, pin, balance, allergies, parent_id, created_at, updated_at
            FROM students
            WHERE id = ?
            "#,
        )
        .bind(student_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(row_to_student).transpose()
    }

    async fn find_by_pin(&self, pin: &str) -> Result<Option<Student>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, pin, balance, allergies, parent_id, created_at, updated_at
            FROM students
            WHERE pin = ?
            LIMIT 1
            "#,
        )
        .bind(pin)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(row_to_student).transpose()
    }

    async fn list_by_parent(&self, parent_id: &str) -> Result<Vec<Student>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, pin, balance, allergies, parent_id, created_at, updated_at
            FROM students
            WHERE parent_id = ?
            ORDER BY name, created_at
            "#,
        )
        .bind(parent_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_student).collect()
    }

    async fn list_students(&self) -> Result<Vec<Student>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, pin, balance, allergies, parent_id, created_at, updated_at
            FROM students
            ORDER BY name, created_at
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(row_to_student).collect()
    }

    async fn update_allergies(&self, student_id: &str, allergies: &str) -> Result<Option<Student>> {
        let row = sqlx::query(
            r#"
            UPDATE students
            SET allergies = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, pin, balance, allergies, parent_id, created_at, updated_at
            "#,
        )
        .bind(allergies)
        .bind(format_timestamp(&Utc::now()))
        .bind(student_id)
        .fetch_optional(self.db.pool())
        .await?;

        let student = row.as_ref().map(row_to_student).transpose()?;
        if let Some(ref s) = student {
            self.db
                .events()
                .publish(RecordEvent::updated(Record::Student(s.clone())));
        }
        Ok(student)
    }

    async fn update_pin(&self, student_id: &str, pin: &str) -> Result<PinWrite> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET pin = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, pin, balance, allergies, parent_id, created_at, updated_at
            "#,
        )
        .bind(pin)
        .bind(format_timestamp(&Utc::now()))
        .bind(student_id)
        .fetch_optional(self.db.pool())
        .await;

        match result {
            Ok(Some(row)) => {
                let student = row_to_student(&row)?;
                self.db
                    .events()
                    .publish(RecordEvent::updated(Record::Student(student.clone())));
                Ok(PinWrite::Written(student))
            }
            Ok(None) => Ok(PinWrite::Missing),
            Err(e) if is_unique_violation(&e) => Ok(PinWrite::Taken),
            Err(e) => Err(e.into()),
        }
    }
}
