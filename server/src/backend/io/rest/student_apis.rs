//! # REST API for a Parent's Students
//!
//! Every route is scoped to the signed-in parent; other parents' students are
//! reported as not found.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::info;

use crate::backend::domain::commands::students::{MealHistoryQuery, UpdateMedicalNotesCommand};
use crate::backend::domain::errors::DomainError;
use crate::backend::io::rest::auth::ParentSession;
use crate::backend::io::rest::mappers::{DailyLogMapper, StudentMapper};
use crate::backend::io::rest::top_up_apis;
use crate::backend::AppState;
use shared::{MealHistoryResponse, StudentResponse, UpdateMedicalNotesRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/meals", get(meal_history))
        .route("/:id/medical-notes", put(update_medical_notes))
        .route("/:id/pin", post(issue_new_pin))
        .route("/:id/top-up", post(top_up_apis::top_up_student))
}

#[derive(Debug, Deserialize)]
pub struct MealHistoryParams {
    pub limit: Option<u32>,
}

pub async fn meal_history(
    State(state): State<AppState>,
    ParentSession(session): ParentSession,
    Path(student_id): Path<String>,
    Query(params): Query<MealHistoryParams>,
) -> Result<Json<MealHistoryResponse>, DomainError> {
    info!("GET /api/students/{}/meals", student_id);

    let result = state
        .student_service
        .meal_history(
            &session,
            MealHistoryQuery {
                student_id,
                limit: params.limit,
            },
        )
        .await?;

    Ok(Json(DailyLogMapper::to_history_dto(result.meals)))
}

pub async fn update_medical_notes(
    State(state): State<AppState>,
    ParentSession(session): ParentSession,
    Path(student_id): Path<String>,
    Json(request): Json<UpdateMedicalNotesRequest>,
) -> Result<Json<StudentResponse>, DomainError> {
    info!("PUT /api/students/{}/medical-notes", student_id);

    let student = state
        .student_service
        .update_medical_notes(
            &session,
            UpdateMedicalNotesCommand {
                student_id,
                notes: request.notes,
            },
        )
        .await?;

    Ok(Json(StudentResponse {
        student: StudentMapper::to_dto(student),
        success_message: "Medical notes updated".to_string(),
    }))
}

pub async fn issue_new_pin(
    State(state): State<AppState>,
    ParentSession(session): ParentSession,
    Path(student_id): Path<String>,
) -> Result<Json<StudentResponse>, DomainError> {
    info!("POST /api/students/{}/pin", student_id);

    let student = state.pin_service.issue_new_pin(&session, &student_id).await?;

    Ok(Json(StudentResponse {
        student: StudentMapper::to_dto(student),
        success_message: "New code issued".to_string(),
    }))
}
