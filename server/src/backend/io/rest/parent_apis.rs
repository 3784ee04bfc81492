//! # REST API for Parent Accounts
//!
//! Signup, login, logout, the current identity and the parent's children.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::backend::domain::commands::auth::{LoginCommand, SignupCommand};
use crate::backend::domain::commands::students::RegisterStudentCommand;
use crate::backend::domain::errors::DomainError;
use crate::backend::io::rest::auth::{bearer_token, ParentSession};
use crate::backend::io::rest::mappers::{ParentMapper, StudentMapper};
use crate::backend::AppState;
use shared::{
    ChildrenResponse, CreateStudentRequest, LoginRequest, ParentAccount, SessionResponse, SignupRequest,
    SignupResponse, StudentResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(current_parent))
        .route("/children", get(list_children).post(register_child))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), DomainError> {
    info!("POST /api/parents/signup");

    let parent = state
        .auth_service
        .signup(SignupCommand {
            email: request.email,
            password: request.password,
            password_confirm: request.password_confirm,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            parent: ParentMapper::to_dto(&parent),
            success_message: "Account created, you can sign in now".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, DomainError> {
    info!("POST /api/parents/login");

    let session = state
        .auth_service
        .login(LoginCommand {
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok(Json(ParentMapper::to_session_dto(session)))
}

/// Clears the session if there is one
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    info!("POST /api/parents/logout");

    if let Some(token) = bearer_token(&headers) {
        state.auth_service.logout(token);
    }
    StatusCode::NO_CONTENT
}

pub async fn current_parent(ParentSession(session): ParentSession) -> Json<ParentAccount> {
    Json(ParentMapper::session_to_account_dto(&session))
}

pub async fn list_children(
    State(state): State<AppState>,
    ParentSession(session): ParentSession,
) -> Result<Json<ChildrenResponse>, DomainError> {
    info!("GET /api/parents/children");

    let result = state.student_service.list_children(&session).await?;
    Ok(Json(StudentMapper::to_children_dto(result)))
}

pub async fn register_child(
    State(state): State<AppState>,
    ParentSession(session): ParentSession,
    Json(request): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), DomainError> {
    info!("POST /api/parents/children");

    let student = state
        .student_service
        .register_student(
            &session,
            RegisterStudentCommand {
                name: request.name,
                allergies: request.allergies,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StudentResponse {
            student: StudentMapper::to_dto(student),
            success_message: "Student added successfully".to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use crate::backend::io::rest::test_utils::{get_request, json_request, send, setup_test_app, signed_in_parent};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_signup_login_me_logout() {
        let app = setup_test_app().await;

        let (status, body) = send(
            &app.router,
            json_request(
                Method::POST,
                "/api/parents/signup",
                None,
                json!({"email": "dana@example.com", "password": "password123", "password_confirm": "password123"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["parent"]["email"], "dana@example.com");

        let (status, body) = send(
            &app.router,
            json_request(
                Method::POST,
                "/api/parents/login",
                None,
                json!({"email": "dana@example.com", "password": "password123"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app.router, get_request("/api/parents/me", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "dana@example.com");

        let (status, _) = send(
            &app.router,
            json_request(Method::POST, "/api/parents/logout", Some(&token), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app.router, get_request("/api/parents/me", Some(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_signup_password_mismatch() {
        let app = setup_test_app().await;

        let (status, body) = send(
            &app.router,
            json_request(
                Method::POST,
                "/api/parents/signup",
                None,
                json!({"email": "dana@example.com", "password": "password123", "password_confirm": "password321"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn test_children_require_session() {
        let app = setup_test_app().await;

        let (status, _) = send(&app.router, get_request("/api/parents/children", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app.router, get_request("/api/parents/children", Some("bogus"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_and_list_children() {
        let app = setup_test_app().await;
        let token = signed_in_parent(&app.router, "dana@example.com").await;

        let (status, body) = send(
            &app.router,
            json_request(
                Method::POST,
                "/api/parents/children",
                Some(&token),
                json!({"name": "Noa", "allergies": "nuts"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["student"]["pin"], "4321");
        assert_eq!(body["student"]["balance"], 0);

        let (status, body) = send(&app.router, get_request("/api/parents/children", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["children"].as_array().unwrap().len(), 1);
        assert_eq!(body["summary"]["total_children"], 1);
        assert_eq!(body["summary"]["low_balance_count"], 1);
    }
}
