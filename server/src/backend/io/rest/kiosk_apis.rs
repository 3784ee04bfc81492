//! # REST API for the Dining Hall Kiosk

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use tracing::{info, warn};

use crate::backend::domain::commands::kiosk::RedeemMealCommand;
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::kiosk_flow::{KioskOutcome, PinPad};
use crate::backend::io::rest::error::status_for;
use crate::backend::io::rest::mappers::KioskMapper;
use crate::backend::AppState;
use shared::{KioskResponse, RedeemMealRequest};

pub fn router() -> Router<AppState> {
    Router::new().route("/redeem", post(redeem_meal))
}

/// Redeem one meal for the PIN typed at the kiosk.
///
/// The code is typed through a [`PinPad`]; anything the pad would not submit is
/// an invalid code. Failures still carry a kiosk message so the screen can show
/// it and reset.
pub async fn redeem_meal(
    State(state): State<AppState>,
    Json(request): Json<RedeemMealRequest>,
) -> (StatusCode, Json<KioskResponse>) {
    info!("POST /api/kiosk/redeem");

    let result = match PinPad::replay(&request.pin) {
        Some(pin) => state.kiosk_service.redeem_meal_by_pin(RedeemMealCommand { pin }).await,
        None => {
            warn!("Kiosk code rejected by the PIN pad");
            Err(DomainError::not_found("No student matches this code"))
        }
    };

    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => status_for(e),
    };
    let outcome = KioskOutcome::from_result(&result);
    (status, Json(KioskMapper::to_dto(outcome)))
}
