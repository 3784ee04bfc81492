//! # REST API for the Admin Dashboard
//!
//! Today's redemptions, the dashboard snapshot, and a server-sent-events stream
//! of meals as they are served.

use axum::{
    extract::{Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
    routing::get,
    Router,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use tracing::{info, warn};

use crate::backend::domain::errors::DomainError;
use crate::backend::domain::redemption_feed::FeedEntry;
use crate::backend::io::rest::mappers::{DailyLogMapper, FeedMapper};
use crate::backend::storage::{Record, RecordAction, Subscription, SubscriptionError};
use crate::backend::AppState;
use shared::{AdminDashboard, TodayRedemptionsResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/today", get(todays_redemptions))
        .route("/dashboard", get(dashboard))
        .route("/live", get(live_feed))
}

#[derive(Debug, Deserialize)]
pub struct TodayParams {
    pub limit: Option<u32>,
}

pub async fn todays_redemptions(
    State(state): State<AppState>,
    Query(params): Query<TodayParams>,
) -> Result<Json<TodayRedemptionsResponse>, DomainError> {
    info!("GET /api/admin/today");

    let result = state.admin_service.todays_redemptions(params.limit).await?;
    Ok(Json(DailyLogMapper::to_today_dto(result)))
}

pub async fn dashboard(State(state): State<AppState>) -> Json<AdminDashboard> {
    info!("GET /api/admin/dashboard");

    let dashboard = state.admin_service.dashboard(&state.live_feed).await;
    Json(FeedMapper::dashboard_to_dto(dashboard))
}

/// Stream `redemption` events carrying a live feed entry.
/// A `reload` event tells the client it missed entries and should refetch.
pub async fn live_feed(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    info!("GET /api/admin/live - subscriber connected");

    let subscription = state.admin_service.subscribe_redemptions();
    Sse::new(redemption_events(subscription)).keep_alive(KeepAlive::default())
}

fn redemption_events(subscription: Subscription) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold(subscription, |mut subscription| async move {
        loop {
            match subscription.recv().await {
                Ok(event) => {
                    let Record::DailyLog(log) = &event.record else { continue };
                    if event.action != RecordAction::Created {
                        continue;
                    }
                    let entry = FeedMapper::entry_to_dto(FeedEntry::from_log(log));
                    let sse = Event::default().event("redemption").id(entry.log_id.clone()).json_data(entry);
                    return Some((sse, subscription));
                }
                Err(SubscriptionError::Lagged(skipped)) => {
                    warn!("Live feed subscriber skipped {} events", skipped);
                    let sse = Event::default().event("reload").data(skipped.to_string());
                    return Some((Ok(sse), subscription));
                }
                Err(SubscriptionError::Closed) => return None,
            }
        }
    })
}
