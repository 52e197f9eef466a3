use axum::{extract::State, routing::post, Json, Router};
use marquee_core::{CustomerId, ShowtimeId, TicketId};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldRequest {
    pub customer_id: CustomerId,
    pub showtime_id: ShowtimeId,
    pub ticket_ids: Vec<TicketId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HoldResponse {
    pub success: bool,
}

/// Shared by the query and release calls.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerShowtimeRequest {
    pub showtime_id: ShowtimeId,
    pub customer_id: CustomerId,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/holds", post(hold_tickets))
        .route("/v1/holds/find", post(find_held_tickets))
        .route("/v1/holds/release", post(release_tickets))
}

/// A conflict is a normal `success: false` answer, not an error status.
async fn hold_tickets(
    State(state): State<AppState>,
    Json(req): Json<HoldRequest>,
) -> Result<Json<HoldResponse>, AppError> {
    let success = state
        .holds
        .hold_tickets(&req.customer_id, &req.showtime_id, &req.ticket_ids)
        .await?;

    Ok(Json(HoldResponse { success }))
}

async fn find_held_tickets(
    State(state): State<AppState>,
    Json(req): Json<CustomerShowtimeRequest>,
) -> Result<Json<Vec<TicketId>>, AppError> {
    let ticket_ids = state
        .holds
        .find_held_ticket_ids(&req.showtime_id, &req.customer_id)
        .await?;

    Ok(Json(ticket_ids))
}

async fn release_tickets(
    State(state): State<AppState>,
    Json(req): Json<CustomerShowtimeRequest>,
) -> Result<Json<bool>, AppError> {
    let released = state
        .holds
        .release_tickets(&req.showtime_id, &req.customer_id)
        .await?;

    Ok(Json(released))
}
