use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldDurationBody {
    pub hold_duration_ms: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/hold-duration", get(get_hold_duration).put(set_hold_duration))
}

async fn get_hold_duration(State(state): State<AppState>) -> Json<HoldDurationBody> {
    Json(current(&state))
}

/// Live tuning; applies to holds made after the change.
async fn set_hold_duration(
    State(state): State<AppState>,
    Json(req): Json<HoldDurationBody>,
) -> Result<Json<HoldDurationBody>, AppError> {
    state.holds.set_hold_duration(Duration::from_millis(req.hold_duration_ms))?;
    Ok(Json(current(&state)))
}

fn current(state: &AppState) -> HoldDurationBody {
    HoldDurationBody {
        hold_duration_ms: u64::try_from(state.holds.hold_duration().as_millis()).unwrap_or(u64::MAX),
    }
}
