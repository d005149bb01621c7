use axum::extract::State;
use axum::Json;
use plclab_core::action::{self, Action};
use plclab_core::image::Snapshot;

use crate::broadcast;
use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct WriteBody {
    pub address: usize,
    pub value: serde_json::Value,
}

/// GET /api/modbus/registers — current full snapshot.
pub async fn get_registers(State(app): State<AppState>) -> Json<Snapshot> {
    Json(app.snapshot())
}

/// POST /api/modbus/write-coil — set one coil and fan the new state out to
/// every connected viewer, the same as a WebSocket action would.
pub async fn write_coil(
    State(app): State<AppState>,
    Json(body): Json<WriteBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let value = action::coerce_bool(&body.value)?;
    let snapshot = app.set_coil(body.address, value)?;
    broadcast::broadcast_state(&app.registry, snapshot);
    Ok(Json(serde_json::json!({
        "success": true,
        "address": body.address,
        "value": value,
    })))
}

/// POST /api/modbus/write-register — set one holding register and broadcast.
pub async fn write_register(
    State(app): State<AppState>,
    Json(body): Json<WriteBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let value = action::coerce_int(&body.value)?;
    let snapshot = app.apply(&Action::SetRegister {
        address: body.address,
        value,
    })?;
    let stored = snapshot.holding_registers[body.address];
    broadcast::broadcast_state(&app.registry, snapshot);
    Ok(Json(serde_json::json!({
        "success": true,
        "address": body.address,
        "value": stored,
    })))
}
