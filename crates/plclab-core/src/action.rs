use crate::error::{LabError, Result};
use crate::image::ProcessImage;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A validated client request against the process image.
///
/// All inbound payload shapes (canonical `action_type` objects and the legacy
/// `flip` form) are normalized into these two variants at the protocol
/// boundary; nothing downstream ever sees a raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Flip the discrete input at `address`.
    ToggleInput { address: usize },
    /// Set the holding register at `address`.
    SetRegister { address: usize, value: i64 },
}

impl Action {
    /// Normalize an inbound `action` payload.
    ///
    /// Accepted shapes:
    /// - `{"action_type": "toggle_input", "address": 5}`
    /// - `{"action_type": "set_register", "address": 5, "value": 800}`
    /// - `{"flip": "5"}` — legacy toggle, address as string or number
    pub fn parse(payload: &Value) -> Result<Action> {
        let obj = payload
            .as_object()
            .ok_or_else(|| LabError::Malformed("action payload must be an object".into()))?;

        // Legacy shape predates action_type and wins when present.
        if let Some(flip) = obj.get("flip") {
            return Ok(Action::ToggleInput {
                address: coerce_address(flip)?,
            });
        }

        let kind = obj
            .get("action_type")
            .and_then(Value::as_str)
            .ok_or_else(|| LabError::Malformed("missing action_type".into()))?;

        let address = coerce_address(
            obj.get("address")
                .ok_or_else(|| LabError::Malformed("missing address".into()))?,
        )?;

        match kind {
            "toggle_input" => Ok(Action::ToggleInput { address }),
            "set_register" => {
                let value = coerce_int(
                    obj.get("value")
                        .ok_or_else(|| LabError::Malformed("missing value".into()))?,
                )?;
                Ok(Action::SetRegister { address, value })
            }
            other => Err(LabError::UnknownKind(other.to_string())),
        }
    }

    /// Apply the action through the image's validated entry points.
    pub fn apply(&self, image: &mut ProcessImage) -> Result<()> {
        match *self {
            Action::ToggleInput { address } => image.toggle_discrete_input(address),
            Action::SetRegister { address, value } => image.set_holding_register(address, value),
        }
    }
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

/// Coerce a JSON value into a register address.
///
/// Numbers and numeric strings are accepted (the legacy frontend sent
/// addresses as strings); anything else is a malformed frame.
pub fn coerce_address(value: &Value) -> Result<usize> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|a| a as usize)
            .ok_or_else(|| LabError::Malformed(format!("address must be a non-negative integer, got {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<usize>()
            .map_err(|_| LabError::Malformed(format!("address must be a non-negative integer, got {s:?}"))),
        other => Err(LabError::Malformed(format!(
            "address must be a non-negative integer, got {other}"
        ))),
    }
}

/// Coerce a JSON value into a register value.
pub fn coerce_int(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| LabError::Malformed(format!("value must be an integer, got {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| LabError::Malformed(format!("value must be an integer, got {s:?}"))),
        other => Err(LabError::Malformed(format!(
            "value must be an integer, got {other}"
        ))),
    }
}

/// Coerce a JSON value into a coil state. Booleans and numbers (zero is off)
/// are accepted, matching the original write-coil endpoint.
pub fn coerce_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        other => Err(LabError::Malformed(format!(
            "value must be a boolean, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
