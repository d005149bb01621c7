use plclab_core::image::Snapshot;
use plclab_core::{LabError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Inbound frames
// ---------------------------------------------------------------------------

/// A decoded client → server frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Inbound {
    /// Request a lesson body by identifier.
    Lesson(String),
    /// A register action; the payload is normalized by `Action::parse`.
    Action(Value),
    /// Liveness probe, answered with `pong`.
    Ping,
}

/// Decode one inbound text frame.
///
/// Distinguishes the three failure classes the session handler reports:
/// not JSON / wrong shape → `Malformed`, unrecognized `kind` → `UnknownKind`.
pub fn decode(text: &str) -> Result<Inbound> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| LabError::Malformed(format!("invalid JSON: {e}")))?;

    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| LabError::Malformed("missing kind".into()))?;

    match kind.as_str() {
        "lesson" | "action" | "ping" => serde_json::from_value(value)
            .map_err(|e| LabError::Malformed(format!("bad {kind} frame: {e}"))),
        _ => Err(LabError::UnknownKind(kind)),
    }
}

// ---------------------------------------------------------------------------
// Outbound frames
// ---------------------------------------------------------------------------

/// A server → client frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Outbound {
    /// Ordered lesson identifiers, sent once on connect.
    Lessons(Vec<String>),
    /// One lesson body rendered to HTML.
    Lesson(String),
    /// Full process-image snapshot.
    State(Snapshot),
    /// Human-readable failure for the offending session only.
    Error(String),
    Pong,
}

impl Outbound {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
