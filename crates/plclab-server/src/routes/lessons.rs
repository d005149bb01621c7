use axum::extract::Path;
use axum::Json;
use plclab_core::lesson::{self, Lesson};

use crate::error::AppError;
use crate::lessons;

/// GET /api/lessons — the full training catalog.
pub async fn list_lessons() -> Json<&'static [Lesson]> {
    Json(lesson::catalog())
}

/// GET /api/lessons/:id — catalog entry plus its body rendered to HTML.
pub async fn get_lesson(Path(id): Path<u32>) -> Result<Json<serde_json::Value>, AppError> {
    let (entry, content) = lessons::by_id(id)?;
    Ok(Json(serde_json::json!({
        "id": entry.id,
        "title": entry.title,
        "description": entry.description,
        "content": content,
    })))
}
