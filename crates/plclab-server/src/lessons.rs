//! Embedded lesson markdown and HTML rendering.

use plclab_core::lesson::{self, Lesson};
use plclab_core::{LabError, Result};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "../../docs/"]
struct LessonAssets;

/// Ordered lesson identifiers (file stems), as sent in the `lessons` frame.
pub fn list() -> Vec<String> {
    let mut stems: Vec<String> = <LessonAssets as Embed>::iter()
        .filter_map(|path| {
            path.strip_suffix(".md")
                .filter(|stem| !stem.contains('/'))
                .map(str::to_string)
        })
        .collect();
    stems.sort();
    stems
}

/// Raw markdown body for a lesson identifier.
pub fn load_markdown(stem: &str) -> Result<String> {
    // Identifiers are bare file stems; anything path-like cannot match.
    if stem.contains('/') || stem.contains('\\') {
        return Err(LabError::LessonNotFound(stem.to_string()));
    }
    let file = <LessonAssets as Embed>::get(&format!("{stem}.md"))
        .ok_or_else(|| LabError::LessonNotFound(stem.to_string()))?;
    Ok(String::from_utf8_lossy(&file.data).into_owned())
}

/// Lesson body rendered to HTML.
pub fn load_html(stem: &str) -> Result<String> {
    Ok(lesson::render_markdown(&load_markdown(stem)?))
}

/// Catalog entry + rendered body for a lesson id (REST surface).
pub fn by_id(id: u32) -> Result<(&'static Lesson, String)> {
    let entry =
        Lesson::find(id).ok_or_else(|| LabError::LessonNotFound(format!("lesson id {id}")))?;
    let html = load_html(&entry.doc_stem())?;
    Ok((entry, html))
}
