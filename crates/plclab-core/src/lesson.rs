use pulldown_cmark::{html, Options, Parser};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One entry in the fixed training catalog.
///
/// Lessons are immutable and compiled in; `content` is the key the lesson
/// body markdown file is named after (`docs/0<id>_<content>.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lesson {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub content: &'static str,
}

static CATALOG: [Lesson; 5] = [
    Lesson {
        id: 1,
        title: "Introduction to PLCs",
        description: "Learn the basics of Programmable Logic Controllers",
        content: "intro",
    },
    Lesson {
        id: 2,
        title: "MODBUS Protocol",
        description: "Understanding MODBUS communication protocol",
        content: "modbus",
    },
    Lesson {
        id: 3,
        title: "Ladder Logic Programming",
        description: "Programming PLCs with ladder logic",
        content: "ladder_logic",
    },
    Lesson {
        id: 4,
        title: "HMI and SCADA Systems",
        description: "Human Machine Interface and SCADA concepts",
        content: "hmi_scada",
    },
    Lesson {
        id: 5,
        title: "Industrial Networking",
        description: "Networking in industrial automation",
        content: "networking",
    },
];

/// The full catalog, in lesson-id order.
pub fn catalog() -> &'static [Lesson] {
    &CATALOG
}

impl Lesson {
    pub fn find(id: u32) -> Option<&'static Lesson> {
        CATALOG.iter().find(|l| l.id == id)
    }

    /// File stem of the lesson body, e.g. `01_intro`.
    pub fn doc_stem(&self) -> String {
        format!("{:02}_{}", self.id, self.content)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a lesson body from markdown to HTML.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_ordered_by_id() {
        let ids: Vec<u32> = catalog().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(Lesson::find(2).unwrap().content, "modbus");
        assert!(Lesson::find(99).is_none());
    }

    #[test]
    fn doc_stem_matches_file_naming() {
        assert_eq!(Lesson::find(1).unwrap().doc_stem(), "01_intro");
        assert_eq!(Lesson::find(3).unwrap().doc_stem(), "03_ladder_logic");
    }

    #[test]
    fn render_markdown_produces_html() {
        let html = render_markdown("# Heading\n\nSome *text*.");
        assert!(html.contains("<h1>Heading</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn render_markdown_handles_tables() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }
}
