// HTML renderers, one module per kind of page region.
//
// Each module exposes `render*(..) -> RegionUpdate` built from normalized
// records. Renderers are pure (no I/O, no clock reads), so region content
// is reproducible in tests.

pub mod countdown;
pub mod live;
pub mod poll;
pub mod roster;
pub mod schedule;
pub mod standings;
pub mod team;
pub mod weather;

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Display settings shared by renderers that show dates.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub offset: FixedOffset,
}

impl RenderContext {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// "Mar 1, 2025"
    pub fn date_label(&self, date: DateTime<Utc>) -> String {
        date.with_timezone(&self.offset)
            .format("%b %-d, %Y")
            .to_string()
    }

    /// "7:00 PM"
    pub fn time_label(&self, date: DateTime<Utc>) -> String {
        date.with_timezone(&self.offset)
            .format("%-I:%M %p")
            .to_string()
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }
}

/// Escape text for inclusion in HTML element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The explicit "nothing to show" content for an empty record set.
pub fn empty_message(text: &str) -> String {
    format!(
        "<div class=\"empty-state\"><p class=\"text-muted\">{}</p></div>",
        escape(text)
    )
}

/// Optional `<small class="text-warning">` note line.
pub(crate) fn note_line(note: Option<&str>) -> String {
    match note {
        Some(note) => format!("<br><small class=\"text-warning\">{}</small>", escape(note)),
        None => String::new(),
    }
}
