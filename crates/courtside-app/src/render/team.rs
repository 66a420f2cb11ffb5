// Team summary card: name, overall record, standing blurb, stat lines.

use courtside_core::record::TeamSummary;

use super::{empty_message, escape};
use crate::region::RegionUpdate;

pub const EMPTY_TEAM: &str = "Team information not available.";

pub fn render(summaries: &[TeamSummary]) -> RegionUpdate {
    match summaries.first() {
        Some(summary) => RegionUpdate::Replace(build_card(summary)),
        None => RegionUpdate::Replace(empty_message(EMPTY_TEAM)),
    }
}

fn build_card(summary: &TeamSummary) -> String {
    let mut html = format!(
        "<div class=\"team-summary\"><h3>{}</h3>",
        escape(&summary.name)
    );
    if let Some(record) = &summary.record_summary {
        html.push_str(&format!(
            "<p class=\"team-record\">{}</p>",
            escape(record)
        ));
    }
    if let Some(standing) = &summary.standing_summary {
        html.push_str(&format!(
            "<p class=\"text-warning\">{}</p>",
            escape(standing)
        ));
    }
    if !summary.stats.is_empty() {
        html.push_str("<ul class=\"team-stats\">");
        for line in &summary.stats {
            html.push_str(&format!(
                "<li><span class=\"stat-label\">{}</span> <span class=\"stat-value\">{}</span></li>",
                escape(&line.label),
                escape(&line.value)
            ));
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    html
}
