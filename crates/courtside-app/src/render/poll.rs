// Fan poll results: one progress bar per option.

use courtside_core::poll::PollResults;

use super::escape;
use crate::region::RegionUpdate;

pub fn render(question: &str, results: &PollResults, notice: Option<&str>) -> RegionUpdate {
    let mut html = format!(
        "<div class=\"poll-results\"><h4>{}</h4>",
        escape(question)
    );
    if let Some(notice) = notice {
        html.push_str(&format!(
            "<div class=\"alert alert-info\">{}</div>",
            escape(notice)
        ));
    }
    for row in &results.rows {
        html.push_str(&format!(
            "<div class=\"poll-option\" data-option=\"{id}\">\
             <div class=\"d-flex justify-content-between\"><span>{label}</span><span>{percent}%</span></div>\
             <div class=\"progress\"><div class=\"progress-bar\" style=\"width: {percent}%\"></div></div>\
             </div>",
            id = escape(&row.id),
            label = escape(&row.label),
            percent = row.percent,
        ));
    }
    html.push_str(&format!(
        "<small class=\"text-muted\">{} vote{}</small></div>",
        results.total_votes,
        if results.total_votes == 1 { "" } else { "s" }
    ));
    RegionUpdate::Replace(html)
}
