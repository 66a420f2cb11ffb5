// Roster grid: one player card per player, in jersey order.
//
// Card:
//   #<jersey>
//   <name>
//   <position>
//   <experience | height | weight>
//   [note]

use courtside_core::record::PlayerRecord;

use super::{empty_message, escape, note_line};
use crate::region::RegionUpdate;

pub const EMPTY_ROSTER: &str = "Roster not available.";

/// Render the first `limit` players. Callers pass players already sorted by
/// jersey (both the normalizer and the fallback set guarantee this).
pub fn render(players: &[PlayerRecord], limit: usize) -> RegionUpdate {
    if players.is_empty() {
        return RegionUpdate::Replace(empty_message(EMPTY_ROSTER));
    }
    let html: String = players.iter().take(limit).map(build_card).collect();
    RegionUpdate::Replace(html)
}

fn build_card(player: &PlayerRecord) -> String {
    format!(
        "<div class=\"col-md-3 col-6 mb-4\">\
         <div class=\"player-card\">\
         <div class=\"player-image\"></div>\
         <div class=\"player-info\">\
         <div class=\"player-number\">{jersey}</div>\
         <div class=\"player-name\">{name}</div>\
         <small class=\"text-muted\">{position}</small><br>\
         <small>{details}</small>{hometown}{note}\
         </div></div></div>",
        jersey = player.jersey_label(),
        name = escape(&player.name),
        position = escape(&player.position),
        details = escape(&detail_line(player)),
        hometown = hometown_line(player.hometown.as_deref()),
        note = note_line(player.note.as_deref()),
    )
}

/// "Senior | 6' 3\" | 195 lbs", skipping whatever is missing.
fn detail_line(player: &PlayerRecord) -> String {
    [&player.experience, &player.height, &player.weight]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ")
}

fn hometown_line(hometown: Option<&str>) -> String {
    hometown
        .map(|h| format!("<br><small class=\"text-muted\">{}</small>", escape(h)))
        .unwrap_or_default()
}
