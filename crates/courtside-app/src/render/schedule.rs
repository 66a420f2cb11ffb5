// Schedule views: full timeline, upcoming games, recent results.
//
// All three share one item layout:
//   date + time | "vs"/"@" opponent + location | result badge + note
// Completed games get a `win`/`loss` class and a `W 85-77` style badge;
// in-progress games get a LIVE badge; scheduled games get neither.

use courtside_core::record::{GameRecord, GameResult, GameStatus};

use super::{empty_message, escape, note_line, RenderContext};
use crate::region::RegionUpdate;

pub const EMPTY_SCHEDULE: &str = "No games on the schedule.";
pub const EMPTY_UPCOMING: &str = "No upcoming games scheduled.";
pub const EMPTY_RECENT: &str = "No recent results.";

/// Full timeline, at most `limit` games in upstream order.
pub fn render_timeline(games: &[GameRecord], limit: usize, ctx: &RenderContext) -> RegionUpdate {
    let shown: Vec<&GameRecord> = games.iter().take(limit).collect();
    RegionUpdate::Replace(build_list("schedule-timeline", &shown, EMPTY_SCHEDULE, ctx))
}

/// Games that have not started, soonest first as upstream lists them.
pub fn render_upcoming(games: &[GameRecord], limit: usize, ctx: &RenderContext) -> RegionUpdate {
    let shown: Vec<&GameRecord> = games
        .iter()
        .filter(|g| g.is_scheduled())
        .take(limit)
        .collect();
    RegionUpdate::Replace(build_list("upcoming-games", &shown, EMPTY_UPCOMING, ctx))
}

/// The last `limit` completed games, kept in upstream order.
pub fn render_recent(games: &[GameRecord], limit: usize, ctx: &RenderContext) -> RegionUpdate {
    let finals: Vec<&GameRecord> = games.iter().filter(|g| g.is_final()).collect();
    let start = finals.len().saturating_sub(limit);
    RegionUpdate::Replace(build_list("recent-games", &finals[start..], EMPTY_RECENT, ctx))
}

fn build_list(class: &str, games: &[&GameRecord], empty: &str, ctx: &RenderContext) -> String {
    if games.is_empty() {
        return empty_message(empty);
    }
    let mut html = format!("<div class=\"{class}\">");
    for game in games {
        html.push_str(&build_item(game, ctx));
    }
    html.push_str("</div>");
    html
}

fn build_item(game: &GameRecord, ctx: &RenderContext) -> String {
    let result_class = match game.result() {
        Some(GameResult::Win) => " win",
        Some(GameResult::Loss) => " loss",
        None => "",
    };
    let matchup = if game.is_home { "vs" } else { "@" };

    format!(
        "<div class=\"schedule-item{result_class}\">\
         <div class=\"row align-items-center\">\
         <div class=\"col-md-3\">{when}</div>\
         <div class=\"col-md-5\"><strong>{matchup} {opponent}</strong><br>\
         <small class=\"text-muted\">{location}</small></div>\
         <div class=\"col-md-4 text-end\">{badge}{note}</div>\
         </div></div>",
        when = when_cell(game, ctx),
        opponent = escape(&game.opponent.name),
        location = escape(&game.opponent.location),
        badge = result_badge(game),
        note = note_line(game.note.as_deref()),
    )
}

/// Date and tip-off time. Date-only records are calendar days, so they are
/// shown as stored and without a time.
fn when_cell(game: &GameRecord, ctx: &RenderContext) -> String {
    if game.date_only {
        return format!("<strong>{}</strong>", game.date.format("%b %-d, %Y"));
    }
    format!(
        "<strong>{}</strong><br><small>{}</small>",
        ctx.date_label(game.date),
        ctx.time_label(game.date)
    )
}

/// Badge for the right-hand column. Empty when there is nothing to report,
/// including finals whose score was not numeric.
pub fn result_badge(game: &GameRecord) -> String {
    if let GameStatus::Live { .. } = game.status {
        return "<span class=\"badge bg-warning\">LIVE</span>".to_string();
    }
    match (game.result(), game.team_score(), game.opponent_score()) {
        (Some(result), Some(team), Some(opponent)) => {
            let color = match result {
                GameResult::Win => "success",
                GameResult::Loss => "danger",
            };
            format!(
                "<span class=\"badge bg-{color}\">{} {team}-{opponent}</span>",
                result.letter()
            )
        }
        _ => String::new(),
    }
}
