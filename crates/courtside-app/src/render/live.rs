// Live game card.
//
// Layout:
//   <away team>  <away score> - <home score>  <home team>
//   <clock> | <period>
// Hidden when no game is in progress.

use courtside_core::record::game::{find_live, period_label};
use courtside_core::record::{GameRecord, GameStatus};

use super::escape;
use crate::region::RegionUpdate;

/// Show the first live game in `games`, or hide the card. `team_name` is the
/// tracked side's display name (records only carry the opponent).
pub fn render(games: &[GameRecord], team_name: &str) -> RegionUpdate {
    match find_live(games) {
        Some(game) => RegionUpdate::Replace(build_card(game, team_name)),
        None => RegionUpdate::Hide,
    }
}

fn build_card(game: &GameRecord, team_name: &str) -> String {
    let (home_name, away_name) = if game.is_home {
        (team_name, game.opponent.name.as_str())
    } else {
        (game.opponent.name.as_str(), team_name)
    };
    let (home_score, away_score) = match game.score {
        Some(score) => (score.home.to_string(), score.away.to_string()),
        None => ("-".to_string(), "-".to_string()),
    };
    let status_line = match &game.status {
        GameStatus::Live { clock, period } => {
            format!("{} | {}", escape(clock), period_label(*period))
        }
        _ => String::new(),
    };

    format!(
        "<div class=\"live-score\">\
         <h2 class=\"mb-3\">\
         <span class=\"text-primary\">{away}</span>\
         <span class=\"mx-3\">{away_score} - {home_score}</span>\
         <span class=\"text-primary\">{home}</span>\
         </h2>\
         <p class=\"text-muted\">{status_line}</p>\
         </div>",
        away = escape(away_name),
        home = escape(home_name),
    )
}
