// Game records: one scheduled, live or completed game from the tracked
// team's point of view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The other side of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opponent {
    pub name: String,
    /// Venue or city shown under the opponent's name.
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Scheduled,
    Live { clock: String, period: u32 },
    Final,
}

/// Points scored by the home and away sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    /// Build a score from the tracked team's perspective.
    pub fn from_sides(is_home: bool, team: u32, opponent: u32) -> Self {
        if is_home {
            Score {
                home: team,
                away: opponent,
            }
        } else {
            Score {
                home: opponent,
                away: team,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    pub fn letter(&self) -> &'static str {
        match self {
            GameResult::Win => "W",
            GameResult::Loss => "L",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: DateTime<Utc>,
    /// `date` is a calendar day at midnight UTC with no known tip-off time.
    #[serde(default)]
    pub date_only: bool,
    pub opponent: Opponent,
    pub is_home: bool,
    pub status: GameStatus,
    /// `None` when either side's score is missing or not a number.
    pub score: Option<Score>,
    /// Free-form label such as a tournament round.
    pub note: Option<String>,
}

impl GameRecord {
    pub fn is_live(&self) -> bool {
        matches!(self.status, GameStatus::Live { .. })
    }

    pub fn is_final(&self) -> bool {
        self.status == GameStatus::Final
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == GameStatus::Scheduled
    }

    pub fn team_score(&self) -> Option<u32> {
        self.score
            .map(|s| if self.is_home { s.home } else { s.away })
    }

    pub fn opponent_score(&self) -> Option<u32> {
        self.score
            .map(|s| if self.is_home { s.away } else { s.home })
    }

    /// Win or loss for a completed game. Strictly more points is a win;
    /// anything else is a loss (basketball has no ties). Games that are not
    /// final, or have no usable score, have no result.
    pub fn result(&self) -> Option<GameResult> {
        if !self.is_final() {
            return None;
        }
        let (team, opponent) = (self.team_score()?, self.opponent_score()?);
        Some(if team > opponent {
            GameResult::Win
        } else {
            GameResult::Loss
        })
    }
}

/// First in-progress game, if any. With more than one live entry the
/// earliest in upstream order wins.
pub fn find_live(games: &[GameRecord]) -> Option<&GameRecord> {
    games.iter().find(|g| g.is_live())
}

/// First scheduled game that has not started yet.
pub fn next_scheduled(games: &[GameRecord], now: DateTime<Utc>) -> Option<&GameRecord> {
    games.iter().find(|g| g.is_scheduled() && g.date > now)
}

/// Human label for a basketball period: halves, then overtimes.
pub fn period_label(period: u32) -> String {
    match period {
        0 | 1 => "1st Half".to_string(),
        2 => "2nd Half".to_string(),
        3 => "OT".to_string(),
        n => format!("{}OT", n - 2),
    }
}
