// Static record sets rendered when live data cannot be fetched.
//
// The schedule and roster are embedded CSV snapshots of the 2025 title
// season; they are parsed once when the refresh tasks are built.

use serde::Deserialize;
use thiserror::Error;

use crate::normalize::parse_upstream_date;
use crate::record::player::sort_by_jersey;
use crate::record::{GameRecord, GameStatus, Opponent, PlayerRecord, Score, StatLine, TeamSummary};

const FALLBACK_SCHEDULE: &str = include_str!("../data/fallback_schedule.csv");
const FALLBACK_ROSTER: &str = include_str!("../data/fallback_roster.csv");

#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("failed to parse fallback data: {0}")]
    Csv(#[from] csv::Error),

    #[error("bad date `{value}` in fallback schedule row {row}")]
    BadDate { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    date: String,
    opponent: String,
    location: String,
    is_home: bool,
    team_score: Option<u32>,
    opponent_score: Option<u32>,
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    jersey: Option<u32>,
    name: String,
    position: String,
    experience: Option<String>,
    height: Option<String>,
    weight: Option<String>,
    note: Option<String>,
}

/// Completed games from the 2025 run, oldest first (the same order the
/// schedule endpoint uses).
pub fn schedule() -> Result<Vec<GameRecord>, FallbackError> {
    let mut reader = csv::Reader::from_reader(FALLBACK_SCHEDULE.as_bytes());
    let mut games = Vec::new();

    for (idx, row) in reader.deserialize::<ScheduleRow>().enumerate() {
        let row = row?;
        let date = parse_upstream_date(&row.date).ok_or_else(|| FallbackError::BadDate {
            row: idx + 1,
            value: row.date.clone(),
        })?;
        let score = match (row.team_score, row.opponent_score) {
            (Some(team), Some(opponent)) => Some(Score::from_sides(row.is_home, team, opponent)),
            _ => None,
        };
        games.push(GameRecord {
            date,
            date_only: true,
            opponent: Opponent {
                name: row.opponent,
                location: row.location,
            },
            is_home: row.is_home,
            status: if score.is_some() {
                GameStatus::Final
            } else {
                GameStatus::Scheduled
            },
            score,
            note: row.note,
        });
    }

    Ok(games)
}

/// The 2025 roster, ordered by jersey number.
pub fn roster() -> Result<Vec<PlayerRecord>, FallbackError> {
    let mut reader = csv::Reader::from_reader(FALLBACK_ROSTER.as_bytes());
    let mut players = reader
        .deserialize::<RosterRow>()
        .map(|row| {
            let row = row?;
            Ok(PlayerRecord {
                jersey: row.jersey,
                name: row.name,
                position: row.position,
                height: row.height,
                weight: row.weight,
                experience: row.experience,
                hometown: None,
                note: row.note,
            })
        })
        .collect::<Result<Vec<_>, FallbackError>>()?;
    sort_by_jersey(&mut players);
    Ok(players)
}

pub fn team_summary(team_name: &str) -> Vec<TeamSummary> {
    vec![TeamSummary {
        name: team_name.to_string(),
        record_summary: Some("36-4".to_string()),
        standing_summary: Some("2025 National Champions".to_string()),
        stats: vec![
            StatLine {
                label: "Overall".to_string(),
                value: "36-4".to_string(),
            },
            StatLine {
                label: "SEC Tournament".to_string(),
                value: "Champions".to_string(),
            },
            StatLine {
                label: "NCAA Tournament".to_string(),
                value: "Champions".to_string(),
            },
        ],
    }]
}
