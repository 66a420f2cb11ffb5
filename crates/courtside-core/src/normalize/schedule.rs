// Team schedule (`/teams/{id}/schedule`) → GameRecord list.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{decode_entries, parse_upstream_date, LooseNumber, NormalizeContext, NormalizeError};
use crate::record::{GameRecord, GameStatus, Opponent, Score};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    events: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct Event {
    date: Option<String>,
    competitions: Option<Vec<Competition>>,
    status: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct Competition {
    competitors: Option<Vec<Competitor>>,
    venue: Option<Venue>,
    status: Option<Status>,
    notes: Option<Vec<Note>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Competitor {
    id: Option<String>,
    home_away: Option<String>,
    team: Option<TeamRef>,
    score: Option<LooseNumber>,
}

impl Competitor {
    fn team_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or_else(|| self.team.as_ref()?.id.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamRef {
    id: Option<String>,
    display_name: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Venue {
    full_name: Option<String>,
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    city: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    display_clock: Option<String>,
    period: Option<u32>,
    #[serde(rename = "type")]
    kind: Option<StatusType>,
}

#[derive(Debug, Deserialize)]
struct StatusType {
    state: Option<String>,
    completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Note {
    headline: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a schedule payload, keeping upstream order.
pub fn normalize_schedule(
    payload: Value,
    ctx: &NormalizeContext,
) -> Result<Vec<GameRecord>, NormalizeError> {
    let response: ScheduleResponse = serde_json::from_value(payload)?;
    let events = response.events.ok_or(NormalizeError::MissingField("events"))?;

    let total = events.len();
    let games: Vec<GameRecord> = decode_entries::<Event>(events, "schedule event")
        .into_iter()
        .enumerate()
        .filter_map(|(idx, event)| {
            let game = normalize_event(&event?, ctx);
            if game.is_none() {
                warn!(index = idx, "skipping malformed schedule event");
            }
            game
        })
        .collect();

    if total > 0 && games.is_empty() {
        return Err(NormalizeError::NoUsableEntries(total));
    }
    Ok(games)
}

fn normalize_event(event: &Event, ctx: &NormalizeContext) -> Option<GameRecord> {
    let date = parse_upstream_date(event.date.as_deref()?)?;
    let competition = event.competitions.as_ref()?.first()?;
    let competitors = competition.competitors.as_ref()?;

    let tracked = competitors
        .iter()
        .find(|c| c.team_id() == Some(ctx.team_id.as_str()))?;
    let other = competitors
        .iter()
        .find(|c| c.team_id() != Some(ctx.team_id.as_str()))?;

    let is_home = tracked.home_away.as_deref() == Some("home");
    let other_team = other.team.as_ref()?;
    let name = other_team.display_name.clone()?;

    let location = if is_home {
        ctx.venue.clone()
    } else {
        competition
            .venue
            .as_ref()
            .and_then(venue_label)
            .or_else(|| other_team.location.clone())
            .unwrap_or_default()
    };

    let status = event
        .status
        .as_ref()
        .or(competition.status.as_ref())
        .map(game_status)
        .unwrap_or(GameStatus::Scheduled);

    let score = match (
        tracked.score.as_ref().and_then(LooseNumber::as_u32),
        other.score.as_ref().and_then(LooseNumber::as_u32),
    ) {
        (Some(team), Some(opponent)) if status != GameStatus::Scheduled => {
            Some(Score::from_sides(is_home, team, opponent))
        }
        _ => None,
    };

    let note = competition
        .notes
        .as_ref()
        .and_then(|notes| notes.first())
        .and_then(|n| n.headline.clone())
        .filter(|h| !h.trim().is_empty());

    Some(GameRecord {
        date,
        date_only: false,
        opponent: Opponent { name, location },
        is_home,
        status,
        score,
        note,
    })
}

/// "City, ST" when the address is known, else the venue name.
fn venue_label(venue: &Venue) -> Option<String> {
    let address = venue.address.as_ref();
    match (
        address.and_then(|a| a.city.as_deref()),
        address.and_then(|a| a.state.as_deref()),
    ) {
        (Some(city), Some(state)) => Some(format!("{city}, {state}")),
        (Some(city), None) => Some(city.to_string()),
        _ => venue.full_name.clone(),
    }
}

fn game_status(status: &Status) -> GameStatus {
    let kind = status.kind.as_ref();
    let state = kind.and_then(|k| k.state.as_deref());
    let completed = kind.and_then(|k| k.completed).unwrap_or(false);

    if state == Some("in") {
        GameStatus::Live {
            clock: status.display_clock.clone().unwrap_or_default(),
            period: status.period.unwrap_or(1),
        }
    } else if completed || state == Some("post") {
        GameStatus::Final
    } else {
        GameStatus::Scheduled
    }
}
