// Team roster (`/teams/{id}/roster`) → PlayerRecord list, sorted by jersey.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{decode_entries, LooseNumber, NormalizeError};
use crate::record::player::{sort_by_jersey, PlayerRecord};

/// Shown when upstream has no position for a player.
const DEFAULT_POSITION: &str = "Guard";

#[derive(Debug, Deserialize)]
struct RosterResponse {
    athletes: Option<Vec<Value>>,
}

/// College rosters are a flat athlete list; some sports group athletes by
/// position under `items`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AthleteEntry {
    Group { items: Vec<Value> },
    Single(Athlete),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Athlete {
    full_name: Option<String>,
    display_name: Option<String>,
    jersey: Option<LooseNumber>,
    position: Option<PositionRef>,
    display_height: Option<String>,
    display_weight: Option<String>,
    experience: Option<Experience>,
    birth_place: Option<Place>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionRef {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Experience {
    display_value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Place {
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// Normalize a roster payload and order it by jersey number.
pub fn normalize_roster(payload: Value) -> Result<Vec<PlayerRecord>, NormalizeError> {
    let response: RosterResponse = serde_json::from_value(payload)?;
    let entries = response
        .athletes
        .ok_or(NormalizeError::MissingField("athletes"))?;

    let athletes: Vec<Option<Athlete>> = decode_entries::<AthleteEntry>(entries, "roster entry")
        .into_iter()
        .flat_map(|entry| match entry {
            Some(AthleteEntry::Group { items }) => decode_entries::<Athlete>(items, "roster entry"),
            Some(AthleteEntry::Single(athlete)) => vec![Some(athlete)],
            None => vec![None],
        })
        .collect();

    let total = athletes.len();
    let mut players: Vec<PlayerRecord> = athletes
        .into_iter()
        .enumerate()
        .filter_map(|(idx, athlete)| {
            let player = normalize_athlete(athlete?);
            if player.is_none() {
                warn!(index = idx, "skipping roster entry without a name");
            }
            player
        })
        .collect();

    if total > 0 && players.is_empty() {
        return Err(NormalizeError::NoUsableEntries(total));
    }

    sort_by_jersey(&mut players);
    Ok(players)
}

fn normalize_athlete(athlete: Athlete) -> Option<PlayerRecord> {
    let name = athlete
        .full_name
        .or(athlete.display_name)
        .filter(|n| !n.trim().is_empty())?;

    let position = athlete
        .position
        .and_then(|p| p.display_name)
        .unwrap_or_else(|| DEFAULT_POSITION.to_string());

    Some(PlayerRecord {
        jersey: athlete.jersey.as_ref().and_then(LooseNumber::as_u32),
        name,
        position,
        height: non_empty(athlete.display_height),
        weight: non_empty(athlete.display_weight),
        experience: athlete.experience.and_then(|e| non_empty(e.display_value)),
        hometown: athlete.birth_place.and_then(hometown),
        note: None,
    })
}

fn hometown(place: Place) -> Option<String> {
    let city = non_empty(place.city)?;
    match non_empty(place.state).or(non_empty(place.country)) {
        Some(region) => Some(format!("{city}, {region}")),
        None => Some(city),
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}
