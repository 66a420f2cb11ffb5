// Team detail (`/teams/{id}`) and conference standings
// (`/standings?group={n}`).

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{decode_entries, LooseNumber, NormalizeContext, NormalizeError};
use crate::record::{StandingRow, StatLine, TeamSummary};

// ---------------------------------------------------------------------------
// Team detail
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TeamResponse {
    team: Option<TeamBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamBody {
    display_name: Option<String>,
    record: Option<RecordBlock>,
    standing_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordBlock {
    items: Option<Vec<RecordItem>>,
}

#[derive(Debug, Deserialize)]
struct RecordItem {
    description: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    summary: Option<String>,
}

impl RecordItem {
    fn label(&self) -> String {
        match self.kind.as_deref() {
            Some("total") => "Overall".to_string(),
            Some("home") => "Home".to_string(),
            Some("road") | Some("away") => "Away".to_string(),
            _ => self
                .description
                .clone()
                .or_else(|| self.kind.clone())
                .unwrap_or_else(|| "Record".to_string()),
        }
    }
}

/// Normalize a team detail payload into a single summary record.
pub fn normalize_team(payload: Value) -> Result<Vec<TeamSummary>, NormalizeError> {
    let response: TeamResponse = serde_json::from_value(payload)?;
    let team = response.team.ok_or(NormalizeError::MissingField("team"))?;
    let name = team
        .display_name
        .ok_or(NormalizeError::MissingField("team.displayName"))?;

    let items = team.record.and_then(|r| r.items).unwrap_or_default();
    let record_summary = items
        .iter()
        .find(|item| item.kind.as_deref() == Some("total"))
        .and_then(|item| item.summary.clone());

    let stats = items
        .iter()
        .filter_map(|item| {
            Some(StatLine {
                label: item.label(),
                value: item.summary.clone()?,
            })
        })
        .collect();

    Ok(vec![TeamSummary {
        name,
        record_summary,
        standing_summary: team.standing_summary,
        stats,
    }])
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StandingsResponse {
    children: Option<Vec<StandingsGroup>>,
    standings: Option<StandingsBlock>,
}

#[derive(Debug, Deserialize)]
struct StandingsGroup {
    standings: Option<StandingsBlock>,
}

#[derive(Debug, Deserialize)]
struct StandingsBlock {
    entries: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct StandingsEntry {
    team: Option<EntryTeam>,
    stats: Option<Vec<StatEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryTeam {
    id: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatEntry {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    value: Option<LooseNumber>,
    display_value: Option<String>,
    summary: Option<String>,
}

impl StatEntry {
    fn is(&self, key: &str) -> bool {
        self.name.as_deref() == Some(key) || self.kind.as_deref() == Some(key)
    }
}

/// Normalize a standings payload. Rows keep upstream order, which is the
/// standings order. Multiple groups are concatenated.
pub fn normalize_standings(
    payload: Value,
    ctx: &NormalizeContext,
) -> Result<Vec<StandingRow>, NormalizeError> {
    let response: StandingsResponse = serde_json::from_value(payload)?;

    let blocks: Vec<StandingsBlock> = match (response.standings, response.children) {
        (Some(block), _) => vec![block],
        (None, Some(children)) => children.into_iter().filter_map(|g| g.standings).collect(),
        (None, None) => return Err(NormalizeError::MissingField("standings")),
    };

    let entries: Vec<Value> = blocks
        .into_iter()
        .flat_map(|b| b.entries.unwrap_or_default())
        .collect();

    let total = entries.len();
    let rows: Vec<StandingRow> = decode_entries::<StandingsEntry>(entries, "standings entry")
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let row = standing_row(&entry?, ctx);
            if row.is_none() {
                warn!(index = idx, "skipping malformed standings entry");
            }
            row
        })
        .collect();

    if total > 0 && rows.is_empty() {
        return Err(NormalizeError::NoUsableEntries(total));
    }
    Ok(rows)
}

fn standing_row(entry: &StandingsEntry, ctx: &NormalizeContext) -> Option<StandingRow> {
    let team = entry.team.as_ref()?;
    let name = team.display_name.clone()?;
    let stats = entry.stats.as_deref().unwrap_or_default();

    let stat_value = |key: &str| {
        stats
            .iter()
            .find(|s| s.is(key))
            .and_then(|s| s.value.as_ref())
            .and_then(LooseNumber::as_u32)
    };

    let conference_record = stats
        .iter()
        .find(|s| s.is("vsconf") || s.is("vs. Conf."))
        .and_then(|s| s.summary.clone().or_else(|| s.display_value.clone()));

    Some(StandingRow {
        team: name,
        wins: stat_value("wins")?,
        losses: stat_value("losses")?,
        conference_record,
        is_tracked: team.id.as_deref() == Some(ctx.team_id.as_str()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> NormalizeContext {
        NormalizeContext {
            team_id: "57".into(),
            venue: "O'Connell Center".into(),
        }
    }

    #[test]
    fn team_summary_from_record_items() {
        let payload = json!({ "team": {
            "id": "57",
            "displayName": "Florida Gators",
            "standingSummary": "1st in SEC",
            "record": { "items": [
                { "description": "Overall Record", "type": "total", "summary": "36-4" },
                { "description": "Home Record", "type": "home", "summary": "16-1" },
                { "description": "Away Record", "type": "road", "summary": "8-2" },
                { "type": "vsconf" }
            ]}
        }});

        let summaries = normalize_team(payload).unwrap();
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.name, "Florida Gators");
        assert_eq!(s.record_summary.as_deref(), Some("36-4"));
        assert_eq!(s.standing_summary.as_deref(), Some("1st in SEC"));
        let labels: Vec<&str> = s.stats.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Overall", "Home", "Away"]);
    }

    #[test]
    fn team_without_record_still_normalizes() {
        let summaries = normalize_team(json!({ "team": { "displayName": "Florida Gators" } })).unwrap();
        assert!(summaries[0].record_summary.is_none());
        assert!(summaries[0].stats.is_empty());
    }

    #[test]
    fn missing_team_is_an_error() {
        let err = normalize_team(json!({})).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingField("team")));
    }

    fn entry(id: &str, name: &str, wins: u32, losses: u32) -> Value {
        json!({
            "team": { "id": id, "displayName": name },
            "stats": [
                { "name": "wins", "value": wins, "displayValue": wins.to_string() },
                { "name": "losses", "value": losses, "displayValue": losses.to_string() },
                { "name": "vs. Conf.", "type": "vsconf", "summary": "14-4" }
            ]
        })
    }

    #[test]
    fn standings_from_children_groups() {
        let payload = json!({ "children": [
            { "name": "SEC", "standings": { "entries": [
                entry("8", "Auburn Tigers", 32, 6),
                entry("57", "Florida Gators", 36, 4),
            ]}}
        ]});
        let rows = normalize_standings(payload, &ctx()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team, "Auburn Tigers");
        assert!(!rows[0].is_tracked);
        assert!(rows[1].is_tracked);
        assert_eq!((rows[1].wins, rows[1].losses), (36, 4));
        assert_eq!(rows[1].conference_record.as_deref(), Some("14-4"));
    }

    #[test]
    fn standings_at_top_level() {
        let payload = json!({ "standings": { "entries": [entry("57", "Florida Gators", 3, 1)] } });
        let rows = normalize_standings(payload, &ctx()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn standings_missing_is_an_error() {
        let err = normalize_standings(json!({ "name": "SEC" }), &ctx()).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingField("standings")));
    }

    #[test]
    fn wrong_typed_entry_only_drops_itself() {
        let payload = json!({ "standings": { "entries": [
            { "team": { "id": 8, "displayName": "Auburn Tigers" }, "stats": [] },
            entry("57", "Florida Gators", 36, 4),
        ]}});
        let rows = normalize_standings(payload, &ctx()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team, "Florida Gators");
    }

    #[test]
    fn entries_without_wins_are_skipped() {
        let payload = json!({ "standings": { "entries": [
            { "team": { "id": "1", "displayName": "No Stats" } },
            entry("57", "Florida Gators", 3, 1),
        ]}});
        let rows = normalize_standings(payload, &ctx()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team, "Florida Gators");
    }
}
