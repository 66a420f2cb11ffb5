// Team-level records: the tracked team's summary card and conference
// standings rows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub name: String,
    /// Overall record, e.g. "36-4".
    pub record_summary: Option<String>,
    /// Upstream standing blurb, e.g. "1st in SEC".
    pub standing_summary: Option<String>,
    pub stats: Vec<StatLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub conference_record: Option<String>,
    /// True for the row belonging to the configured team.
    pub is_tracked: bool,
}

impl StandingRow {
    /// Winning percentage rounded to three places, formatted like ".750".
    pub fn win_pct_label(&self) -> String {
        let games = self.wins + self.losses;
        if games == 0 {
            return ".000".to_string();
        }
        let pct = self.wins as f64 / games as f64;
        let formatted = format!("{pct:.3}");
        formatted
            .strip_prefix('0')
            .map(str::to_string)
            .unwrap_or(formatted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(wins: u32, losses: u32) -> StandingRow {
        StandingRow {
            team: "Florida Gators".into(),
            wins,
            losses,
            conference_record: None,
            is_tracked: true,
        }
    }

    #[test]
    fn win_pct_formats_like_a_box_score() {
        assert_eq!(row(36, 4).win_pct_label(), ".900");
        assert_eq!(row(0, 0).win_pct_label(), ".000");
        assert_eq!(row(5, 0).win_pct_label(), "1.000");
    }
}
