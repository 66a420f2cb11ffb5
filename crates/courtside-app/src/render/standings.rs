// Conference standings table.
//
// Columns: Team | W | L | Pct | Conf
// The tracked team's row is highlighted.

use courtside_core::record::StandingRow;

use super::{empty_message, escape};
use crate::region::RegionUpdate;

pub const EMPTY_STANDINGS: &str = "Standings not available.";

pub fn render(rows: &[StandingRow]) -> RegionUpdate {
    if rows.is_empty() {
        return RegionUpdate::Replace(empty_message(EMPTY_STANDINGS));
    }

    let mut html = String::from(
        "<table class=\"table standings\"><thead><tr>\
         <th>Team</th><th>W</th><th>L</th><th>Pct</th><th>Conf</th>\
         </tr></thead><tbody>",
    );
    for row in rows {
        html.push_str(&build_row(row));
    }
    html.push_str("</tbody></table>");
    RegionUpdate::Replace(html)
}

fn build_row(row: &StandingRow) -> String {
    let class = if row.is_tracked {
        " class=\"table-warning\""
    } else {
        ""
    };
    format!(
        "<tr{class}><td>{team}</td><td>{wins}</td><td>{losses}</td><td>{pct}</td><td>{conf}</td></tr>",
        team = escape(&row.team),
        wins = row.wins,
        losses = row.losses,
        pct = row.win_pct_label(),
        conf = escape(row.conference_record.as_deref().unwrap_or("-")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(team: &str, wins: u32, losses: u32, is_tracked: bool) -> StandingRow {
        StandingRow {
            team: team.into(),
            wins,
            losses,
            conference_record: None,
            is_tracked,
        }
    }

    #[test]
    fn renders_rows_in_order_and_highlights_tracked_team() {
        let rows = vec![
            row("Auburn Tigers", 32, 6, false),
            row("Florida Gators", 36, 4, true),
        ];
        let RegionUpdate::Replace(html) = render(&rows) else {
            panic!("expected table");
        };
        assert!(html.find("Auburn Tigers").unwrap() < html.find("Florida Gators").unwrap());
        assert!(html.contains("<tr class=\"table-warning\"><td>Florida Gators</td><td>36</td><td>4</td><td>.900</td><td>-</td></tr>"));
        assert_eq!(html.matches("<tr").count(), 3);
    }

    #[test]
    fn empty_renders_message() {
        let RegionUpdate::Replace(html) = render(&[]) else {
            panic!("expected message");
        };
        assert!(html.contains(EMPTY_STANDINGS));
    }
}
