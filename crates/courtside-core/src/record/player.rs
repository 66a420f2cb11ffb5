// Player records and roster ordering.

use serde::{Deserialize, Serialize};

/// Sort key used for players without a jersey number. Real numbers stay
/// below it so unnumbered players sink to the end.
pub const MISSING_JERSEY_SORT_KEY: u32 = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub jersey: Option<u32>,
    pub name: String,
    pub position: String,
    pub height: Option<String>,
    pub weight: Option<String>,
    /// Class year or experience label ("Senior", "2nd Season").
    pub experience: Option<String>,
    pub hometown: Option<String>,
    pub note: Option<String>,
}

impl PlayerRecord {
    pub fn jersey_label(&self) -> String {
        match self.jersey {
            Some(n) => format!("#{n}"),
            None => "#--".to_string(),
        }
    }

    fn sort_key(&self) -> u32 {
        self.jersey.unwrap_or(MISSING_JERSEY_SORT_KEY)
    }
}

/// Order a roster by jersey number, ascending. Unnumbered players sort as
/// 99 and keep their relative order.
pub fn sort_by_jersey(players: &mut [PlayerRecord]) {
    // slice::sort_by_key is stable.
    players.sort_by_key(PlayerRecord::sort_key);
}
