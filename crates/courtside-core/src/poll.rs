// Fan poll: one vote per client, counts kept in the local store.
//
// State lives under two keys, mirroring the site's original browser storage:
// the serialized per-option counts and a flag recording that this client
// already voted. Clearing both keys resets the poll.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{PollConfig, PollOption};
use crate::db::Database;

pub const COUNTS_KEY: &str = "poll_counts";
pub const VOTED_KEY: &str = "poll_voted";

#[derive(Debug, Error)]
pub enum PollError {
    #[error("you have already voted in this poll")]
    AlreadyVoted,

    #[error("unknown poll option `{0}`")]
    UnknownOption(String),

    #[error("poll storage error: {0}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollState {
    pub counts: BTreeMap<String, u64>,
    pub has_voted: bool,
}

impl PollState {
    pub fn total_votes(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Record one vote. Rejected without any change if this client already
    /// voted or the option is not offered.
    pub fn cast_vote(&mut self, option_id: &str, options: &[PollOption]) -> Result<(), PollError> {
        if self.has_voted {
            return Err(PollError::AlreadyVoted);
        }
        if !options.iter().any(|o| o.id == option_id) {
            return Err(PollError::UnknownOption(option_id.to_string()));
        }
        *self.counts.entry(option_id.to_string()).or_insert(0) += 1;
        self.has_voted = true;
        Ok(())
    }

    /// Per-option counts and rounded percentage shares, in option order.
    pub fn results(&self, options: &[PollOption]) -> PollResults {
        let total_votes = self.total_votes();
        let rows = options
            .iter()
            .map(|option| {
                let count = self.counts.get(&option.id).copied().unwrap_or(0);
                PollResultRow {
                    id: option.id.clone(),
                    label: option.label.clone(),
                    count,
                    percent: percent_share(count, total_votes),
                }
            })
            .collect();
        PollResults {
            total_votes,
            has_voted: self.has_voted,
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResults {
    pub total_votes: u64,
    pub has_voted: bool,
    pub rows: Vec<PollResultRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResultRow {
    pub id: String,
    pub label: String,
    pub count: u64,
    pub percent: u32,
}

/// `round(count / total * 100)` with the total floored at 1 so an empty poll
/// shows 0% everywhere.
pub fn percent_share(count: u64, total: u64) -> u32 {
    let total = total.max(1);
    (count as f64 / total as f64 * 100.0).round() as u32
}

/// The configured poll bound to its store.
pub struct Poll<'a> {
    db: &'a Database,
    config: &'a PollConfig,
}

impl<'a> Poll<'a> {
    pub fn new(db: &'a Database, config: &'a PollConfig) -> Self {
        Self { db, config }
    }

    pub fn question(&self) -> &str {
        &self.config.question
    }

    pub fn load(&self) -> Result<PollState, PollError> {
        let counts = match self.db.load_state(COUNTS_KEY)? {
            Some(value) => serde_json::from_value(value).map_err(anyhow::Error::from)?,
            None => BTreeMap::new(),
        };
        let has_voted = match self.db.load_state(VOTED_KEY)? {
            Some(value) => value.as_bool().unwrap_or(false),
            None => false,
        };
        Ok(PollState { counts, has_voted })
    }

    /// Cast this client's vote and persist the new state.
    pub fn cast_vote(&self, option_id: &str) -> Result<PollResults, PollError> {
        let mut state = self.load()?;
        state.cast_vote(option_id, &self.config.options)?;

        let counts = serde_json::to_value(&state.counts).map_err(anyhow::Error::from)?;
        self.db.save_states(&[
            (COUNTS_KEY, counts),
            (VOTED_KEY, serde_json::Value::Bool(true)),
        ])?;

        Ok(state.results(&self.config.options))
    }

    pub fn results(&self) -> Result<PollResults, PollError> {
        Ok(self.load()?.results(&self.config.options))
    }

    /// Forget all votes and the voted flag.
    pub fn reset(&self) -> Result<(), PollError> {
        self.db.remove_states(&[COUNTS_KEY, VOTED_KEY])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn poll_config() -> PollConfig {
        PollConfig {
            question: "MVP?".into(),
            options: vec![
                PollOption {
                    id: "clayton".into(),
                    label: "Walter Clayton Jr.".into(),
                },
                PollOption {
                    id: "martin".into(),
                    label: "Alijah Martin".into(),
                },
                PollOption {
                    id: "richard".into(),
                    label: "Will Richard".into(),
                },
            ],
        }
    }

    fn test_db() -> Database {
        Database::open(":memory:").unwrap()
    }

    #[test]
    fn percent_share_rounds_and_floors_total() {
        assert_eq!(percent_share(0, 0), 0);
        assert_eq!(percent_share(1, 3), 33);
        assert_eq!(percent_share(2, 3), 67);
        assert_eq!(percent_share(5, 5), 100);
    }

    #[test]
    fn first_vote_counts_and_sets_flag() {
        let db = test_db();
        let config = poll_config();
        let poll = Poll::new(&db, &config);

        let results = poll.cast_vote("martin").unwrap();
        assert_eq!(results.total_votes, 1);
        assert!(results.has_voted);
        assert_eq!(results.rows[1].count, 1);
        assert_eq!(results.rows[1].percent, 100);
        assert_eq!(results.rows[0].percent, 0);

        assert_eq!(db.load_state(VOTED_KEY).unwrap(), Some(json!(true)));
        assert_eq!(db.load_state(COUNTS_KEY).unwrap(), Some(json!({"martin": 1})));
    }

    #[test]
    fn second_vote_is_rejected_and_counts_unchanged() {
        let db = test_db();
        let config = poll_config();
        let poll = Poll::new(&db, &config);

        poll.cast_vote("clayton").unwrap();
        let before = poll.load().unwrap();

        let err = poll.cast_vote("martin").unwrap_err();
        assert!(matches!(err, PollError::AlreadyVoted));
        assert_eq!(poll.load().unwrap(), before);
    }

    #[test]
    fn unknown_option_is_rejected_without_marking_voted() {
        let db = test_db();
        let config = poll_config();
        let poll = Poll::new(&db, &config);

        let err = poll.cast_vote("gator").unwrap_err();
        assert!(matches!(err, PollError::UnknownOption(ref id) if id == "gator"));
        let state = poll.load().unwrap();
        assert!(!state.has_voted);
        assert_eq!(state.total_votes(), 0);
    }

    #[test]
    fn existing_counts_are_carried_forward() {
        let db = test_db();
        db.save_state(COUNTS_KEY, &json!({"clayton": 2, "richard": 1}))
            .unwrap();
        let config = poll_config();
        let poll = Poll::new(&db, &config);

        let results = poll.cast_vote("clayton").unwrap();
        assert_eq!(results.total_votes, 4);
        assert_eq!(results.rows[0].count, 3);
        assert_eq!(results.rows[0].percent, 75);
        assert_eq!(results.rows[2].percent, 25);
    }

    #[test]
    fn reset_clears_votes_and_flag() {
        let db = test_db();
        let config = poll_config();
        let poll = Poll::new(&db, &config);

        poll.cast_vote("clayton").unwrap();
        poll.reset().unwrap();

        let state = poll.load().unwrap();
        assert_eq!(state, PollState::default());
        assert!(poll.cast_vote("martin").is_ok());
    }

    #[test]
    fn negative_stored_counts_are_a_store_error() {
        let db = test_db();
        db.save_state(COUNTS_KEY, &json!({"clayton": -1})).unwrap();
        let config = poll_config();
        let poll = Poll::new(&db, &config);
        assert!(matches!(poll.load(), Err(PollError::Store(_))));
    }

    #[test]
    fn state_level_vote_never_decreases_total() {
        let config = poll_config();
        let mut state = PollState::default();
        state.cast_vote("richard", &config.options).unwrap();
        let total = state.total_votes();
        assert!(state.cast_vote("richard", &config.options).is_err());
        assert_eq!(state.total_votes(), total);
    }
}
