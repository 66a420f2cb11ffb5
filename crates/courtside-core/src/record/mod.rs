// Normalized, display-ready records. Each one is built from a single
// upstream entity (or one fallback entry) and never mutated afterwards.

pub mod game;
pub mod player;
pub mod team;
pub mod weather;

pub use game::{GameRecord, GameResult, GameStatus, Opponent, Score};
pub use player::PlayerRecord;
pub use team::{StandingRow, StatLine, TeamSummary};
pub use weather::WeatherReport;
