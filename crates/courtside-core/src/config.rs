// Configuration loading and parsing (site.toml, poll.toml).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Built-in defaults
// ---------------------------------------------------------------------------

/// Default config files written to `config/` when missing.
const DEFAULT_FILES: &[(&str, &str)] = &[
    ("site.toml", include_str!("../defaults/site.toml")),
    ("poll.toml", include_str!("../defaults/poll.toml")),
];

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub team: TeamConfig,
    pub api: ApiConfig,
    pub weather: WeatherConfig,
    pub output: OutputConfig,
    pub db_path: String,
    pub limits: Limits,
    pub countdown: CountdownConfig,
    pub tasks: TasksConfig,
    pub poll: PollConfig,
}

impl Config {
    /// Resolve the SQLite path. An empty `database.path` means the platform
    /// data directory (e.g. `~/.local/share/courtside/courtside.db`).
    pub fn database_path(&self) -> PathBuf {
        if !self.db_path.is_empty() {
            return PathBuf::from(&self.db_path);
        }
        directories::ProjectDirs::from("", "", "courtside")
            .map(|dirs| dirs.data_dir().join("courtside.db"))
            .unwrap_or_else(|| PathBuf::from("courtside.db"))
    }
}

// ---------------------------------------------------------------------------
// site.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire site.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SiteFile {
    team: TeamConfig,
    api: ApiConfig,
    weather: WeatherConfig,
    output: OutputConfig,
    database: DatabaseSection,
    #[serde(default)]
    limits: Limits,
    #[serde(default)]
    countdown: CountdownConfig,
    #[serde(default)]
    tasks: TasksConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    #[serde(default)]
    path: String,
}

/// The tracked team. `id` is the upstream team identifier used to build
/// endpoint paths and to pick the tracked side out of each game.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
    pub id: String,
    pub name: String,
    /// Shown as the location of home games.
    pub venue: String,
    #[serde(default)]
    pub utc_offset_hours: i32,
}

impl TeamConfig {
    /// Offset used when formatting dates for display. Falls back to UTC if
    /// the configured offset is out of range (validation rejects that case).
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub standings_url: String,
    pub standings_group: u32,
    #[serde(default)]
    pub use_relay: bool,
    #[serde(default)]
    pub relay_url: String,
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    concat!("courtside/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub url: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
    /// Regions present on the page. Updates aimed at any other region are
    /// skipped.
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
    pub schedule: usize,
    pub roster: usize,
    pub upcoming: usize,
    pub recent: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            schedule: 10,
            roster: 12,
            upcoming: 5,
            recent: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountdownConfig {
    #[serde(default)]
    pub target: Option<DateTime<Utc>>,
}

/// Per-task scheduling knobs. A task without `interval_secs` runs once at
/// startup only.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub interval_secs: Option<u64>,
    #[serde(default)]
    pub region: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for TaskSettings {
    fn default() -> Self {
        TaskSettings {
            enabled: true,
            interval_secs: None,
            region: None,
        }
    }
}

impl TaskSettings {
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TasksConfig {
    #[serde(default)]
    pub schedule: TaskSettings,
    #[serde(default)]
    pub upcoming_games: TaskSettings,
    #[serde(default)]
    pub recent_games: TaskSettings,
    #[serde(default)]
    pub live_game: TaskSettings,
    #[serde(default)]
    pub roster: TaskSettings,
    #[serde(default)]
    pub team: TaskSettings,
    #[serde(default)]
    pub standings: TaskSettings,
    #[serde(default)]
    pub weather: TaskSettings,
}

impl TasksConfig {
    pub fn get(&self, kind: TaskKind) -> &TaskSettings {
        match kind {
            TaskKind::Schedule => &self.schedule,
            TaskKind::UpcomingGames => &self.upcoming_games,
            TaskKind::RecentGames => &self.recent_games,
            TaskKind::LiveGame => &self.live_game,
            TaskKind::Roster => &self.roster,
            TaskKind::Team => &self.team,
            TaskKind::Standings => &self.standings,
            TaskKind::Weather => &self.weather,
        }
    }

    /// Region a task renders into: the configured override or the task's
    /// default container name.
    pub fn region(&self, kind: TaskKind) -> String {
        self.get(kind)
            .region
            .clone()
            .unwrap_or_else(|| kind.default_region().to_string())
    }
}

/// Every fetch-driven refresh task the site knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Schedule,
    UpcomingGames,
    RecentGames,
    LiveGame,
    Roster,
    Team,
    Standings,
    Weather,
}

impl TaskKind {
    pub const ALL: [TaskKind; 8] = [
        TaskKind::Schedule,
        TaskKind::UpcomingGames,
        TaskKind::RecentGames,
        TaskKind::LiveGame,
        TaskKind::Roster,
        TaskKind::Team,
        TaskKind::Standings,
        TaskKind::Weather,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Schedule => "schedule",
            TaskKind::UpcomingGames => "upcoming_games",
            TaskKind::RecentGames => "recent_games",
            TaskKind::LiveGame => "live_game",
            TaskKind::Roster => "roster",
            TaskKind::Team => "team",
            TaskKind::Standings => "standings",
            TaskKind::Weather => "weather",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn default_region(&self) -> &'static str {
        match self {
            TaskKind::Schedule => "scheduleContainer",
            TaskKind::UpcomingGames => "upcomingGames",
            TaskKind::RecentGames => "recentGames",
            TaskKind::LiveGame => "liveGameCard",
            TaskKind::Roster => "rosterContainer",
            TaskKind::Team => "teamSummary",
            TaskKind::Standings => "standingsTable",
            TaskKind::Weather => "weatherWidget",
        }
    }
}

// ---------------------------------------------------------------------------
// poll.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct PollFile {
    poll: PollConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    pub question: String,
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollOption {
    pub id: String,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/site.toml` and
/// `config/poll.toml`, relative to the given `base_dir`.
///
/// Does not write defaults; prefer `load_config()` for that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let site_path = config_dir.join("site.toml");
    let site_text = read_file(&site_path)?;

    let poll_path = config_dir.join("poll.toml");
    let poll_text = read_file(&poll_path)?;

    parse_config(&site_text, &site_path, &poll_text, &poll_path)
}

/// The built-in defaults, parsed and validated without touching disk.
pub fn default_config() -> Result<Config, ConfigError> {
    let default_text = |name: &str| {
        DEFAULT_FILES
            .iter()
            .find(|(file, _)| *file == name)
            .map(|(_, text)| *text)
            .unwrap_or_default()
    };
    parse_config(
        default_text("site.toml"),
        Path::new("defaults/site.toml"),
        default_text("poll.toml"),
        Path::new("defaults/poll.toml"),
    )
}

fn parse_config(
    site_text: &str,
    site_path: &Path,
    poll_text: &str,
    poll_path: &Path,
) -> Result<Config, ConfigError> {
    let site: SiteFile = toml::from_str(site_text).map_err(|e| ConfigError::ParseError {
        path: site_path.to_path_buf(),
        source: e,
    })?;
    let poll_file: PollFile = toml::from_str(poll_text).map_err(|e| ConfigError::ParseError {
        path: poll_path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        team: site.team,
        api: site.api,
        weather: site.weather,
        output: site.output,
        db_path: site.database.path,
        limits: site.limits,
        countdown: site.countdown,
        tasks: site.tasks,
        poll: poll_file.poll,
    };

    validate(&config)?;

    Ok(config)
}

/// Write any missing `config/*.toml` from the built-in defaults. Existing
/// files are never touched. Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut written = Vec::new();

    for (file_name, content) in DEFAULT_FILES {
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                std::io::Write::write_all(&mut dest, content.as_bytes()).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                written.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(written)
}

/// Convenience wrapper: loads config relative to the current working directory,
/// writing default files first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.team.id.trim().is_empty() {
        return Err(invalid("team.id", "must not be empty"));
    }

    if !(-12..=14).contains(&config.team.utc_offset_hours) {
        return Err(invalid(
            "team.utc_offset_hours",
            format!(
                "must be between -12 and 14, got {}",
                config.team.utc_offset_hours
            ),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(invalid("api.timeout_secs", "must be greater than 0"));
    }

    if config.api.use_relay && config.api.relay_url.trim().is_empty() {
        return Err(invalid(
            "api.relay_url",
            "must be set when api.use_relay is true",
        ));
    }

    let limits: &[(&str, usize)] = &[
        ("limits.schedule", config.limits.schedule),
        ("limits.roster", config.limits.roster),
        ("limits.upcoming", config.limits.upcoming),
        ("limits.recent", config.limits.recent),
    ];
    for (name, val) in limits {
        if *val == 0 {
            return Err(invalid(*name, "must be > 0"));
        }
    }

    for kind in TaskKind::ALL {
        if config.tasks.get(kind).interval_secs == Some(0) {
            return Err(invalid(
                format!("tasks.{}.interval_secs", kind.name()),
                "must be > 0",
            ));
        }
    }

    if config.poll.options.is_empty() {
        return Err(invalid("poll.options", "must contain at least one option"));
    }
    let mut seen = HashSet::new();
    for option in &config.poll.options {
        if option.id.trim().is_empty() {
            return Err(invalid("poll.options.id", "must not be empty"));
        }
        if !seen.insert(option.id.as_str()) {
            return Err(invalid(
                "poll.options.id",
                format!("duplicate option id `{}`", option.id),
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
