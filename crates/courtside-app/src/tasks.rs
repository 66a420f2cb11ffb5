// The refresh task catalog, built from configuration.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use courtside_core::config::{Config, TaskKind};
use courtside_core::fallback;
use courtside_core::normalize::{self, NormalizeContext};
use courtside_core::record::game::next_scheduled;
use courtside_core::record::{GameRecord, PlayerRecord, WeatherReport};

use crate::fetch::Endpoint;
use crate::refresh::{Refresh, RefreshTask};
use crate::render::{self, RenderContext};

/// The next game that has not tipped off, as seen by the latest successful
/// schedule fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextGame {
    pub date: DateTime<Utc>,
    /// "vs Auburn Tigers" / "@ Duke Blue Devils"
    pub label: String,
}

impl NextGame {
    pub fn from_record(game: &GameRecord) -> Self {
        let matchup = if game.is_home { "vs" } else { "@" };
        Self {
            date: game.date,
            label: format!("{matchup} {}", game.opponent.name),
        }
    }
}

pub struct TaskCatalog {
    pub tasks: Vec<Arc<dyn Refresh>>,
    /// Updated whenever the schedule is fetched successfully.
    pub next_game: watch::Receiver<Option<NextGame>>,
}

impl TaskCatalog {
    pub fn find(&self, name: &str) -> Option<&Arc<dyn Refresh>> {
        self.tasks.iter().find(|t| t.name() == name)
    }
}

/// Upstream URLs for each fetch-driven task.
pub struct Endpoints<'a> {
    config: &'a Config,
}

impl<'a> Endpoints<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    fn espn(&self, url: String) -> Endpoint {
        Endpoint::relayed(url, self.config.api.use_relay)
    }

    fn team_base(&self) -> String {
        format!(
            "{}/teams/{}",
            self.config.api.base_url.trim_end_matches('/'),
            self.config.team.id
        )
    }

    pub fn schedule(&self) -> Endpoint {
        self.espn(format!("{}/schedule", self.team_base()))
    }

    pub fn roster(&self) -> Endpoint {
        self.espn(format!("{}/roster", self.team_base()))
    }

    pub fn team(&self) -> Endpoint {
        self.espn(self.team_base())
    }

    pub fn standings(&self) -> Endpoint {
        self.espn(format!(
            "{}/standings?group={}",
            self.config.api.standings_url.trim_end_matches('/'),
            self.config.api.standings_group
        ))
    }

    /// Open-Meteo serves CORS headers itself, so it is never relayed.
    pub fn weather(&self) -> Endpoint {
        let w = &self.config.weather;
        Endpoint::direct(format!(
            "{}?latitude={}&longitude={}&current_weather=true",
            w.url, w.latitude, w.longitude
        ))
    }
}

/// Build every enabled task. The upcoming-games task (or the full schedule
/// task when that one is disabled) publishes the next game on the returned
/// watch channel.
pub fn build_tasks(config: &Config) -> anyhow::Result<TaskCatalog> {
    let (next_tx, next_rx) = watch::channel(None);
    let next_tx = Arc::new(next_tx);

    let publisher = if config.tasks.get(TaskKind::UpcomingGames).enabled {
        TaskKind::UpcomingGames
    } else {
        TaskKind::Schedule
    };

    let fallback_schedule = fallback::schedule().context("failed to load fallback schedule")?;
    let fallback_roster = fallback::roster().context("failed to load fallback roster")?;

    let endpoints = Endpoints::new(config);
    let norm_ctx = NormalizeContext {
        team_id: config.team.id.clone(),
        venue: config.team.venue.clone(),
    };
    let render_ctx = RenderContext::new(config.team.display_offset());
    let limits = config.limits.clone();

    let mut tasks: Vec<Arc<dyn Refresh>> = Vec::new();

    for kind in TaskKind::ALL {
        let settings = config.tasks.get(kind);
        if !settings.enabled {
            debug!(task = kind.name(), "task disabled");
            continue;
        }
        let region = config.tasks.region(kind);
        let interval = settings.interval();

        let task: Arc<dyn Refresh> = match kind {
            TaskKind::Schedule
            | TaskKind::UpcomingGames
            | TaskKind::RecentGames
            | TaskKind::LiveGame => {
                let ctx = norm_ctx.clone();
                let normalize_fn = move |payload| normalize::normalize_schedule(payload, &ctx);
                let fallback = match kind {
                    TaskKind::Schedule | TaskKind::RecentGames => fallback_schedule.clone(),
                    _ => Vec::new(),
                };

                let mut task = match kind {
                    TaskKind::Schedule => {
                        let limit = limits.schedule;
                        RefreshTask::new(
                            kind.name(),
                            region,
                            endpoints.schedule(),
                            normalize_fn,
                            move |games: &[GameRecord]| {
                                render::schedule::render_timeline(games, limit, &render_ctx)
                            },
                        )
                    }
                    TaskKind::UpcomingGames => {
                        let limit = limits.upcoming;
                        RefreshTask::new(
                            kind.name(),
                            region,
                            endpoints.schedule(),
                            normalize_fn,
                            move |games: &[GameRecord]| {
                                render::schedule::render_upcoming(games, limit, &render_ctx)
                            },
                        )
                    }
                    TaskKind::RecentGames => {
                        let limit = limits.recent;
                        RefreshTask::new(
                            kind.name(),
                            region,
                            endpoints.schedule(),
                            normalize_fn,
                            move |games: &[GameRecord]| {
                                render::schedule::render_recent(games, limit, &render_ctx)
                            },
                        )
                    }
                    _ => {
                        let team_name = config.team.name.clone();
                        RefreshTask::new(
                            kind.name(),
                            region,
                            endpoints.schedule(),
                            normalize_fn,
                            move |games: &[GameRecord]| render::live::render(games, &team_name),
                        )
                    }
                }
                .with_fallback(fallback)
                .with_interval(interval);

                if kind == publisher {
                    let tx = next_tx.clone();
                    task = task.on_records(move |games: &[GameRecord]| {
                        let next = next_scheduled(games, Utc::now()).map(NextGame::from_record);
                        tx.send_replace(next);
                    });
                }
                Arc::new(task)
            }
            TaskKind::Roster => {
                let limit = limits.roster;
                Arc::new(
                    RefreshTask::new(
                        kind.name(),
                        region,
                        endpoints.roster(),
                        normalize::normalize_roster,
                        move |players: &[PlayerRecord]| render::roster::render(players, limit),
                    )
                    .with_fallback(fallback_roster.clone())
                    .with_interval(interval),
                )
            }
            TaskKind::Team => Arc::new(
                RefreshTask::new(
                    kind.name(),
                    region,
                    endpoints.team(),
                    normalize::normalize_team,
                    render::team::render,
                )
                .with_fallback(fallback::team_summary(&config.team.name))
                .with_interval(interval),
            ),
            TaskKind::Standings => {
                let ctx = norm_ctx.clone();
                Arc::new(
                    RefreshTask::new(
                        kind.name(),
                        region,
                        endpoints.standings(),
                        move |payload| normalize::normalize_standings(payload, &ctx),
                        render::standings::render,
                    )
                    .with_interval(interval),
                )
            }
            TaskKind::Weather => {
                let place = config.team.venue.clone();
                Arc::new(
                    RefreshTask::new(
                        kind.name(),
                        region,
                        endpoints.weather(),
                        normalize::normalize_weather,
                        move |reports: &[WeatherReport]| render::weather::render(reports, &place),
                    )
                    .with_interval(interval),
                )
            }
        };
        tasks.push(task);
    }

    Ok(TaskCatalog {
        tasks,
        next_game: next_rx,
    })
}
