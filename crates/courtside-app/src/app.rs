// Refresh orchestration.
//
// Startup: every task refreshes once, concurrently. Then each task with an
// interval gets its own tokio task that re-runs it on a timer, and a
// one-second ticker redraws the countdown. Tasks never share mutable state;
// each owns its region. Shutdown aborts everything.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use courtside_core::config::Config;
use courtside_core::countdown::CountdownView;

use crate::fetch::JsonFetcher;
use crate::refresh::{Refresh, RefreshOutcome, RefreshReport};
use crate::region::{RegionSink, RegionUpdate};
use crate::render;
use crate::tasks::{build_tasks, NextGame};

pub const COUNTDOWN_REGION: &str = "countdown";
pub const POLL_REGION: &str = "pollResults";

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Refresh every task once, concurrently. Reports come back in task order.
pub async fn refresh_all(
    tasks: &[Arc<dyn Refresh>],
    fetcher: &dyn JsonFetcher,
    sink: &dyn RegionSink,
) -> Vec<RefreshReport> {
    join_all(tasks.iter().map(|task| task.refresh(fetcher, sink))).await
}

/// Re-run `task` every interval. Returns `None` for startup-only tasks.
///
/// The first tick is consumed immediately because the startup pass already
/// refreshed the task. Missed ticks are skipped, so a slow fetch delays the
/// next one instead of letting two responses for the same region race.
pub fn spawn_refresh_loop(
    task: Arc<dyn Refresh>,
    fetcher: Arc<dyn JsonFetcher>,
    sink: Arc<dyn RegionSink>,
) -> Option<JoinHandle<()>> {
    let period = task.interval()?;
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let report = task.refresh(fetcher.as_ref(), sink.as_ref()).await;
            if report.outcome == RefreshOutcome::Fallback {
                warn!(task = %report.task, "still serving fallback content");
            }
        }
    }))
}

/// Where the countdown gets its target: a fixed override from config, or
/// the next scheduled game published by the schedule tasks.
#[derive(Clone)]
pub struct CountdownSource {
    pub fixed: Option<DateTime<Utc>>,
    pub next_game: watch::Receiver<Option<NextGame>>,
}

impl CountdownSource {
    pub fn target(&self) -> Option<NextGame> {
        match self.fixed {
            Some(date) => Some(NextGame {
                date,
                label: String::new(),
            }),
            None => self.next_game.borrow().clone(),
        }
    }
}

/// Countdown content for `target` as of `now`.
pub fn render_countdown(target: Option<&NextGame>, now: DateTime<Utc>) -> RegionUpdate {
    match target {
        Some(game) => {
            let label = (!game.label.is_empty()).then_some(game.label.as_str());
            render::countdown::render(Some(CountdownView::until(game.date, now)), label)
        }
        None => render::countdown::render(None, None),
    }
}

pub fn spawn_countdown(source: CountdownSource, sink: Arc<dyn RegionSink>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(COUNTDOWN_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let update = render_countdown(source.target().as_ref(), Utc::now());
            if let Err(e) = sink.apply(COUNTDOWN_REGION, update) {
                error!(error = %e, "failed to update countdown");
            }
        }
    })
}

fn log_reports(reports: &[RefreshReport]) {
    for report in reports {
        match report.outcome {
            RefreshOutcome::Upstream => {
                info!(task = %report.task, records = report.records, "startup refresh ok")
            }
            RefreshOutcome::Empty => info!(task = %report.task, "startup refresh empty"),
            RefreshOutcome::Fallback => warn!(
                task = %report.task,
                error = ?report.error,
                "startup refresh fell back"
            ),
        }
    }
}

/// Run the site until `shutdown` resolves.
pub async fn run<F>(
    config: &Config,
    fetcher: Arc<dyn JsonFetcher>,
    sink: Arc<dyn RegionSink>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let catalog = build_tasks(config)?;
    info!(tasks = catalog.tasks.len(), "starting refresh tasks");

    let reports = refresh_all(&catalog.tasks, fetcher.as_ref(), sink.as_ref()).await;
    log_reports(&reports);

    let mut handles: Vec<JoinHandle<()>> = catalog
        .tasks
        .iter()
        .filter_map(|task| spawn_refresh_loop(task.clone(), fetcher.clone(), sink.clone()))
        .collect();
    info!(periodic = handles.len(), "refresh loops running");

    if sink.has_region(COUNTDOWN_REGION) {
        let source = CountdownSource {
            fixed: config.countdown.target,
            next_game: catalog.next_game.clone(),
        };
        handles.push(spawn_countdown(source, sink.clone()));
    }

    shutdown.await;
    info!("shutting down");

    for handle in &handles {
        handle.abort();
    }
    for handle in handles {
        let _ = handle.await;
    }
    Ok(())
}
