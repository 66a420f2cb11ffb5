use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::ArgMatches;
use tracing::{error, info, warn};

use courtside_core::config::{self, Config};
use courtside_core::countdown::CountdownView;
use courtside_core::db::Database;
use courtside_core::normalize::{normalize_schedule, NormalizeContext};
use courtside_core::poll::{Poll, PollError, PollResults};
use courtside_core::record::game::next_scheduled;

use crate::app::{self, render_countdown, COUNTDOWN_REGION, POLL_REGION};
use crate::fetch::{HttpFetcher, JsonFetcher};
use crate::refresh::{RefreshOutcome, RefreshReport};
use crate::region::{FileRegionSink, RegionSink};
use crate::render;
use crate::tasks::{build_tasks, Endpoints, NextGame};

pub const ALREADY_VOTED_NOTICE: &str = "You have already voted!";

pub async fn run_command(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = config::load_config().context("failed to load configuration")?;
    info!(team = %config.team.name, "config loaded");

    match matches.subcommand() {
        None | Some(("serve", _)) => handle_serve_command(&config).await,
        Some(("refresh", sub_matches)) => handle_refresh_command(&config, sub_matches).await,
        Some(("vote", sub_matches)) => handle_vote_command(&config, sub_matches),
        Some(("poll", sub_matches)) => handle_poll_command(&config, sub_matches),
        Some(("countdown", _)) => handle_countdown_command(&config).await,
        Some((other, _)) => {
            error!(command = other, "unknown command");
            bail!("unknown command `{other}`")
        }
    }
}

fn file_sink(config: &Config) -> FileRegionSink {
    FileRegionSink::new(&config.output.dir, config.output.regions.clone())
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    let path = config.database_path();
    let db = Database::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    info!(path = %path.display(), "database opened");
    Ok(db)
}

async fn handle_serve_command(config: &Config) -> anyhow::Result<()> {
    let fetcher: Arc<dyn JsonFetcher> = Arc::new(HttpFetcher::from_config(&config.api)?);
    let sink: Arc<dyn RegionSink> = Arc::new(file_sink(config));

    // The poll region only changes on a vote; draw it once so the page
    // never shows a stale or missing poll.
    match open_database(config) {
        Ok(db) => {
            let poll = Poll::new(&db, &config.poll);
            if let Err(e) = render_poll(&poll, sink.as_ref(), None) {
                warn!(error = %e, "could not render poll results");
            }
        }
        Err(e) => warn!(error = %e, "poll results unavailable"),
    }

    println!(
        "Serving regions for {} into {}",
        config.team.name, config.output.dir
    );
    app::run(config, fetcher, sink, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
        }
    })
    .await
}

async fn handle_refresh_command(config: &Config, matches: &ArgMatches) -> anyhow::Result<()> {
    let catalog = build_tasks(config)?;
    let tasks = match matches.get_one::<String>("task") {
        Some(name) => match catalog.find(name) {
            Some(task) => vec![task.clone()],
            None => bail!("task `{name}` is disabled in config"),
        },
        None => catalog.tasks.clone(),
    };

    let fetcher = HttpFetcher::from_config(&config.api)?;
    let sink = file_sink(config);
    let reports = app::refresh_all(&tasks, &fetcher, &sink).await;

    for report in &reports {
        println!("{}", describe_report(report));
    }
    Ok(())
}

fn describe_report(report: &RefreshReport) -> String {
    let source = match report.outcome {
        RefreshOutcome::Upstream => "upstream",
        RefreshOutcome::Fallback => "fallback",
        RefreshOutcome::Empty => "empty",
    };
    let mut line = format!(
        "{:<15} {:<18} {:<8} {:>3} records",
        report.task, report.region, source, report.records
    );
    if !report.applied {
        line.push_str(" (not written)");
    }
    if let (RefreshOutcome::Fallback, Some(e)) = (report.outcome, &report.error) {
        line.push_str(&format!(" [{e}]"));
    }
    line
}

fn handle_vote_command(config: &Config, matches: &ArgMatches) -> anyhow::Result<()> {
    let option = matches
        .get_one::<String>("option")
        .context("missing poll option")?;
    let db = open_database(config)?;
    let poll = Poll::new(&db, &config.poll);
    let sink = file_sink(config);

    match poll.cast_vote(option) {
        Ok(results) => {
            info!(option = %option, total = results.total_votes, "vote recorded");
            println!("Thanks for voting!");
            print_results(poll.question(), &results);
            apply_poll(&sink, poll.question(), &results, None);
            Ok(())
        }
        Err(PollError::AlreadyVoted) => {
            info!(option = %option, "vote rejected, already voted");
            println!("{ALREADY_VOTED_NOTICE}");
            render_poll(&poll, &sink, Some(ALREADY_VOTED_NOTICE))
        }
        Err(PollError::UnknownOption(id)) => {
            let valid: Vec<&str> = config.poll.options.iter().map(|o| o.id.as_str()).collect();
            bail!("unknown poll option `{id}` (choose one of: {})", valid.join(", "))
        }
        Err(e) => Err(e.into()),
    }
}

fn handle_poll_command(config: &Config, matches: &ArgMatches) -> anyhow::Result<()> {
    let db = open_database(config)?;
    let poll = Poll::new(&db, &config.poll);
    let sink = file_sink(config);

    if matches.get_flag("reset") {
        poll.reset()?;
        info!("poll reset");
        println!("Poll reset.");
    }
    render_poll(&poll, &sink, None)
}

fn render_poll(poll: &Poll<'_>, sink: &dyn RegionSink, notice: Option<&str>) -> anyhow::Result<()> {
    let results = poll.results()?;
    print_results(poll.question(), &results);
    apply_poll(sink, poll.question(), &results, notice);
    Ok(())
}

fn apply_poll(sink: &dyn RegionSink, question: &str, results: &PollResults, notice: Option<&str>) {
    let update = render::poll::render(question, results, notice);
    if let Err(e) = sink.apply(POLL_REGION, update) {
        error!(error = %e, "failed to write poll results");
    }
}

fn print_results(question: &str, results: &PollResults) {
    println!("{question}");
    for row in &results.rows {
        println!("  {:<24} {:>3}% ({})", row.label, row.percent, row.count);
    }
    println!("  {} total votes", results.total_votes);
}

async fn handle_countdown_command(config: &Config) -> anyhow::Result<()> {
    let target = match config.countdown.target {
        Some(date) => Some(NextGame {
            date,
            label: String::new(),
        }),
        None => fetch_next_game(config).await?,
    };

    let now = Utc::now();
    match &target {
        Some(game) => {
            let view = CountdownView::until(game.date, now);
            println!("{view} {}", game.label);
        }
        None => println!("{}", render::countdown::NO_TARGET),
    }

    let sink = file_sink(config);
    if let Err(e) = sink.apply(COUNTDOWN_REGION, render_countdown(target.as_ref(), now)) {
        error!(error = %e, "failed to write countdown");
    }
    Ok(())
}

async fn fetch_next_game(config: &Config) -> anyhow::Result<Option<NextGame>> {
    let fetcher = HttpFetcher::from_config(&config.api)?;
    let payload = fetcher
        .get_json(&Endpoints::new(config).schedule())
        .await
        .context("failed to fetch schedule")?;
    let ctx = NormalizeContext {
        team_id: config.team.id.clone(),
        venue: config.team.venue.clone(),
    };
    let games = normalize_schedule(payload, &ctx).context("failed to read schedule")?;
    Ok(next_scheduled(&games, Utc::now()).map(NextGame::from_record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::RefreshError;

    fn report(outcome: RefreshOutcome, error: Option<RefreshError>) -> RefreshReport {
        RefreshReport {
            task: "roster".into(),
            region: "rosterContainer".into(),
            outcome,
            records: 12,
            error,
            applied: true,
        }
    }

    #[test]
    fn describes_upstream_report() {
        let line = describe_report(&report(RefreshOutcome::Upstream, None));
        assert!(line.starts_with("roster"));
        assert!(line.contains("upstream"));
        assert!(line.contains(" 12 records"));
        assert!(!line.contains('['));
    }

    #[test]
    fn describes_fallback_with_reason() {
        let line = describe_report(&report(
            RefreshOutcome::Fallback,
            Some(RefreshError::Status(503)),
        ));
        assert!(line.contains("fallback"));
        assert!(line.contains("[upstream returned HTTP 503]"));
    }
}
