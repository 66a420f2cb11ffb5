pub mod commands;

use clap::{Arg, ArgAction, ArgMatches, Command};

use courtside_core::config::TaskKind;

pub fn build_cli() -> Command {
    let task_names: Vec<&'static str> = TaskKind::ALL.iter().map(TaskKind::name).collect();

    Command::new("courtside")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keep a team fan site's schedule, roster and scores current")
        .long_about("Courtside fetches schedule, roster, standings and live scores for one team, renders each page region to HTML, and falls back to built-in data whenever upstream is unreachable. Without a subcommand it runs the refresh loop until interrupted.")
        .subcommand(
            Command::new("serve")
                .about("Refresh every region at startup, then keep them current (default)")
        )
        .subcommand(
            Command::new("refresh")
                .about("Refresh regions once and exit")
                .arg(
                    Arg::new("task")
                        .long("task")
                        .short('t')
                        .help("Only refresh this task")
                        .value_parser(task_names)
                )
        )
        .subcommand(
            Command::new("vote")
                .about("Cast this client's vote in the fan poll")
                .arg(
                    Arg::new("option")
                        .help("Poll option id")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("poll")
                .about("Show fan poll results")
                .arg(
                    Arg::new("reset")
                        .long("reset")
                        .help("Clear all votes and the voted flag")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("countdown")
                .about("Show the time left until the next game")
        )
}

pub fn get_matches() -> ArgMatches {
    build_cli().get_matches()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let matches = build_cli().try_get_matches_from(["courtside"]).unwrap();
        assert!(matches.subcommand().is_none());
    }

    #[test]
    fn refresh_accepts_known_task() {
        let matches = build_cli()
            .try_get_matches_from(["courtside", "refresh", "--task", "live_game"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "refresh");
        assert_eq!(sub.get_one::<String>("task").map(String::as_str), Some("live_game"));
    }

    #[test]
    fn refresh_rejects_unknown_task() {
        let result = build_cli().try_get_matches_from(["courtside", "refresh", "--task", "scores"]);
        assert!(result.is_err());
    }

    #[test]
    fn vote_requires_option() {
        assert!(build_cli().try_get_matches_from(["courtside", "vote"]).is_err());
        let matches = build_cli()
            .try_get_matches_from(["courtside", "vote", "clayton"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("option").unwrap(), "clayton");
    }

    #[test]
    fn poll_reset_flag() {
        let matches = build_cli()
            .try_get_matches_from(["courtside", "poll", "--reset"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.get_flag("reset"));
    }
}
