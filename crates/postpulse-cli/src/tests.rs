use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["postpulse"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_analyze_with_defaults() {
    let cli = Cli::try_parse_from(["postpulse", "analyze", "--query", "rustlang"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze {
            ref query,
            count: None,
            dry_run: false,
        }) if query == "rustlang"
    ));
}

#[test]
fn parses_analyze_with_count_and_dry_run() {
    let cli = Cli::try_parse_from([
        "postpulse",
        "analyze",
        "--query",
        "rust lang",
        "--count",
        "25",
        "--dry-run",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze {
            count: Some(25),
            dry_run: true,
            ..
        })
    ));
}

#[test]
fn analyze_requires_query() {
    assert!(Cli::try_parse_from(["postpulse", "analyze"]).is_err());
}

#[test]
fn parses_user_with_max_posts() {
    let cli = Cli::try_parse_from(["postpulse", "user", "@ferris", "--max-posts", "10"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::User {
            ref username,
            max_posts: Some(10),
            dry_run: false,
        }) if username == "@ferris"
    ));
}

#[test]
fn report_top_defaults_to_seven() {
    let cli = Cli::try_parse_from(["postpulse", "report", "ferris"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Report { top: 7, .. })));
}

#[test]
fn distribution_defaults_to_monthly() {
    let cli = Cli::try_parse_from(["postpulse", "distribution", "ferris"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Distribution {
            group_by: Granularity::Monthly,
            ..
        })
    ));
}

#[test]
fn distribution_accepts_weekly() {
    let cli = Cli::try_parse_from(["postpulse", "distribution", "ferris", "--group-by", "weekly"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Distribution {
            group_by: Granularity::Weekly,
            ..
        })
    ));
}

#[test]
fn distribution_rejects_unknown_granularity() {
    let result =
        Cli::try_parse_from(["postpulse", "distribution", "ferris", "--group-by", "daily"]);
    assert!(result.is_err());
}

#[test]
fn parses_runs_command() {
    let cli =
        Cli::try_parse_from(["postpulse", "runs", "ferris"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Runs { ref subject }) if subject == "ferris"));
}

#[test]
fn parses_db_ping_command() {
    let cli =
        Cli::try_parse_from(["postpulse", "db", "ping"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["postpulse", "db", "migrate"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}
