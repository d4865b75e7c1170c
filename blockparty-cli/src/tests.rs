//! Unit coverage for CLI parsing and command execution.

use std::path::PathBuf;

use blockparty_core::{
    Event, EventLocation, EventStore, EventType, SqliteStore, User, UserStore,
};
use blockparty_scorer::embed;
use chrono::{Duration, Utc};
use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use super::{Cli, CliError, Command, execute, parse_when};

fn seeded_db() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("blockparty.db");
    let store = SqliteStore::open(&path).expect("create store");

    let user = User::new("user-1", "Sam")
        .expect("valid user")
        .with_vibe_prefs(vec!["Chill".into()]);
    store.upsert_user(&user).expect("seed user");
    let host = User::new("host-1", "Pat").expect("valid user");
    store.upsert_user(&host).expect("seed host");

    let event = Event::new(
        "ev-1",
        "Park picnic",
        "host-1",
        EventType::Outdoors,
        Utc::now() + Duration::hours(1),
    )
    .expect("valid event")
    .with_location(EventLocation::from_lat_lng(43.65, -79.38))
    .expect("valid location")
    .with_vibes(vec!["Chill".into()]);
    store.upsert_event(&event, &embed(&event)).expect("seed event");

    (dir, path)
}

fn parse(args: &[&str]) -> Command {
    Cli::try_parse_from(args).expect("valid arguments").command
}

#[rstest]
fn recommend_arguments_parse() {
    let command = parse(&[
        "blockparty",
        "recommend",
        "--db",
        "events.db",
        "--user",
        "user-1",
        "--lat",
        "43.65",
        "--lng",
        "-79.38",
        "--vibe",
        "Chill",
        "--vibe",
        "Foodie",
        "--when",
        "tonight",
    ]);
    match command {
        Command::Recommend(args) => {
            assert_eq!(args.user, "user-1");
            assert_eq!(args.vibe, vec!["Chill", "Foodie"]);
            assert_eq!(args.when.as_deref(), Some("tonight"));
            assert_eq!(args.max, blockparty_scorer::DEFAULT_MAX_RESULTS);
        }
        other => panic!("expected recommend, got {other:?}"),
    }
}

#[rstest]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["blockparty"]).is_err());
}

#[rstest]
#[case("now")]
#[case("Tonight")]
#[case("WEEKEND")]
fn when_values_parse(#[case] raw: &str) {
    assert!(parse_when(raw).is_ok());
}

#[rstest]
fn unknown_when_value_is_reported() {
    let err = parse_when("someday").expect_err("unknown when");
    assert!(matches!(
        err,
        CliError::InvalidArgument { field: "when", .. }
    ));
}

#[rstest]
fn recommend_returns_scored_feed() {
    let (_dir, path) = seeded_db();
    let command = parse(&[
        "blockparty",
        "recommend",
        "--db",
        path.to_str().expect("utf8 path"),
        "--user",
        "user-1",
        "--lat",
        "43.65",
        "--lng",
        "-79.38",
    ]);
    let output = execute(command).expect("recommend succeeds");
    let feed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
    assert_eq!(feed["count"], 1);
    let first = &feed["events"][0];
    assert_eq!(first["id"], "ev-1");
    assert!(first["score"].as_f64().expect("numeric score") > 0.0);
    assert!(first["reasons"].as_array().expect("reasons array").len() > 0);
}

#[rstest]
fn feedback_updates_popularity() {
    let (_dir, path) = seeded_db();
    let command = parse(&[
        "blockparty",
        "feedback",
        "--db",
        path.to_str().expect("utf8 path"),
        "--user",
        "user-1",
        "--event",
        "ev-1",
        "--action",
        "going",
    ]);
    execute(command).expect("feedback succeeds");

    let store = SqliteStore::open(&path).expect("reopen store");
    let event = store
        .event("ev-1")
        .expect("query event")
        .expect("event present");
    assert!((event.popularity_score - 1.0).abs() < 1e-6);
}

#[rstest]
fn feedback_on_unknown_event_is_reported() {
    let (_dir, path) = seeded_db();
    let command = parse(&[
        "blockparty",
        "feedback",
        "--db",
        path.to_str().expect("utf8 path"),
        "--user",
        "user-1",
        "--event",
        "ghost",
        "--action",
        "view",
    ]);
    let err = execute(command).expect_err("unknown event");
    assert!(matches!(err, CliError::Feedback(_)));
}

#[rstest]
fn list_returns_window_events() {
    let (_dir, path) = seeded_db();
    let command = parse(&[
        "blockparty",
        "list",
        "--db",
        path.to_str().expect("utf8 path"),
        "--when",
        "later",
    ]);
    let output = execute(command).expect("list succeeds");
    let events: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
    assert_eq!(events.as_array().expect("array of events").len(), 1);
}
