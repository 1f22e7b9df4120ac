use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

use elena_lib::{Coords, LatLon, RoadGraph, SqliteSource};

/// Write a small hill dataset: a direct road 1-4 and two side roads, one
/// through a pit (2) and one over a peak (3).
fn dataset() -> (TempDir, PathBuf) {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("hills.db");

    let mut graph = RoadGraph::new();
    graph.insert_node(1, Coords::new(-72.5200, 42.3900, 20.0));
    graph.insert_node(2, Coords::new(-72.5195, 42.3895, 0.0));
    graph.insert_node(3, Coords::new(-72.5195, 42.3905, 39.0));
    graph.insert_node(4, Coords::new(-72.5190, 42.3900, 20.0));
    graph.add_two_way_edge(1, 4, 100.0);
    graph.add_two_way_edge(1, 2, 100.0);
    graph.add_two_way_edge(1, 3, 100.0);
    graph.add_two_way_edge(2, 4, 10.0);
    graph.add_two_way_edge(3, 4, 10.0);

    SqliteSource::create(
        &path,
        &graph,
        &[("Amherst Common", LatLon::new(42.3900, -72.5200))],
    )
    .expect("write dataset");
    (dir, path)
}

fn cli(data: &PathBuf) -> Command {
    let mut cmd = cargo_bin_cmd!("elena");
    cmd.env("RUST_LOG", "error").arg("--data").arg(data);
    cmd
}

#[test]
fn route_prints_text_summary() {
    let (_dir, data) = dataset();
    cli(&data)
        .args(["route", "--from", "(42.39, -72.52)", "--to", "(42.39, -72.519)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shortest elevation, 100% distance budget"))
        .stdout(predicate::str::contains("100 m long, 0 m climbed"))
        .stdout(predicate::str::contains(" + (42.390000, -72.520000)"));
}

#[test]
fn maximal_route_as_json() {
    let (_dir, data) = dataset();
    cli(&data)
        .args([
            "route",
            "--from",
            "42.39, -72.52",
            "--to",
            "(42.39, -72.519)",
            "--distance",
            "110",
            "--elevation",
            "maximal",
            "--graph",
            "loading",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"shortRoute\""))
        .stdout(predicate::str::contains("\"elevationGain\": 20"))
        .stdout(predicate::str::contains("\"pathLength\": 110"));
}

#[test]
fn distance_below_100_is_rejected() {
    let (_dir, data) = dataset();
    cli(&data)
        .args([
            "route",
            "--from",
            "(42.39, -72.52)",
            "--to",
            "(42.39, -72.519)",
            "--distance",
            "99",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("distance percent must be at least 100"));
}

#[test]
fn unknown_algorithm_is_rejected_by_parser() {
    let (_dir, data) = dataset();
    cli(&data)
        .args([
            "route",
            "--from",
            "(42.39, -72.52)",
            "--to",
            "(42.39, -72.519)",
            "--algorithm",
            "bfs",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("algorithm must be one of"));
}

#[test]
fn zero_timeout_is_rejected_by_parser() {
    let (_dir, data) = dataset();
    cli(&data)
        .args([
            "route",
            "--from",
            "(42.39, -72.52)",
            "--to",
            "(42.39, -72.519)",
            "--timeout",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout"));
}

#[test]
fn missing_dataset_is_reported() {
    let dir = tempdir().expect("create temp dir");
    cli(&dir.path().join("nope.db"))
        .args(["route", "--from", "(0, 0)", "--to", "(0, 0.001)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dataset not found"));
}

#[test]
fn geocode_accepts_close_spelling() {
    let (_dir, data) = dataset();
    cli(&data)
        .args(["geocode", "amherst comon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(42.39, -72.52)"));
}

#[test]
fn geocode_unknown_place_fails() {
    let (_dir, data) = dataset();
    cli(&data)
        .args(["geocode", "Springfield"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no place matching 'Springfield'"));
}
