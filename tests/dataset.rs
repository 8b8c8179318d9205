use std::fs;

use ipl_terminal::dataset::{self, Column};
use ipl_terminal::view::{FilterSelection, ViewError, ViewKind, build_view};

const FULL_CSV: &str = "\
Match_ID,Season,Team1,Team2,Winner,Venue,Player_of_Match,Runs_Team1,Runs_Team2
1,2020,A,B,A,Eden,p1,170,150
2,2020,B,A,B,Eden,p2,140,130
3,2021,A,C,,Chepauk,p1,165,165
4,2021,C,B,D,Wankhede,p3,150,149
";

#[test]
fn ingest_and_load_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let csv_path = dir.path().join("matches.csv");
    let db_path = dir.path().join("matches.sqlite");
    fs::write(&csv_path, FULL_CSV).expect("write csv");

    let mut conn = dataset::open_db(&db_path).expect("open db");
    let summary =
        dataset::ingest_csv(&mut conn, &csv_path, db_path.clone()).expect("ingest csv");
    assert_eq!(summary.rows_ingested, 4);
    assert_eq!(summary.rows_skipped, 0);
    assert_eq!(summary.columns.len(), Column::ALL.len());
    // Row 4 names a winner that played in neither side.
    assert_eq!(summary.warnings.len(), 1);

    let table = dataset::load_table(&conn).expect("load table");
    assert_eq!(table.len(), 4);
    assert!(table.has_column(Column::Winner));

    let records = table.records();
    assert_eq!(records[0].match_id, 1);
    assert_eq!(records[0].winner.as_deref(), Some("A"));
    // Empty winner cell is a tie.
    assert_eq!(records[2].winner, None);
    // Invalid winner is nulled at ingest so no view credits a third team.
    assert_eq!(records[3].winner, None);
    assert_eq!(records[0].runs_team1, Some(170));

    assert_eq!(table.teams(), vec!["A", "B", "C"]);
    assert_eq!(table.seasons(), vec!["2021", "2020"]);
}

#[test]
fn load_or_ingest_only_reads_csv_once() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let csv_path = dir.path().join("matches.csv");
    let db_path = dir.path().join("matches.sqlite");
    fs::write(&csv_path, FULL_CSV).expect("write csv");

    let table = dataset::load_or_ingest(&csv_path, &db_path, false).expect("first load");
    assert_eq!(table.len(), 4);

    // Remove the source file; the second load must come from sqlite alone.
    fs::remove_file(&csv_path).expect("remove csv");
    let table = dataset::load_or_ingest(&csv_path, &db_path, false).expect("second load");
    assert_eq!(table.len(), 4);
}

#[test]
fn missing_winner_column_flows_through_to_views() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let csv_path = dir.path().join("matches.csv");
    let db_path = dir.path().join("matches.sqlite");
    fs::write(
        &csv_path,
        "Match_ID,Season,Team1,Team2,Venue,Player_of_Match,Runs_Team1,Runs_Team2\n\
         1,2020,A,B,Eden,p1,170,150\n",
    )
    .expect("write csv");

    let mut conn = dataset::open_db(&db_path).expect("open db");
    dataset::ingest_csv(&mut conn, &csv_path, db_path.clone()).expect("ingest csv");
    let table = dataset::load_table(&conn).expect("load table");
    assert!(!table.has_column(Column::Winner));

    let selection = FilterSelection {
        season: Some("2020".to_string()),
        ..FilterSelection::default()
    };
    let err = build_view(&table, ViewKind::SeasonOverview, &selection)
        .expect_err("season overview needs the winner column");
    assert!(matches!(err, ViewError::MissingColumns { .. }));

    let venue_selection = FilterSelection {
        venue: Some("Eden".to_string()),
        ..FilterSelection::default()
    };
    build_view(&table, ViewKind::VenueAnalytics, &venue_selection)
        .expect("venue analytics works without winners");
}

#[test]
fn rows_without_teams_are_skipped() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let csv_path = dir.path().join("matches.csv");
    let db_path = dir.path().join("matches.sqlite");
    fs::write(
        &csv_path,
        "Match_ID,Season,Team1,Team2,Winner,Venue,Player_of_Match,Runs_Team1,Runs_Team2\n\
         1,2020,A,B,A,Eden,p1,170,150\n\
         2,2020,,B,B,Eden,p2,140,130\n",
    )
    .expect("write csv");

    let mut conn = dataset::open_db(&db_path).expect("open db");
    let summary =
        dataset::ingest_csv(&mut conn, &csv_path, db_path.clone()).expect("ingest csv");
    assert_eq!(summary.rows_ingested, 1);
    assert_eq!(summary.rows_skipped, 1);
}
