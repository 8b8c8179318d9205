use ipl_terminal::dataset::{Column, MatchRecord, MatchTable};
use ipl_terminal::view::{
    AggregateResult, ChartKind, FilterSelection, ViewError, ViewKind, build_view,
};

fn rec(
    match_id: u64,
    season: &str,
    team1: &str,
    team2: &str,
    winner: Option<&str>,
    venue: &str,
    player: &str,
    runs: (Option<u32>, Option<u32>),
) -> MatchRecord {
    MatchRecord {
        match_id,
        season: season.to_string(),
        team1: team1.to_string(),
        team2: team2.to_string(),
        winner: winner.map(|w| w.to_string()),
        venue: venue.to_string(),
        player_of_match: player.to_string(),
        runs_team1: runs.0,
        runs_team2: runs.1,
    }
}

fn sample_table() -> MatchTable {
    MatchTable::from_records(vec![
        rec(1, "2020", "A", "B", Some("A"), "Eden", "p1", (Some(170), Some(150))),
        rec(2, "2020", "B", "A", Some("B"), "Eden", "p2", (Some(140), Some(130))),
        rec(3, "2021", "A", "C", Some("A"), "Chepauk", "p1", (None, Some(155))),
    ])
}

#[test]
fn home_needs_no_selection() {
    let output = build_view(&sample_table(), ViewKind::Home, &FilterSelection::default())
        .expect("home view should build");
    assert_eq!(output.chart.kind, ChartKind::Metrics);
    let AggregateResult::Home(summary) = output.result else {
        panic!("expected home result");
    };
    assert_eq!(summary.total_matches, 3);
}

#[test]
fn unknown_team_is_invalid_selection() {
    let selection = FilterSelection {
        team: Some("Nowhere XI".to_string()),
        ..FilterSelection::default()
    };
    let err = build_view(&sample_table(), ViewKind::TeamPerformance, &selection)
        .expect_err("unknown team must be rejected");
    assert_eq!(
        err,
        ViewError::InvalidSelection {
            what: "team",
            value: "Nowhere XI".to_string(),
        }
    );
}

#[test]
fn missing_selection_is_invalid_not_empty_result() {
    let err = build_view(
        &sample_table(),
        ViewKind::VenueAnalytics,
        &FilterSelection::default(),
    )
    .expect_err("absent venue must be rejected");
    assert!(matches!(err, ViewError::InvalidSelection { what: "venue", .. }));
}

#[test]
fn head_to_head_rejects_same_team_twice() {
    let selection = FilterSelection {
        team_a: Some("A".to_string()),
        team_b: Some("A".to_string()),
        ..FilterSelection::default()
    };
    let err = build_view(&sample_table(), ViewKind::HeadToHead, &selection)
        .expect_err("same team on both sides must be rejected");
    assert!(matches!(
        err,
        ViewError::InvalidSelection { what: "second team", .. }
    ));
}

#[test]
fn team_performance_chart_is_bar_over_seasons() {
    let selection = FilterSelection {
        team: Some("A".to_string()),
        ..FilterSelection::default()
    };
    let output = build_view(&sample_table(), ViewKind::TeamPerformance, &selection)
        .expect("view should build");
    assert_eq!(output.chart.kind, ChartKind::Bar);
    assert_eq!(output.chart.x_label, "Season");
    let series = &output.chart.series[0];
    let labels: Vec<&str> = series.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["2020", "2021"]);
    assert_eq!(output.metrics.len(), 3);
}

#[test]
fn player_insights_chart_is_win_loss_share() {
    let selection = FilterSelection {
        player: Some("p1".to_string()),
        ..FilterSelection::default()
    };
    let output = build_view(&sample_table(), ViewKind::PlayerInsights, &selection)
        .expect("view should build");
    assert_eq!(output.chart.kind, ChartKind::Pie);
    let labels: Vec<&str> = output.chart.series[0]
        .points
        .iter()
        .map(|p| p.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Won", "Lost"]);
}

#[test]
fn venue_chart_skips_absent_run_totals() {
    let selection = FilterSelection {
        venue: Some("Chepauk".to_string()),
        ..FilterSelection::default()
    };
    let output = build_view(&sample_table(), ViewKind::VenueAnalytics, &selection)
        .expect("view should build");
    assert_eq!(output.chart.kind, ChartKind::Scatter);
    // Team 1 runs are missing for the only Chepauk match; Team 2 has one point.
    assert!(output.chart.series[0].points.is_empty());
    assert_eq!(output.chart.series[1].points.len(), 1);
    let AggregateResult::VenueAnalytics(analytics) = output.result else {
        panic!("expected venue result");
    };
    assert_eq!(analytics.total_matches, 1);
}

#[test]
fn head_to_head_chart_groups_total_and_h2h_wins() {
    let selection = FilterSelection {
        team_a: Some("A".to_string()),
        team_b: Some("B".to_string()),
        ..FilterSelection::default()
    };
    let output =
        build_view(&sample_table(), ViewKind::HeadToHead, &selection).expect("view should build");
    assert_eq!(output.chart.kind, ChartKind::GroupedBar);
    assert_eq!(output.chart.series.len(), 2);
    for series in &output.chart.series {
        let labels: Vec<&str> = series.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Total Wins", "H2H Wins"]);
    }
}

#[test]
fn season_overview_without_winner_column_is_missing_columns() {
    let records = sample_table().records().to_vec();
    let table = MatchTable::new(
        records,
        Column::ALL.into_iter().filter(|c| *c != Column::Winner),
    );

    let selection = FilterSelection {
        season: Some("2020".to_string()),
        ..FilterSelection::default()
    };
    let err = build_view(&table, ViewKind::SeasonOverview, &selection)
        .expect_err("missing winner column must surface");
    assert_eq!(
        err,
        ViewError::MissingColumns {
            columns: vec![Column::Winner],
        }
    );
    assert!(err.to_string().contains("Winner"));

    // The same table still serves venue analytics, which never reads Winner.
    let venue_selection = FilterSelection {
        venue: Some("Eden".to_string()),
        ..FilterSelection::default()
    };
    build_view(&table, ViewKind::VenueAnalytics, &venue_selection)
        .expect("venue analytics needs no winner column");
}

#[test]
fn season_overview_reports_top_team() {
    let selection = FilterSelection {
        season: Some("2020".to_string()),
        ..FilterSelection::default()
    };
    let output = build_view(&sample_table(), ViewKind::SeasonOverview, &selection)
        .expect("view should build");
    let AggregateResult::SeasonOverview(overview) = output.result else {
        panic!("expected season result");
    };
    assert_eq!(overview.top_team, Some(("A".to_string(), 1)));
    assert_eq!(output.chart.series[0].points.len(), 2);
}
