use ipl_terminal::aggregate::{
    dataset_summary, head_to_head, player_insights, season_overview, team_performance,
    venue_analytics,
};
use ipl_terminal::dataset::{MatchRecord, MatchTable};

fn rec(
    match_id: u64,
    season: &str,
    team1: &str,
    team2: &str,
    winner: Option<&str>,
    venue: &str,
    player: &str,
) -> MatchRecord {
    MatchRecord {
        match_id,
        season: season.to_string(),
        team1: team1.to_string(),
        team2: team2.to_string(),
        winner: winner.map(|w| w.to_string()),
        venue: venue.to_string(),
        player_of_match: player.to_string(),
        runs_team1: Some(160),
        runs_team2: Some(150),
    }
}

fn sample_table() -> MatchTable {
    MatchTable::from_records(vec![
        rec(1, "2020", "A", "B", Some("A"), "Eden", "p1"),
        rec(2, "2020", "B", "A", Some("B"), "Eden", "p2"),
        rec(3, "2021", "A", "C", Some("A"), "Chepauk", "p1"),
        rec(4, "2021", "B", "C", None, "Eden", "p3"),
        rec(5, "2021", "C", "A", Some("C"), "Wankhede", "p4"),
    ])
}

#[test]
fn team_performance_matches_reference_scenario() {
    let table = MatchTable::from_records(vec![
        rec(1, "2020", "A", "B", Some("A"), "Eden", "p1"),
        rec(2, "2020", "B", "A", Some("B"), "Eden", "p2"),
        rec(3, "2021", "A", "C", Some("A"), "Eden", "p1"),
    ]);

    let perf = team_performance(&table, "A");
    assert_eq!(perf.total_matches, 3);
    assert_eq!(perf.wins, 2);
    assert_eq!(perf.losses, 1);
    assert_eq!(
        perf.wins_by_season,
        vec![("2020".to_string(), 1), ("2021".to_string(), 1)]
    );
}

#[test]
fn team_performance_wins_plus_losses_equals_total() {
    let table = sample_table();
    for team in table.teams() {
        let perf = team_performance(&table, &team);
        assert_eq!(perf.wins + perf.losses, perf.total_matches, "team {team}");
    }
}

#[test]
fn team_performance_unknown_team_is_zero_valued() {
    let perf = team_performance(&sample_table(), "Nowhere XI");
    assert_eq!(perf.total_matches, 0);
    assert_eq!(perf.wins, 0);
    assert_eq!(perf.losses, 0);
    assert!(perf.wins_by_season.is_empty());
}

#[test]
fn team_performance_ties_fold_into_losses() {
    // B played 3 matches, won 1; the tie in 2021 counts as a loss.
    let perf = team_performance(&sample_table(), "B");
    assert_eq!(perf.total_matches, 3);
    assert_eq!(perf.wins, 1);
    assert_eq!(perf.losses, 2);
}

#[test]
fn team_performance_empty_table_is_zero_valued() {
    let table = MatchTable::from_records(Vec::new());
    let perf = team_performance(&table, "A");
    assert_eq!(perf.total_matches, 0);
    assert!(perf.wins_by_season.is_empty());
}

#[test]
fn player_insights_counts_awards_and_outcomes() {
    let insights = player_insights(&sample_table(), "p1");
    assert_eq!(insights.total_awards, 2);
    assert_eq!(insights.matches_won, 2);
    assert_eq!(insights.matches_lost, 0);
}

#[test]
fn player_insights_zero_awards_is_zero_valued() {
    let insights = player_insights(&sample_table(), "nobody");
    assert_eq!(insights.total_awards, 0);
    assert_eq!(insights.matches_won, 0);
    assert_eq!(insights.matches_lost, 0);
}

#[test]
fn player_insights_null_winner_counts_as_loss() {
    // p3 was player of the match in the tied game.
    let insights = player_insights(&sample_table(), "p3");
    assert_eq!(insights.total_awards, 1);
    assert_eq!(insights.matches_won, 0);
    assert_eq!(insights.matches_lost, 1);
}

#[test]
fn venue_series_length_equals_total_matches() {
    let table = sample_table();
    for venue in table.venues() {
        let analytics = venue_analytics(&table, &venue);
        assert_eq!(
            analytics.runs_series.len() as u64,
            analytics.total_matches,
            "venue {venue}"
        );
    }
}

#[test]
fn venue_series_is_season_ascending_with_stable_row_order() {
    let table = MatchTable::from_records(vec![
        rec(1, "2021", "A", "B", Some("A"), "Eden", "p1"),
        rec(2, "2019", "B", "C", Some("B"), "Eden", "p2"),
        rec(3, "2021", "C", "A", Some("C"), "Eden", "p3"),
        rec(4, "2019", "A", "C", None, "Eden", "p4"),
    ]);
    let analytics = venue_analytics(&table, "Eden");
    let seasons: Vec<&str> = analytics
        .runs_series
        .iter()
        .map(|e| e.season.as_str())
        .collect();
    assert_eq!(seasons, vec!["2019", "2019", "2021", "2021"]);
    // Within a season, original row order survives the sort.
    assert_eq!(analytics.total_matches, 4);
}

#[test]
fn venue_unknown_is_zero_valued() {
    let analytics = venue_analytics(&sample_table(), "Lords");
    assert_eq!(analytics.total_matches, 0);
    assert!(analytics.runs_series.is_empty());
}

#[test]
fn head_to_head_counts_both_orientations() {
    let h2h = head_to_head(&sample_table(), "A", "B");
    // Rows 1 and 2 pair A/B in opposite orientations.
    assert_eq!(h2h.h2h_matches, 2);
    assert_eq!(h2h.h2h_wins_a, 1);
    assert_eq!(h2h.h2h_wins_b, 1);
    // Global totals span the whole table.
    assert_eq!(h2h.total_wins_a, 2);
    assert_eq!(h2h.total_wins_b, 1);
}

#[test]
fn head_to_head_wins_bounded_by_matches() {
    let table = sample_table();
    let teams = table.teams();
    for a in &teams {
        for b in &teams {
            if a == b {
                continue;
            }
            let h2h = head_to_head(&table, a, b);
            assert!(h2h.h2h_wins_a + h2h.h2h_wins_b <= h2h.h2h_matches, "{a} vs {b}");
        }
    }
}

#[test]
fn head_to_head_match_count_is_symmetric() {
    let table = sample_table();
    let ab = head_to_head(&table, "A", "B");
    let ba = head_to_head(&table, "B", "A");
    assert_eq!(ab.h2h_matches, ba.h2h_matches);
    assert_eq!(ab.h2h_wins_a, ba.h2h_wins_b);
}

#[test]
fn season_overview_sums_to_decisive_matches() {
    let table = sample_table();
    // 2021 has three matches, one of them tied.
    let overview = season_overview(&table, "2021");
    let total: u64 = overview.wins_by_team.iter().map(|(_, w)| w).sum();
    assert_eq!(total, 2);
}

#[test]
fn season_overview_breaks_ties_alphabetically() {
    let table = MatchTable::from_records(vec![
        rec(1, "2020", "B", "A", Some("B"), "Eden", "p1"),
        rec(2, "2020", "A", "B", Some("A"), "Eden", "p2"),
        rec(3, "2020", "C", "A", Some("C"), "Eden", "p3"),
    ]);
    let overview = season_overview(&table, "2020");
    assert_eq!(
        overview.wins_by_team,
        vec![
            ("A".to_string(), 1),
            ("B".to_string(), 1),
            ("C".to_string(), 1),
        ]
    );
    assert_eq!(overview.top_team, Some(("A".to_string(), 1)));
}

#[test]
fn season_overview_all_ties_has_no_top_team() {
    let table = MatchTable::from_records(vec![
        rec(1, "2022", "A", "B", None, "Eden", "p1"),
        rec(2, "2022", "B", "C", None, "Eden", "p2"),
    ]);
    let overview = season_overview(&table, "2022");
    assert_eq!(overview.top_team, None);
    assert!(overview.wins_by_team.is_empty());
}

#[test]
fn dataset_summary_counts_domains() {
    let summary = dataset_summary(&sample_table());
    assert_eq!(summary.total_matches, 5);
    assert_eq!(summary.teams, 3);
    assert_eq!(summary.venues, 3);
    assert_eq!(summary.seasons, 2);
    assert_eq!(summary.players, 4);
}
