use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dataset::MatchTable;

/// Order two season labels. Year-numbered seasons compare numerically so
/// "2016" sorts before "2021"; anything else falls back to string order.
pub fn season_order(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPerformance {
    pub team: String,
    pub total_matches: u64,
    pub wins: u64,
    pub losses: u64,
    /// One entry per season with at least one win, ascending season order.
    pub wins_by_season: Vec<(String, u64)>,
}

/// Matches the team played, wins, and losses with ties/no-results folded
/// into losses.
pub fn team_performance(table: &MatchTable, team: &str) -> TeamPerformance {
    let mut total_matches = 0u64;
    let mut wins = 0u64;
    let mut by_season: HashMap<&str, u64> = HashMap::new();

    for record in table.records() {
        if !record.involves(team) {
            continue;
        }
        total_matches += 1;
        if record.winner.as_deref() == Some(team) {
            wins += 1;
            *by_season.entry(record.season.as_str()).or_insert(0) += 1;
        }
    }

    let mut wins_by_season: Vec<(String, u64)> = by_season
        .into_iter()
        .map(|(season, count)| (season.to_string(), count))
        .collect();
    wins_by_season.sort_by(|a, b| season_order(&a.0, &b.0));

    TeamPerformance {
        team: team.to_string(),
        total_matches,
        wins,
        losses: total_matches - wins,
        wins_by_season,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInsights {
    pub player: String,
    pub total_awards: u64,
    pub matches_won: u64,
    pub matches_lost: u64,
}

/// Player-of-the-match counts. A match counts as won when its winner field
/// names either side of that row; a null winner counts as lost.
pub fn player_insights(table: &MatchTable, player: &str) -> PlayerInsights {
    let mut total_awards = 0u64;
    let mut matches_won = 0u64;

    for record in table.records() {
        if record.player_of_match != player {
            continue;
        }
        total_awards += 1;
        if let Some(winner) = record.winner.as_deref() {
            if winner == record.team1 || winner == record.team2 {
                matches_won += 1;
            }
        }
    }

    PlayerInsights {
        player: player.to_string(),
        total_awards,
        matches_won,
        matches_lost: total_awards - matches_won,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRuns {
    pub season: String,
    pub runs_team1: Option<u32>,
    pub runs_team2: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueAnalytics {
    pub venue: String,
    pub total_matches: u64,
    /// One entry per match at the venue, season ascending; matches within a
    /// season keep their original row order.
    pub runs_series: Vec<VenueRuns>,
}

pub fn venue_analytics(table: &MatchTable, venue: &str) -> VenueAnalytics {
    let mut runs_series: Vec<VenueRuns> = table
        .records()
        .iter()
        .filter(|r| r.venue == venue)
        .map(|r| VenueRuns {
            season: r.season.clone(),
            runs_team1: r.runs_team1,
            runs_team2: r.runs_team2,
        })
        .collect();
    runs_series.sort_by(|a, b| season_order(&a.season, &b.season));

    VenueAnalytics {
        venue: venue.to_string(),
        total_matches: runs_series.len() as u64,
        runs_series,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub team_a: String,
    pub team_b: String,
    pub total_wins_a: u64,
    pub total_wins_b: u64,
    pub h2h_matches: u64,
    pub h2h_wins_a: u64,
    pub h2h_wins_b: u64,
}

/// Global win totals plus the record between the two teams in either home
/// or away orientation. Ties within the pairing count toward neither side.
pub fn head_to_head(table: &MatchTable, team_a: &str, team_b: &str) -> HeadToHead {
    let mut total_wins_a = 0u64;
    let mut total_wins_b = 0u64;
    let mut h2h_matches = 0u64;
    let mut h2h_wins_a = 0u64;
    let mut h2h_wins_b = 0u64;

    for record in table.records() {
        match record.winner.as_deref() {
            Some(w) if w == team_a => total_wins_a += 1,
            Some(w) if w == team_b => total_wins_b += 1,
            _ => {}
        }

        let paired = (record.team1 == team_a && record.team2 == team_b)
            || (record.team1 == team_b && record.team2 == team_a);
        if !paired {
            continue;
        }
        h2h_matches += 1;
        match record.winner.as_deref() {
            Some(w) if w == team_a => h2h_wins_a += 1,
            Some(w) if w == team_b => h2h_wins_b += 1,
            _ => {}
        }
    }

    HeadToHead {
        team_a: team_a.to_string(),
        team_b: team_b.to_string(),
        total_wins_a,
        total_wins_b,
        h2h_matches,
        h2h_wins_a,
        h2h_wins_b,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonOverview {
    pub season: String,
    /// Absent when the season has no decisive match.
    pub top_team: Option<(String, u64)>,
    /// Wins descending, equal counts alphabetical by team.
    pub wins_by_team: Vec<(String, u64)>,
}

pub fn season_overview(table: &MatchTable, season: &str) -> SeasonOverview {
    let mut by_team: HashMap<&str, u64> = HashMap::new();
    for record in table.records() {
        if record.season != season {
            continue;
        }
        if let Some(winner) = record.winner.as_deref() {
            *by_team.entry(winner).or_insert(0) += 1;
        }
    }

    let mut wins_by_team: Vec<(String, u64)> = by_team
        .into_iter()
        .map(|(team, count)| (team.to_string(), count))
        .collect();
    wins_by_team.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    SeasonOverview {
        season: season.to_string(),
        top_team: wins_by_team.first().cloned(),
        wins_by_team,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_matches: u64,
    pub teams: u64,
    pub venues: u64,
    pub seasons: u64,
    pub players: u64,
}

/// Headline numbers for the Home view.
pub fn dataset_summary(table: &MatchTable) -> DatasetSummary {
    DatasetSummary {
        total_matches: table.len() as u64,
        teams: table.teams().len() as u64,
        venues: table.venues().len() as u64,
        seasons: table.seasons().len() as u64,
        players: table.players().len() as u64,
    }
}
