use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::{
    self, DatasetSummary, HeadToHead, PlayerInsights, SeasonOverview, TeamPerformance,
    VenueAnalytics,
};
use crate::dataset::{Column, MatchTable};

/// The six dashboard sections, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewKind {
    Home,
    TeamPerformance,
    PlayerInsights,
    VenueAnalytics,
    HeadToHead,
    SeasonOverview,
}

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        ViewKind::Home,
        ViewKind::TeamPerformance,
        ViewKind::PlayerInsights,
        ViewKind::VenueAnalytics,
        ViewKind::HeadToHead,
        ViewKind::SeasonOverview,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewKind::Home => "Home",
            ViewKind::TeamPerformance => "Overall Team Performance",
            ViewKind::PlayerInsights => "Player Insights",
            ViewKind::VenueAnalytics => "Venue Analytics",
            ViewKind::HeadToHead => "Head-to-Head Analysis",
            ViewKind::SeasonOverview => "Season Overview",
        }
    }

    /// Columns the view reads; absence surfaces as `MissingColumns`.
    pub fn required_columns(self) -> &'static [Column] {
        match self {
            ViewKind::Home => &[],
            ViewKind::TeamPerformance => {
                &[Column::Team1, Column::Team2, Column::Winner, Column::Season]
            }
            ViewKind::PlayerInsights => &[
                Column::PlayerOfMatch,
                Column::Team1,
                Column::Team2,
                Column::Winner,
            ],
            ViewKind::VenueAnalytics => &[
                Column::Venue,
                Column::Season,
                Column::RunsTeam1,
                Column::RunsTeam2,
            ],
            ViewKind::HeadToHead => &[Column::Team1, Column::Team2, Column::Winner],
            ViewKind::SeasonOverview => &[Column::Season, Column::Winner],
        }
    }
}

/// Per-view filter parameters chosen in the UI. Rebuilt for every dispatch;
/// nothing here outlives the request.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub team: Option<String>,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub venue: Option<String>,
    pub season: Option<String>,
    pub player: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("dataset is missing required columns: {}", .columns.iter().map(|c| c.header()).collect::<Vec<_>>().join(", "))]
    MissingColumns { columns: Vec<Column> },
    #[error("unknown {what}: {value:?}")]
    InvalidSelection { what: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    /// Metric tiles only, no plot.
    Metrics,
    Bar,
    GroupedBar,
    Scatter,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

/// Declarative chart description. Rendering and export consume it; neither
/// mutates it or re-queries the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AggregateResult {
    Home(DatasetSummary),
    TeamPerformance(TeamPerformance),
    PlayerInsights(PlayerInsights),
    VenueAnalytics(VenueAnalytics),
    HeadToHead(HeadToHead),
    SeasonOverview(SeasonOverview),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewOutput {
    pub kind: ViewKind,
    pub result: AggregateResult,
    pub metrics: Vec<Metric>,
    pub chart: ChartSpec,
}

/// Validate the selection against the table's domains, run the aggregation,
/// and describe the chart. Errors are user-facing messages, not crashes.
pub fn build_view(
    table: &MatchTable,
    kind: ViewKind,
    selection: &FilterSelection,
) -> Result<ViewOutput, ViewError> {
    let missing = table.missing_columns(kind.required_columns());
    if !missing.is_empty() {
        return Err(ViewError::MissingColumns { columns: missing });
    }

    match kind {
        ViewKind::Home => Ok(home_view(table)),
        ViewKind::TeamPerformance => {
            let team = require_in_domain("team", selection.team.as_deref(), &table.teams())?;
            Ok(team_performance_view(table, &team))
        }
        ViewKind::PlayerInsights => {
            let player =
                require_in_domain("player", selection.player.as_deref(), &table.players())?;
            Ok(player_insights_view(table, &player))
        }
        ViewKind::VenueAnalytics => {
            let venue = require_in_domain("venue", selection.venue.as_deref(), &table.venues())?;
            Ok(venue_analytics_view(table, &venue))
        }
        ViewKind::HeadToHead => {
            let teams = table.teams();
            let team_a = require_in_domain("team", selection.team_a.as_deref(), &teams)?;
            let team_b = require_in_domain("second team", selection.team_b.as_deref(), &teams)?;
            if team_a == team_b {
                return Err(ViewError::InvalidSelection {
                    what: "second team",
                    value: team_b,
                });
            }
            Ok(head_to_head_view(table, &team_a, &team_b))
        }
        ViewKind::SeasonOverview => {
            let season =
                require_in_domain("season", selection.season.as_deref(), &table.seasons())?;
            Ok(season_overview_view(table, &season))
        }
    }
}

fn require_in_domain(
    what: &'static str,
    value: Option<&str>,
    domain: &[String],
) -> Result<String, ViewError> {
    let value = value.unwrap_or("").trim();
    if !value.is_empty() && domain.iter().any(|v| v == value) {
        Ok(value.to_string())
    } else {
        Err(ViewError::InvalidSelection {
            what,
            value: value.to_string(),
        })
    }
}

fn home_view(table: &MatchTable) -> ViewOutput {
    let summary = aggregate::dataset_summary(table);
    let metrics = vec![
        metric("Matches", summary.total_matches),
        metric("Teams", summary.teams),
        metric("Venues", summary.venues),
        metric("Seasons", summary.seasons),
        metric("Players", summary.players),
    ];
    ViewOutput {
        kind: ViewKind::Home,
        metrics,
        chart: ChartSpec {
            kind: ChartKind::Metrics,
            title: "IPL Analytics Dashboard".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            series: Vec::new(),
        },
        result: AggregateResult::Home(summary),
    }
}

fn team_performance_view(table: &MatchTable, team: &str) -> ViewOutput {
    let perf = aggregate::team_performance(table, team);
    let metrics = vec![
        metric("Total Matches", perf.total_matches),
        metric("Wins", perf.wins),
        metric("Losses", perf.losses),
    ];
    let chart = ChartSpec {
        kind: ChartKind::Bar,
        title: format!("Yearly Wins for {team}"),
        x_label: "Season".to_string(),
        y_label: "Wins".to_string(),
        series: vec![ChartSeries {
            name: "Wins".to_string(),
            points: perf
                .wins_by_season
                .iter()
                .map(|(season, wins)| SeriesPoint {
                    label: season.clone(),
                    value: *wins as f64,
                })
                .collect(),
        }],
    };
    ViewOutput {
        kind: ViewKind::TeamPerformance,
        metrics,
        chart,
        result: AggregateResult::TeamPerformance(perf),
    }
}

fn player_insights_view(table: &MatchTable, player: &str) -> ViewOutput {
    let insights = aggregate::player_insights(table, player);
    let metrics = vec![
        metric("Player of the Match Awards", insights.total_awards),
        metric("Won", insights.matches_won),
        metric("Lost", insights.matches_lost),
    ];
    let chart = ChartSpec {
        kind: ChartKind::Pie,
        title: format!("Win/Loss Distribution for {player}"),
        x_label: String::new(),
        y_label: String::new(),
        series: vec![ChartSeries {
            name: "Outcome".to_string(),
            points: vec![
                SeriesPoint {
                    label: "Won".to_string(),
                    value: insights.matches_won as f64,
                },
                SeriesPoint {
                    label: "Lost".to_string(),
                    value: insights.matches_lost as f64,
                },
            ],
        }],
    };
    ViewOutput {
        kind: ViewKind::PlayerInsights,
        metrics,
        chart,
        result: AggregateResult::PlayerInsights(insights),
    }
}

fn venue_analytics_view(table: &MatchTable, venue: &str) -> ViewOutput {
    let analytics = aggregate::venue_analytics(table, venue);
    let metrics = vec![metric("Matches Hosted", analytics.total_matches)];

    let mut team1_points = Vec::new();
    let mut team2_points = Vec::new();
    for entry in &analytics.runs_series {
        if let Some(runs) = entry.runs_team1 {
            team1_points.push(SeriesPoint {
                label: entry.season.clone(),
                value: runs as f64,
            });
        }
        if let Some(runs) = entry.runs_team2 {
            team2_points.push(SeriesPoint {
                label: entry.season.clone(),
                value: runs as f64,
            });
        }
    }

    let chart = ChartSpec {
        kind: ChartKind::Scatter,
        title: format!("Runs Scored at {venue} Over the Seasons"),
        x_label: "Season".to_string(),
        y_label: "Runs Scored".to_string(),
        series: vec![
            ChartSeries {
                name: "Team 1 Innings".to_string(),
                points: team1_points,
            },
            ChartSeries {
                name: "Team 2 Innings".to_string(),
                points: team2_points,
            },
        ],
    };
    ViewOutput {
        kind: ViewKind::VenueAnalytics,
        metrics,
        chart,
        result: AggregateResult::VenueAnalytics(analytics),
    }
}

fn head_to_head_view(table: &MatchTable, team_a: &str, team_b: &str) -> ViewOutput {
    let h2h = aggregate::head_to_head(table, team_a, team_b);
    let metrics = vec![
        metric(&format!("{team_a} Total Wins"), h2h.total_wins_a),
        metric(&format!("{team_b} Total Wins"), h2h.total_wins_b),
        metric("Head-to-Head Matches", h2h.h2h_matches),
        metric(&format!("{team_a} H2H Wins"), h2h.h2h_wins_a),
        metric(&format!("{team_b} H2H Wins"), h2h.h2h_wins_b),
    ];
    let chart = ChartSpec {
        kind: ChartKind::GroupedBar,
        title: format!("Comparison Between {team_a} & {team_b}"),
        x_label: "Category".to_string(),
        y_label: "Number of Wins".to_string(),
        series: vec![
            ChartSeries {
                name: team_a.to_string(),
                points: vec![
                    SeriesPoint {
                        label: "Total Wins".to_string(),
                        value: h2h.total_wins_a as f64,
                    },
                    SeriesPoint {
                        label: "H2H Wins".to_string(),
                        value: h2h.h2h_wins_a as f64,
                    },
                ],
            },
            ChartSeries {
                name: team_b.to_string(),
                points: vec![
                    SeriesPoint {
                        label: "Total Wins".to_string(),
                        value: h2h.total_wins_b as f64,
                    },
                    SeriesPoint {
                        label: "H2H Wins".to_string(),
                        value: h2h.h2h_wins_b as f64,
                    },
                ],
            },
        ],
    };
    ViewOutput {
        kind: ViewKind::HeadToHead,
        metrics,
        chart,
        result: AggregateResult::HeadToHead(h2h),
    }
}

fn season_overview_view(table: &MatchTable, season: &str) -> ViewOutput {
    let overview = aggregate::season_overview(table, season);
    let metrics = match &overview.top_team {
        Some((team, wins)) => vec![
            Metric {
                label: "Most Wins".to_string(),
                value: team.clone(),
            },
            metric("Top Team Wins", *wins),
        ],
        None => vec![Metric {
            label: "Most Wins".to_string(),
            value: "no decisive matches".to_string(),
        }],
    };
    let chart = ChartSpec {
        kind: ChartKind::Bar,
        title: format!("Wins by Teams in {season}"),
        x_label: "Team".to_string(),
        y_label: "Wins".to_string(),
        series: vec![ChartSeries {
            name: "Wins".to_string(),
            points: overview
                .wins_by_team
                .iter()
                .map(|(team, wins)| SeriesPoint {
                    label: team.clone(),
                    value: *wins as f64,
                })
                .collect(),
        }],
    };
    ViewOutput {
        kind: ViewKind::SeasonOverview,
        metrics,
        chart,
        result: AggregateResult::SeasonOverview(overview),
    }
}

fn metric(label: &str, value: u64) -> Metric {
    Metric {
        label: label.to_string(),
        value: value.to_string(),
    }
}
