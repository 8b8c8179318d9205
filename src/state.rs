use std::collections::VecDeque;

use crate::auth::Session;
use crate::dataset::MatchTable;
use crate::view::{FilterSelection, ViewKind};

const LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Gate,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTab {
    Login,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateField {
    Username,
    Password,
}

pub struct AppState {
    pub screen: Screen,
    pub gate_tab: GateTab,
    pub gate_field: GateField,
    pub username_input: String,
    pub password_input: String,
    pub session: Option<Session>,

    pub menu_selected: usize,
    /// Which filter slot left/right cycles; only Head-to-Head has two.
    pub filter_focus: usize,
    team_idx: usize,
    player_idx: usize,
    venue_idx: usize,
    season_idx: usize,
    team_a_idx: usize,
    team_b_idx: usize,

    teams: Vec<String>,
    venues: Vec<String>,
    seasons: Vec<String>,
    players: Vec<String>,

    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(table: &MatchTable) -> Self {
        Self {
            screen: Screen::Gate,
            gate_tab: GateTab::Login,
            gate_field: GateField::Username,
            username_input: String::new(),
            password_input: String::new(),
            session: None,
            menu_selected: 0,
            filter_focus: 0,
            team_idx: 0,
            player_idx: 0,
            venue_idx: 0,
            season_idx: 0,
            team_a_idx: 0,
            team_b_idx: 0,
            teams: table.teams(),
            venues: table.venues(),
            seasons: table.seasons(),
            players: table.players(),
            logs: VecDeque::with_capacity(LOG_CAPACITY),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        if self.logs.len() == LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(msg.into());
    }

    pub fn current_view(&self) -> ViewKind {
        ViewKind::ALL[self.menu_selected % ViewKind::ALL.len()]
    }

    pub fn menu_next(&mut self) {
        self.menu_selected = (self.menu_selected + 1) % ViewKind::ALL.len();
        self.filter_focus = 0;
    }

    pub fn menu_prev(&mut self) {
        self.menu_selected = (self.menu_selected + ViewKind::ALL.len() - 1) % ViewKind::ALL.len();
        self.filter_focus = 0;
    }

    pub fn filter_slots(&self) -> usize {
        match self.current_view() {
            ViewKind::Home => 0,
            ViewKind::HeadToHead => 2,
            _ => 1,
        }
    }

    pub fn toggle_filter_focus(&mut self) {
        let slots = self.filter_slots();
        if slots > 1 {
            self.filter_focus = (self.filter_focus + 1) % slots;
        }
    }

    /// Cycle the focused filter value; `step` is +1 / -1.
    pub fn cycle_filter(&mut self, step: i64) {
        match self.current_view() {
            ViewKind::Home => {}
            ViewKind::TeamPerformance => {
                Self::cycle(&mut self.team_idx, self.teams.len(), step);
            }
            ViewKind::PlayerInsights => {
                Self::cycle(&mut self.player_idx, self.players.len(), step);
            }
            ViewKind::VenueAnalytics => {
                Self::cycle(&mut self.venue_idx, self.venues.len(), step);
            }
            ViewKind::SeasonOverview => {
                Self::cycle(&mut self.season_idx, self.seasons.len(), step);
            }
            ViewKind::HeadToHead => {
                if self.filter_focus == 0 {
                    Self::cycle(&mut self.team_a_idx, self.teams.len(), step);
                    self.team_b_idx = 0;
                } else {
                    let opponents_len = self.opponents().len();
                    Self::cycle(&mut self.team_b_idx, opponents_len, step);
                }
            }
        }
    }

    fn cycle(idx: &mut usize, len: usize, step: i64) {
        if len == 0 {
            return;
        }
        let len = len as i64;
        *idx = ((*idx as i64 + step).rem_euclid(len)) as usize;
    }

    /// Second-team domain: every team except the first selection.
    pub fn opponents(&self) -> Vec<String> {
        let first = self.teams.get(self.team_a_idx);
        self.teams
            .iter()
            .filter(|t| Some(*t) != first)
            .cloned()
            .collect()
    }

    pub fn focused_filter_label(&self) -> Option<(String, String)> {
        match self.current_view() {
            ViewKind::Home => None,
            ViewKind::TeamPerformance => {
                Some(("Team".to_string(), pick(&self.teams, self.team_idx)))
            }
            ViewKind::PlayerInsights => {
                Some(("Player".to_string(), pick(&self.players, self.player_idx)))
            }
            ViewKind::VenueAnalytics => {
                Some(("Venue".to_string(), pick(&self.venues, self.venue_idx)))
            }
            ViewKind::SeasonOverview => {
                Some(("Season".to_string(), pick(&self.seasons, self.season_idx)))
            }
            ViewKind::HeadToHead => {
                let opponents = self.opponents();
                Some((
                    format!("Team {}", self.filter_focus + 1),
                    if self.filter_focus == 0 {
                        pick(&self.teams, self.team_a_idx)
                    } else {
                        pick(&opponents, self.team_b_idx)
                    },
                ))
            }
        }
    }

    /// Snapshot of the current filter choices for dispatch. Rebuilt on every
    /// request; holds no references into the state.
    pub fn selection(&self) -> FilterSelection {
        let opponents = self.opponents();
        FilterSelection {
            team: self.teams.get(self.team_idx).cloned(),
            team_a: self.teams.get(self.team_a_idx).cloned(),
            team_b: opponents.get(self.team_b_idx).cloned(),
            venue: self.venues.get(self.venue_idx).cloned(),
            season: self.seasons.get(self.season_idx).cloned(),
            player: self.players.get(self.player_idx).cloned(),
        }
    }

    pub fn clear_gate_inputs(&mut self) {
        self.username_input.clear();
        self.password_input.clear();
        self.gate_field = GateField::Username;
    }
}

fn pick(domain: &[String], idx: usize) -> String {
    domain.get(idx).cloned().unwrap_or_else(|| "-".to_string())
}
