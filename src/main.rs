use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
};

use ipl_terminal::auth::CredentialStore;
use ipl_terminal::dataset::{self, MatchTable};
use ipl_terminal::export;
use ipl_terminal::state::{AppState, GateField, GateTab, Screen};
use ipl_terminal::view::{self, ChartKind, ChartSpec, ViewKind, ViewOutput};

struct App {
    state: AppState,
    table: MatchTable,
    store: CredentialStore,
    output: Option<ViewOutput>,
    should_quit: bool,
}

impl App {
    fn new(table: MatchTable, store: CredentialStore) -> Self {
        let state = AppState::new(&table);
        Self {
            state,
            table,
            store,
            output: None,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match self.state.screen {
            Screen::Gate => self.on_gate_key(key),
            Screen::Dashboard => self.on_dashboard_key(key),
        }
    }

    fn on_gate_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Left | KeyCode::Right => {
                self.state.gate_tab = match self.state.gate_tab {
                    GateTab::Login => GateTab::SignUp,
                    GateTab::SignUp => GateTab::Login,
                };
                self.state.clear_gate_inputs();
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
                self.state.gate_field = match self.state.gate_field {
                    GateField::Username => GateField::Password,
                    GateField::Password => GateField::Username,
                };
            }
            KeyCode::Backspace => {
                match self.state.gate_field {
                    GateField::Username => self.state.username_input.pop(),
                    GateField::Password => self.state.password_input.pop(),
                };
            }
            KeyCode::Char(c) => match self.state.gate_field {
                GateField::Username => self.state.username_input.push(c),
                GateField::Password => self.state.password_input.push(c),
            },
            KeyCode::Enter => self.submit_gate(),
            _ => {}
        }
    }

    fn submit_gate(&mut self) {
        let username = self.state.username_input.clone();
        let password = self.state.password_input.clone();
        match self.state.gate_tab {
            GateTab::Login => match self.store.login(&username, &password) {
                Ok(session) => {
                    self.state.push_log(format!("[INFO] Logged in as {username}"));
                    self.state.session = Some(session);
                    self.state.screen = Screen::Dashboard;
                    self.state.clear_gate_inputs();
                    self.refresh_view();
                }
                Err(err) => self.state.push_log(format!("[WARN] {err}")),
            },
            GateTab::SignUp => match self.store.register(&username, &password) {
                Ok(()) => {
                    self.state
                        .push_log("[INFO] Account created, please log in");
                    self.state.gate_tab = GateTab::Login;
                    self.state.clear_gate_inputs();
                }
                Err(err) => self.state.push_log(format!("[WARN] {err}")),
            },
        }
    }

    fn on_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.menu_next();
                self.refresh_view();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.menu_prev();
                self.refresh_view();
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.state.cycle_filter(1);
                self.refresh_view();
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.state.cycle_filter(-1);
                self.refresh_view();
            }
            KeyCode::Tab => self.state.toggle_filter_focus(),
            KeyCode::Char('e') => self.export_current(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => {
                if let Some(session) = self.state.session.take() {
                    self.state
                        .push_log(format!("[INFO] Logged out {}", session.username));
                    self.store.logout(session);
                }
                self.output = None;
                self.state.screen = Screen::Gate;
            }
            _ => {}
        }
    }

    /// One synchronous aggregation per interaction; errors land in the
    /// console, never on the floor.
    fn refresh_view(&mut self) {
        let kind = self.state.current_view();
        let selection = self.state.selection();
        match view::build_view(&self.table, kind, &selection) {
            Ok(output) => self.output = Some(output),
            Err(err) => {
                self.output = None;
                self.state.push_log(format!("[WARN] {err}"));
            }
        }
    }

    fn export_current(&mut self) {
        let Some(output) = &self.output else {
            self.state.push_log("[INFO] Nothing to export");
            return;
        };
        let path = export_path(output.kind);
        match export::export_view(&path, output) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} sheet(s), {} series row(s) to {}",
                report.sheets,
                report.series_rows,
                path.display()
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }
}

fn export_path(kind: ViewKind) -> PathBuf {
    let slug: String = kind
        .label()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    PathBuf::from(format!("ipl_{slug}.xlsx"))
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let csv_path = PathBuf::from(
        std::env::var("IPL_DATASET_CSV").unwrap_or_else(|_| "ipl_dashboard_dataset.csv".to_string()),
    );
    let db_path = match std::env::var("IPL_DB_PATH") {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => dataset::default_db_path().ok_or_else(|| anyhow!("no cache dir for sqlite db"))?,
    };
    let refresh = std::env::var("IPL_REFRESH_DATA").is_ok_and(|v| v == "1" || v == "true");
    let table = dataset::load_or_ingest(&csv_path, &db_path, refresh)
        .with_context(|| format!("load dataset from {}", csv_path.display()))?;

    let credentials_path = match std::env::var("IPL_CREDENTIALS_FILE") {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => ipl_terminal::auth::default_credentials_path()
            .ok_or_else(|| anyhow!("no cache dir for credential file"))?,
    };
    let store = CredentialStore::open(&credentials_path).context("open credential store")?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(table, store);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Gate => render_gate(frame, chunks[1], app),
        Screen::Dashboard => render_dashboard(frame, chunks[1], app),
    }

    let footer = Paragraph::new(footer_text(app)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    match app.state.screen {
        Screen::Gate => "IPL ANALYTICS | Sign in to continue".to_string(),
        Screen::Dashboard => {
            let user = app
                .state
                .session
                .as_ref()
                .map(|s| s.username.as_str())
                .unwrap_or("-");
            format!(
                "IPL ANALYTICS | {} | user: {user}",
                app.state.current_view().label()
            )
        }
    }
}

fn footer_text(app: &App) -> String {
    match app.state.screen {
        Screen::Gate => {
            "←/→ Log-in/Sign-Up | Tab Field | Enter Submit | Esc Quit".to_string()
        }
        Screen::Dashboard => {
            "j/k Menu | h/l Filter | Tab Slot | e Export | ? Help | Esc Logout | q Quit".to_string()
        }
    }
}

fn render_gate(frame: &mut Frame, area: Rect, app: &App) {
    let popup = centered_rect(50, 60, area);
    let title = match app.state.gate_tab {
        GateTab::Login => "Log In",
        GateTab::SignUp => "Sign Up",
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let tabs = match app.state.gate_tab {
        GateTab::Login => "[ Log-in ]  Sign-Up ",
        GateTab::SignUp => "  Log-in  [ Sign-Up ]",
    };
    frame.render_widget(Paragraph::new(tabs), rows[0]);

    let field_style = |field: GateField| {
        if app.state.gate_field == field {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let username = Paragraph::new(app.state.username_input.as_str())
        .style(field_style(GateField::Username))
        .block(Block::default().title("Username").borders(Borders::ALL));
    frame.render_widget(username, rows[1]);

    let masked = "*".repeat(app.state.password_input.chars().count());
    let password = Paragraph::new(masked)
        .style(field_style(GateField::Password))
        .block(Block::default().title("Password").borders(Borders::ALL));
    frame.render_widget(password, rows[2]);

    let message = app
        .state
        .logs
        .back()
        .cloned()
        .unwrap_or_else(|| "If you do not have an account, sign up first".to_string());
    let hint = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, rows[3]);
}

fn render_dashboard(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(area);

    render_menu(frame, columns[0], app);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(5),
        ])
        .split(columns[1]);

    render_metrics(frame, rows[0], app);
    render_chart(frame, rows[1], app);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn render_menu(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();
    for (idx, kind) in ViewKind::ALL.iter().enumerate() {
        let prefix = if idx == app.state.menu_selected {
            "> "
        } else {
            "  "
        };
        lines.push(format!("{prefix}{}", kind.label()));
    }
    if let Some((label, value)) = app.state.focused_filter_label() {
        lines.push(String::new());
        lines.push(format!("{label}: {value}"));
        if app.state.filter_slots() > 1 {
            lines.push(format!("slot {}/{}", app.state.filter_focus + 1, app.state.filter_slots()));
        }
    }
    let menu = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("IPL Analytics").borders(Borders::ALL));
    frame.render_widget(menu, area);
}

fn render_metrics(frame: &mut Frame, area: Rect, app: &App) {
    let Some(output) = &app.output else {
        let empty = Paragraph::new("No view computed; see console")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };
    if output.metrics.is_empty() {
        return;
    }

    let constraints: Vec<Constraint> = output
        .metrics
        .iter()
        .map(|_| Constraint::Ratio(1, output.metrics.len() as u32))
        .collect();
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (tile, metric) in tiles.iter().zip(&output.metrics) {
        let widget = Paragraph::new(metric.value.as_str())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().title(metric.label.as_str()).borders(Borders::ALL));
        frame.render_widget(widget, *tile);
    }
}

fn render_chart(frame: &mut Frame, area: Rect, app: &App) {
    let Some(output) = &app.output else {
        return;
    };
    match output.chart.kind {
        ChartKind::Metrics => render_about(frame, area),
        ChartKind::Bar => render_bar(frame, area, &output.chart),
        ChartKind::GroupedBar => render_grouped_bar(frame, area, &output.chart),
        ChartKind::Scatter => render_scatter(frame, area, &output.chart),
        ChartKind::Pie => render_share(frame, area, &output.chart),
    }
}

fn render_about(frame: &mut Frame, area: Rect) {
    let text = [
        "Welcome to the IPL Analytics Dashboard.",
        "",
        "Overall Team Performance - team statistics across seasons",
        "Player Insights          - player-of-the-match trends",
        "Venue Analytics          - how grounds shape match results",
        "Head-to-Head Analysis    - two teams compared",
        "Season Overview          - each season at a glance",
        "",
        "Use j/k to navigate sections and h/l to change filters.",
    ]
    .join("\n");
    let about = Paragraph::new(text).block(Block::default().title("About").borders(Borders::ALL));
    frame.render_widget(about, area);
}

fn render_bar(frame: &mut Frame, area: Rect, chart: &ChartSpec) {
    let Some(series) = chart.series.first() else {
        return;
    };
    if series.points.is_empty() {
        render_empty_chart(frame, area, chart);
        return;
    }
    let bars: Vec<Bar> = series
        .points
        .iter()
        .map(|p| {
            Bar::default()
                .value(p.value.round() as u64)
                .label(p.label.clone().into())
        })
        .collect();
    let widget = BarChart::default()
        .block(Block::default().title(chart.title.as_str()).borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area, bars.len()))
        .bar_gap(1);
    frame.render_widget(widget, area);
}

fn render_grouped_bar(frame: &mut Frame, area: Rect, chart: &ChartSpec) {
    let categories: Vec<&str> = chart
        .series
        .first()
        .map(|s| s.points.iter().map(|p| p.label.as_str()).collect())
        .unwrap_or_default();
    if categories.is_empty() {
        render_empty_chart(frame, area, chart);
        return;
    }

    let palette = [Color::Green, Color::Red, Color::Yellow, Color::Blue];
    let mut widget = BarChart::default()
        .block(Block::default().title(chart.title.as_str()).borders(Borders::ALL))
        .bar_width(bar_width(area, categories.len() * chart.series.len()))
        .bar_gap(1)
        .group_gap(3);

    for (cat_idx, category) in categories.iter().enumerate() {
        let bars: Vec<Bar> = chart
            .series
            .iter()
            .enumerate()
            .filter_map(|(s_idx, series)| {
                series.points.get(cat_idx).map(|p| {
                    Bar::default()
                        .value(p.value.round() as u64)
                        .label(series.name.clone().into())
                        .style(Style::default().fg(palette[s_idx % palette.len()]))
                })
            })
            .collect();
        widget = widget.data(BarGroup::default().label((*category).into()).bars(&bars));
    }
    frame.render_widget(widget, area);
}

fn render_scatter(frame: &mut Frame, area: Rect, chart: &ChartSpec) {
    let palette = [Color::Green, Color::Red, Color::Yellow, Color::Blue];
    let mut point_sets: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
    for series in &chart.series {
        let pts: Vec<(f64, f64)> = series
            .points
            .iter()
            .enumerate()
            .map(|(idx, p)| (numeric_label(&p.label, idx), p.value))
            .collect();
        point_sets.push((series.name.clone(), pts));
    }

    let all: Vec<(f64, f64)> = point_sets.iter().flat_map(|(_, pts)| pts.clone()).collect();
    if all.is_empty() {
        render_empty_chart(frame, area, chart);
        return;
    }
    let (x_min, x_max) = padded_bounds(all.iter().map(|(x, _)| *x));
    let (y_min, y_max) = padded_bounds(all.iter().map(|(_, y)| *y));

    let datasets: Vec<Dataset> = point_sets
        .iter()
        .enumerate()
        .map(|(idx, (name, pts))| {
            Dataset::default()
                .name(name.clone())
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(palette[idx % palette.len()]))
                .data(pts)
        })
        .collect();

    let x_labels = vec![
        Span::raw(format!("{x_min:.0}")),
        Span::raw(format!("{:.0}", (x_min + x_max) / 2.0)),
        Span::raw(format!("{x_max:.0}")),
    ];
    let y_labels = vec![
        Span::raw(format!("{y_min:.0}")),
        Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
        Span::raw(format!("{y_max:.0}")),
    ];

    let widget = Chart::new(datasets)
        .block(Block::default().title(chart.title.as_str()).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title(chart.x_label.as_str())
                .bounds([x_min, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.as_str())
                .bounds([y_min, y_max])
                .labels(y_labels),
        );
    frame.render_widget(widget, area);
}

/// Share-of-total view standing in for the original pie chart.
fn render_share(frame: &mut Frame, area: Rect, chart: &ChartSpec) {
    let Some(series) = chart.series.first() else {
        return;
    };
    let total: f64 = series.points.iter().map(|p| p.value).sum();
    if total <= 0.0 {
        render_empty_chart(frame, area, chart);
        return;
    }

    let palette = [Color::Green, Color::Red, Color::Yellow, Color::Blue];
    let bars: Vec<Bar> = series
        .points
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let pct = p.value / total * 100.0;
            Bar::default()
                .value(p.value.round() as u64)
                .label(p.label.clone().into())
                .text_value(format!("{} ({pct:.0}%)", p.value.round() as u64))
                .style(Style::default().fg(palette[idx % palette.len()]))
        })
        .collect();
    let widget = BarChart::default()
        .block(Block::default().title(chart.title.as_str()).borders(Borders::ALL))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(1);
    frame.render_widget(widget, area);
}

fn render_empty_chart(frame: &mut Frame, area: Rect, chart: &ChartSpec) {
    let empty = Paragraph::new("No data for this selection")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title(chart.title.as_str()).borders(Borders::ALL));
    frame.render_widget(empty, area);
}

fn bar_width(area: Rect, bars: usize) -> u16 {
    if bars == 0 {
        return 1;
    }
    let width = area.width.saturating_sub(2) / bars as u16;
    width.saturating_sub(1).clamp(1, 9)
}

fn numeric_label(label: &str, fallback_idx: usize) -> f64 {
    label
        .trim()
        .parse::<f64>()
        .unwrap_or(fallback_idx as f64)
}

fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.1).max(1.0);
    (min - pad, max + pad)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "IPL Analytics - Help",
        "",
        "Dashboard:",
        "  j/k or ↑/↓   Switch section",
        "  h/l or ←/→   Change filter value",
        "  Tab          Switch filter slot (Head-to-Head)",
        "  e            Export current view to xlsx",
        "  ?            Toggle help",
        "  Esc          Log out",
        "  q            Quit",
        "",
        "Sign-in:",
        "  ←/→          Switch Log-in / Sign-Up",
        "  Tab          Switch field",
        "  Enter        Submit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
