use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use csv::ReaderBuilder;
use rusqlite::{Connection, params};

/// Columns the dashboard knows about. A source file may omit some of them;
/// views that need an absent column fail with `MissingColumns` instead of
/// reading garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    MatchId,
    Season,
    Team1,
    Team2,
    Winner,
    Venue,
    PlayerOfMatch,
    RunsTeam1,
    RunsTeam2,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::MatchId,
        Column::Season,
        Column::Team1,
        Column::Team2,
        Column::Winner,
        Column::Venue,
        Column::PlayerOfMatch,
        Column::RunsTeam1,
        Column::RunsTeam2,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::MatchId => "Match_ID",
            Column::Season => "Season",
            Column::Team1 => "Team1",
            Column::Team2 => "Team2",
            Column::Winner => "Winner",
            Column::Venue => "Venue",
            Column::PlayerOfMatch => "Player_of_Match",
            Column::RunsTeam1 => "Runs_Team1",
            Column::RunsTeam2 => "Runs_Team2",
        }
    }

    fn matches_header(self, raw: &str) -> bool {
        normalize_header(raw) == normalize_header(self.header())
    }
}

fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub match_id: u64,
    pub season: String,
    pub team1: String,
    pub team2: String,
    pub winner: Option<String>,
    pub venue: String,
    pub player_of_match: String,
    pub runs_team1: Option<u32>,
    pub runs_team2: Option<u32>,
}

impl MatchRecord {
    /// A decisive match has a winner; ties and no-results do not.
    pub fn is_decisive(&self) -> bool {
        self.winner.is_some()
    }

    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }
}

/// Immutable in-memory table of match records, loaded once per process.
/// Rows keep their source order; `columns` records what the source header
/// actually carried.
#[derive(Debug, Clone)]
pub struct MatchTable {
    records: Vec<MatchRecord>,
    columns: BTreeSet<Column>,
}

impl MatchTable {
    pub fn new(records: Vec<MatchRecord>, columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            records,
            columns: columns.into_iter().collect(),
        }
    }

    /// Table with every known column present; the common case for tests and
    /// for datasets with a complete header.
    pub fn from_records(records: Vec<MatchRecord>) -> Self {
        Self::new(records, Column::ALL)
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Columns from `required` that the source did not provide.
    pub fn missing_columns(&self, required: &[Column]) -> Vec<Column> {
        required
            .iter()
            .copied()
            .filter(|c| !self.columns.contains(c))
            .collect()
    }

    /// Every team appearing on either side of a match, sorted.
    pub fn teams(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        for r in &self.records {
            set.insert(r.team1.clone());
            set.insert(r.team2.clone());
        }
        set.into_iter().collect()
    }

    pub fn venues(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        for r in &self.records {
            if !r.venue.is_empty() {
                set.insert(r.venue.clone());
            }
        }
        set.into_iter().collect()
    }

    /// Seasons newest-first, matching the season picker.
    pub fn seasons(&self) -> Vec<String> {
        let mut seasons: Vec<String> = self
            .records
            .iter()
            .map(|r| r.season.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        seasons.sort_by(|a, b| crate::aggregate::season_order(b, a));
        seasons
    }

    pub fn players(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        for r in &self.records {
            if !r.player_of_match.is_empty() {
                set.insert(r.player_of_match.clone());
            }
        }
        set.into_iter().collect()
    }
}

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub db_path: PathBuf,
    pub rows_ingested: usize,
    pub rows_skipped: usize,
    pub columns: Vec<Column>,
    pub warnings: Vec<String>,
}

const CACHE_DIR: &str = "ipl_terminal";

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("ipl_matches.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS matches (
            row_ord INTEGER PRIMARY KEY,
            match_id INTEGER NOT NULL,
            season TEXT NOT NULL,
            team1 TEXT NOT NULL,
            team2 TEXT NOT NULL,
            winner TEXT NULL,
            venue TEXT NOT NULL,
            player_of_match TEXT NOT NULL,
            runs_team1 INTEGER NULL,
            runs_team2 INTEGER NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_season ON matches(season);
        CREATE INDEX IF NOT EXISTS idx_matches_venue ON matches(venue);
        CREATE INDEX IF NOT EXISTS idx_matches_winner ON matches(winner);

        CREATE TABLE IF NOT EXISTS dataset_columns (
            name TEXT PRIMARY KEY
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Ingest the dataset CSV, replacing any previous contents. Rows keep their
/// file order so later season sorts can break ties by original position.
pub fn ingest_csv(conn: &mut Connection, csv_path: &Path, db_path: PathBuf) -> Result<IngestSummary> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("open dataset csv {}", csv_path.display()))?;

    let headers = reader.headers().context("read dataset header")?.clone();
    let mut index: Vec<(Column, usize)> = Vec::new();
    for column in Column::ALL {
        if let Some(pos) = headers.iter().position(|h| column.matches_header(h)) {
            index.push((column, pos));
        }
    }
    let columns: Vec<Column> = index.iter().map(|(c, _)| *c).collect();
    if columns.is_empty() {
        return Err(anyhow!(
            "dataset header has none of the expected columns: {:?}",
            headers.iter().collect::<Vec<_>>()
        ));
    }

    let field = |record: &csv::StringRecord, column: Column| -> Option<String> {
        let pos = index.iter().find(|(c, _)| *c == column).map(|(_, p)| *p)?;
        record.get(pos).map(|s| s.trim().to_string())
    };

    let mut rows: Vec<MatchRecord> = Vec::new();
    let mut rows_skipped = 0usize;
    let mut warnings: Vec<String> = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(err) => {
                rows_skipped += 1;
                warnings.push(format!("row {}: {err}", line + 2));
                continue;
            }
        };

        let team1 = field(&record, Column::Team1).unwrap_or_default();
        let team2 = field(&record, Column::Team2).unwrap_or_default();
        if team1.is_empty() || team2.is_empty() {
            rows_skipped += 1;
            continue;
        }

        let match_id = field(&record, Column::MatchId)
            .and_then(|s| parse_u64(&s))
            .unwrap_or(line as u64 + 1);
        let mut winner = field(&record, Column::Winner).filter(|s| !s.is_empty());
        if let Some(w) = winner.as_deref() {
            if w != team1 && w != team2 {
                log::warn!("match {match_id}: winner {w:?} is neither {team1:?} nor {team2:?}");
                warnings.push(format!("match {match_id}: winner {w:?} not in match"));
                winner = None;
            }
        }

        rows.push(MatchRecord {
            match_id,
            season: field(&record, Column::Season).unwrap_or_default(),
            team1,
            team2,
            winner,
            venue: field(&record, Column::Venue).unwrap_or_default(),
            player_of_match: field(&record, Column::PlayerOfMatch).unwrap_or_default(),
            runs_team1: field(&record, Column::RunsTeam1).and_then(|s| parse_u32(&s)),
            runs_team2: field(&record, Column::RunsTeam2).and_then(|s| parse_u32(&s)),
        });
    }

    let tx = conn.transaction().context("begin ingest transaction")?;
    tx.execute("DELETE FROM matches", []).context("clear matches")?;
    tx.execute("DELETE FROM dataset_columns", [])
        .context("clear dataset columns")?;
    let updated_at = Utc::now().to_rfc3339();
    for (ord, row) in rows.iter().enumerate() {
        tx.execute(
            r#"
            INSERT INTO matches (
                row_ord, match_id, season, team1, team2, winner, venue,
                player_of_match, runs_team1, runs_team2, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                ord as i64,
                row.match_id as i64,
                row.season,
                row.team1,
                row.team2,
                row.winner,
                row.venue,
                row.player_of_match,
                row.runs_team1,
                row.runs_team2,
                updated_at,
            ],
        )
        .context("insert match row")?;
    }
    for column in &columns {
        tx.execute(
            "INSERT OR IGNORE INTO dataset_columns(name) VALUES (?1)",
            params![column.header()],
        )
        .context("record dataset column")?;
    }
    tx.commit().context("commit ingest transaction")?;

    Ok(IngestSummary {
        db_path,
        rows_ingested: rows.len(),
        rows_skipped,
        columns,
        warnings,
    })
}

/// Load the full table in source order. This is the process's single read of
/// the dataset; the returned handle is never refreshed.
pub fn load_table(conn: &Connection) -> Result<MatchTable> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT match_id, season, team1, team2, winner, venue,
                   player_of_match, runs_team1, runs_team2
            FROM matches
            ORDER BY row_ord ASC
            "#,
        )
        .context("prepare load matches query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(MatchRecord {
                match_id: row.get::<_, i64>(0)? as u64,
                season: row.get(1)?,
                team1: row.get(2)?,
                team2: row.get(3)?,
                winner: row.get(4)?,
                venue: row.get(5)?,
                player_of_match: row.get(6)?,
                runs_team1: row.get(7)?,
                runs_team2: row.get(8)?,
            })
        })
        .context("query load matches")?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row.context("decode match row")?);
    }

    let mut columns = Vec::new();
    let mut col_stmt = conn
        .prepare("SELECT name FROM dataset_columns")
        .context("prepare dataset columns query")?;
    let names = col_stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query dataset columns")?;
    for name in names {
        let name = name.context("decode dataset column")?;
        if let Some(column) = Column::ALL.iter().find(|c| c.matches_header(&name)) {
            columns.push(*column);
        }
    }

    Ok(MatchTable::new(records, columns))
}

/// One-shot init: ingest the CSV if the db is empty or `refresh` is set,
/// then load the immutable table handle.
pub fn load_or_ingest(csv_path: &Path, db_path: &Path, refresh: bool) -> Result<MatchTable> {
    let mut conn = open_db(db_path)?;
    let have_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
        .context("count ingested matches")?;
    if refresh || have_rows == 0 {
        let summary = ingest_csv(&mut conn, csv_path, db_path.to_path_buf())?;
        log::info!(
            "ingested {} rows ({} skipped) from {}",
            summary.rows_ingested,
            summary.rows_skipped,
            csv_path.display()
        );
    }
    load_table(&conn)
}

fn parse_u64(raw: &str) -> Option<u64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    s.parse::<u64>().ok()
}

fn parse_u32(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    // Some exports write runs as floats ("165.0").
    if let Ok(v) = s.parse::<u32>() {
        return Some(v);
    }
    s.parse::<f64>().ok().and_then(|v| {
        if v.is_finite() && v >= 0.0 {
            Some(v.round() as u32)
        } else {
            None
        }
    })
}
