use chrono::{DateTime, Local};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{Options, PresentationMode};
use crate::lexicon::WordCategory;
use crate::transform::{ActivityMode, Direction, LetterTransform};

/// How many entries the leaderboard shows.
pub const TOP_SCORES_LIMIT: usize = 25;

/// The settings a score was achieved under, kept alongside the score so
/// entries with different difficulty are distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSettings {
    pub direction: Direction,
    pub letters: LetterTransform,
    pub presentation: PresentationMode,
    pub word_count: usize,
    pub category: WordCategory,
    pub list_repetitions: usize,
}

impl ScoreSettings {
    /// Italian activity label shown next to the score.
    pub fn activity_label(&self) -> String {
        ActivityMode::new(self.direction, self.letters).label()
    }
}

impl From<&Options> for ScoreSettings {
    fn from(options: &Options) -> Self {
        Self {
            direction: options.direction,
            letters: options.letters,
            presentation: options.presentation,
            word_count: options.word_count,
            category: options.category,
            list_repetitions: options.list_repetitions,
        }
    }
}

/// One leaderboard entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u8,
    pub date: DateTime<Local>,
    pub settings: ScoreSettings,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store has no usable location; distinct from transient failures
    /// so the caller can explain what is missing instead of crashing.
    #[error("no usable location for the leaderboard database")]
    NotConfigured,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub trait ScoreStore {
    fn append(&self, record: &ScoreRecord) -> Result<(), StoreError>;
    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, StoreError>;
}

/// Leaderboard kept in a local sqlite database.
#[derive(Debug)]
pub struct SqliteScoreStore {
    conn: Connection,
}

impl SqliteScoreStore {
    /// Open the leaderboard at its default location.
    pub fn open_default() -> Result<Self, StoreError> {
        let db_path = Self::get_db_path().ok_or(StoreError::NotConfigured)?;
        Self::open(&db_path)
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                score INTEGER NOT NULL,
                date TEXT NOT NULL,
                direction TEXT NOT NULL,
                letters TEXT NOT NULL,
                presentation TEXT NOT NULL,
                word_count INTEGER NOT NULL,
                category TEXT NOT NULL,
                list_repetitions INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        // Covers the ranking query
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_rank ON scores(score DESC, word_count DESC)",
            [],
        )?;

        Ok(SqliteScoreStore { conn })
    }

    /// Get the database file path under $HOME/.local/state/fonema
    fn get_db_path() -> Option<PathBuf> {
        // Try to use the XDG-compliant ~/.local/state directory first
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("fonema");
            Some(state_dir.join("scores.db"))
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "fonema") {
            // Fallback to system-specific directory
            let state_dir = proj_dirs.data_local_dir();
            Some(state_dir.join("scores.db"))
        } else {
            None
        }
    }

    /// The path the default store would use (for diagnostics).
    pub fn default_path() -> Option<PathBuf> {
        Self::get_db_path()
    }
}

impl ScoreStore for SqliteScoreStore {
    fn append(&self, record: &ScoreRecord) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO scores
            (name, score, date, direction, letters, presentation, word_count, category, list_repetitions)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.name,
                record.score,
                record.date.to_rfc3339(),
                record.settings.direction.tag(),
                record.settings.letters.tag(),
                record.settings.presentation.tag(),
                record.settings.word_count as i64,
                record.settings.category.tag(),
                record.settings.list_repetitions as i64,
            ],
        )?;

        Ok(())
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, score, date, direction, letters, presentation, word_count, category, list_repetitions
            FROM scores
            ORDER BY score DESC, word_count DESC
            LIMIT ?1
            "#,
        )?;

        let record_iter = stmt.query_map([limit as i64], |row| {
            let date_str: String = row.get(2)?;
            let date = DateTime::parse_from_rfc3339(&date_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        2,
                        "date".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            let direction = Direction::from_tag(&row.get::<_, String>(3)?).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(
                    3,
                    "direction".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;
            let letters = LetterTransform::from_tag(&row.get::<_, String>(4)?).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(
                    4,
                    "letters".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;
            let presentation =
                PresentationMode::from_tag(&row.get::<_, String>(5)?).ok_or_else(|| {
                    rusqlite::Error::InvalidColumnType(
                        5,
                        "presentation".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?;
            let category = WordCategory::from_tag(&row.get::<_, String>(7)?).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(
                    7,
                    "category".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;

            Ok(ScoreRecord {
                name: row.get(0)?,
                score: row.get(1)?,
                date,
                settings: ScoreSettings {
                    direction,
                    letters,
                    presentation,
                    word_count: row.get::<_, i64>(6)? as usize,
                    category,
                    list_repetitions: row.get::<_, i64>(8)? as usize,
                },
            })
        })?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }
}
