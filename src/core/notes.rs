//! Notes knowledge store backed by SQLite
//!
//! Subject -> resource-link records with a verification gate. Writes are
//! append-only inserts; a note becomes visible to lookups only after an
//! out-of-band moderation step flips `is_verified`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// A stored note record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: i64,
    pub subject: String,
    pub link: String,
    pub semester: Option<String>,
    pub is_verified: bool,
    pub contributed_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A note as submitted through `save_note`, before it has an id or a
/// verification decision.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub subject: String,
    pub link: String,
    pub semester: Option<String>,
    pub contributed_by: Option<String>,
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&format!("{}Z", raw.replace(' ', "T")))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

type NoteRow = (i64, String, String, Option<String>, i64, String, String, String);

fn row_to_record(row: NoteRow) -> NoteRecord {
    let (id, subject, link, semester, is_verified, contributed_by, created_at, updated_at) = row;
    NoteRecord {
        id,
        subject,
        link,
        semester,
        is_verified: is_verified != 0,
        contributed_by,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    }
}

/// Store for contributed study notes.
pub struct NoteStore {
    pool: SqlitePool,
}

impl NoteStore {
    /// Open (or create) the store at the given SQLite database path.
    pub async fn new(db_path: &Path) -> Result<Self, sqlx::Error> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    pub async fn new_in_memory_async() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL,
                link TEXT NOT NULL,
                semester TEXT,
                is_verified INTEGER NOT NULL DEFAULT 0,
                contributed_by TEXT NOT NULL DEFAULT 'Anonymous',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_notes_subject
            ON notes(subject, is_verified)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new note. Always lands unverified.
    pub async fn insert(&self, note: &NewNote) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO notes (subject, link, semester, is_verified, contributed_by)
            VALUES (?, ?, ?, 0, ?)
            "#,
        )
        .bind(note.subject.trim())
        .bind(note.link.trim())
        .bind(note.semester.as_deref())
        .bind(note.contributed_by.as_deref().unwrap_or("Anonymous"))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// First verified note whose subject contains the given text,
    /// case-insensitively. Store order (lowest id) decides ties.
    pub async fn find_verified(&self, subject: &str) -> Result<Option<NoteRecord>, sqlx::Error> {
        let row: Option<NoteRow> = sqlx::query_as(
            r#"
            SELECT id, subject, link, semester, is_verified, contributed_by, created_at, updated_at
            FROM notes
            WHERE is_verified = 1 AND subject LIKE ?
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(format!("%{}%", subject))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_record))
    }

    /// Moderation action: mark a note as verified so lookups can see it.
    pub async fn mark_verified(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE notes SET is_verified = 1, updated_at = datetime('now') WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Total number of notes, verified or not.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
