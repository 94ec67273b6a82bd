use chrono::Utc;
use rusqlite::{Connection, Row, params};

use super::SubmissionStore;
use super::models::{NewSubmission, Submission, SubmissionKind};
use super::schema;
use crate::errors::{OrbError, Result};

const BASE_SELECT: &str = "
    SELECT id, text_content, doodle_filename, kind, created_at
    FROM submissions
";

pub struct SqliteStore {
    conn: Connection,
}

fn row_to_submission(row: &Row) -> rusqlite::Result<Submission> {
    let kind_str: String = row.get(3)?;
    let kind = SubmissionKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown submission kind: {}", kind_str).into(),
        )
    })?;
    Ok(Submission {
        id: row.get(0)?,
        text_content: row.get(1)?,
        doodle_filename: row.get(2)?,
        kind,
        created_at: row.get(4)?,
    })
}

impl SqliteStore {
    /// Creates the schema if it does not exist yet. Safe to call on every
    /// startup.
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute(schema::CREATE_SUBMISSIONS_TABLE, [])?;
        conn.execute(schema::CREATE_INDEX_CREATED_AT, [])?;
        Ok(Self { conn })
    }

    /// Opens (or creates) the database file, creating its parent directory
    /// first.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::new(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::new(conn)
    }

    #[cfg(test)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl SubmissionStore for SqliteStore {
    fn insert(&self, submission: NewSubmission) -> Result<Submission> {
        let kind = submission.kind().ok_or_else(|| {
            OrbError::InvalidInput("must provide either text or image".to_string())
        })?;
        self.conn.execute(
            "INSERT INTO submissions (text_content, doodle_filename, kind, created_at)
             VALUES (?, ?, ?, ?)",
            params![
                submission.text_content,
                submission.doodle_filename,
                kind.as_str(),
                Utc::now(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)
    }

    fn get_by_id(&self, id: i64) -> Result<Submission> {
        let sql = format!("{} WHERE id = ?", BASE_SELECT);
        self.conn
            .query_row(&sql, params![id], row_to_submission)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    OrbError::NotFound(format!("Submission with id {} not found", id))
                }
                other => other.into(),
            })
    }

    fn fetch_random(&self) -> Result<Option<Submission>> {
        let sql = format!("{} ORDER BY RANDOM() LIMIT 1", BASE_SELECT);
        match self.conn.query_row(&sql, [], row_to_submission) {
            Ok(submission) => Ok(Some(submission)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM submissions", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
