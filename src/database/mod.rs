//! Database module for downtrack

pub mod schema;

use rusqlite::{params, Connection};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
}

impl DatabaseError {
    /// True when the underlying failure is a uniqueness/constraint violation,
    /// e.g. adding a username that is already tracked.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::SqliteError(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

/// A username under observation
#[derive(Debug, Clone)]
pub struct TrackedUser {
    pub username: String,
    pub added: i64,
    pub hidden: bool,
    pub deleted: bool,
}

/// A captured comment record
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub id: String,
    pub author: String,
    pub score: i64,
    pub permalink: String,
    pub sub_id: String,
    pub created: i64,
    pub body: String,
}

/// Database wrapper
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Initialize database schema; safe to call on every startup
    pub fn initialize(&self) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(schema::INIT_SQL)?;
        Ok(())
    }

    /// Start tracking a username.
    ///
    /// Fails with a constraint violation if the username is already tracked,
    /// including soft-deleted rows.
    pub fn add_user(&self, username: &str, hidden: bool) -> Result<(), DatabaseError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO tracked (username, added, hidden, deleted) VALUES (?1, ?2, ?3, 0)",
            params![username, unix_now(), hidden as i32],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// All tracked users that have not been soft-deleted, in store order
    pub fn get_users(&self) -> Result<Vec<TrackedUser>, DatabaseError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT username, added, hidden, deleted FROM tracked WHERE deleted = 0",
        )?;

        let users = stmt
            .query_map([], |row| {
                Ok(TrackedUser {
                    username: row.get(0)?,
                    added: row.get(1)?,
                    hidden: row.get::<_, i32>(2)? != 0,
                    deleted: row.get::<_, i32>(3)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Insert or replace a comment record, keyed by comment id
    pub fn save_comment(&self, record: &CommentRecord) -> Result<(), DatabaseError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO downvoted (id, author, score, permalink, sub_id, created, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.author,
                record.score,
                record.permalink,
                record.sub_id,
                record.created,
                record.body,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Delete every stored comment whose score equals `cutoff`.
    ///
    /// Returns the number of rows removed.
    pub fn cleanup(&self, cutoff: i64) -> Result<usize, DatabaseError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM downvoted WHERE score = ?1", params![cutoff])?;
        tx.commit()?;
        Ok(removed)
    }

    /// Stored comments for one author, newest first
    pub fn get_comments(&self, author: &str) -> Result<Vec<CommentRecord>, DatabaseError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, author, score, permalink, sub_id, created, body
             FROM downvoted WHERE author = ?1 ORDER BY created DESC",
        )?;

        let records = stmt
            .query_map([author], |row| {
                Ok(CommentRecord {
                    id: row.get(0)?,
                    author: row.get(1)?,
                    score: row.get(2)?,
                    permalink: row.get(3)?,
                    sub_id: row.get(4)?,
                    created: row.get(5)?,
                    body: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get statistics
    pub fn get_stats(&self) -> Result<DatabaseStats, DatabaseError> {
        let conn = self.conn.lock().unwrap();

        let tracked_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM tracked WHERE deleted = 0", [], |row| {
                row.get(0)
            })?;

        let comment_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM downvoted", [], |row| row.get(0))?;

        Ok(DatabaseStats {
            tracked_count,
            comment_count,
        })
    }

    #[cfg(test)]
    pub fn set_deleted(&self, username: &str, deleted: bool) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE tracked SET deleted = ?1 WHERE username = ?2",
            params![deleted as i32, username],
        )?;
        Ok(())
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub tracked_count: i64,
    pub comment_count: i64,
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.initialize().unwrap();
        db
    }

    fn record(id: &str, author: &str, score: i64) -> CommentRecord {
        CommentRecord {
            id: id.to_string(),
            author: author.to_string(),
            score,
            permalink: format!("/r/test/comments/{}", id),
            sub_id: "t5_abc".to_string(),
            created: 1_700_000_000,
            body: "some comment".to_string(),
        }
    }

    #[test]
    fn initialize_is_idempotent() {
        let db = open_db();
        db.initialize().unwrap();
        db.initialize().unwrap();
    }

    #[test]
    fn add_user_rejects_duplicates() {
        let db = open_db();
        db.add_user("alice", false).unwrap();
        let err = db.add_user("alice", true).unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn get_users_excludes_soft_deleted() {
        let db = open_db();
        db.add_user("alice", false).unwrap();
        db.add_user("bob", true).unwrap();
        db.set_deleted("bob", true).unwrap();

        let users = db.get_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "alice");
        assert!(!users[0].hidden);
    }

    #[test]
    fn save_comment_upsert_keeps_latest_values() {
        let db = open_db();
        db.add_user("alice", false).unwrap();

        db.save_comment(&record("t1_x", "alice", -1)).unwrap();
        let mut updated = record("t1_x", "alice", -4);
        updated.body = "edited".to_string();
        db.save_comment(&updated).unwrap();

        let rows = db.get_comments("alice").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, -4);
        assert_eq!(rows[0].body, "edited");
    }

    #[test]
    fn cleanup_removes_only_matching_scores() {
        let db = open_db();
        db.add_user("alice", false).unwrap();
        for (i, score) in [-1i64, 0, 0, -5].iter().enumerate() {
            db.save_comment(&record(&format!("t1_{}", i), "alice", *score))
                .unwrap();
        }

        let removed = db.cleanup(0).unwrap();
        assert_eq!(removed, 2);

        let left: Vec<i64> = db
            .get_comments("alice")
            .unwrap()
            .into_iter()
            .map(|r| r.score)
            .collect();
        assert_eq!(left.len(), 2);
        assert!(left.contains(&-1) && left.contains(&-5));
    }

    #[test]
    fn stats_count_active_users_and_comments() {
        let db = open_db();
        db.add_user("alice", false).unwrap();
        db.save_comment(&record("t1_a", "alice", -2)).unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.tracked_count, 1);
        assert_eq!(stats.comment_count, 1);
    }
}
