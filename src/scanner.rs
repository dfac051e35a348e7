//! Scanner module
//!
//! Pulls the newest-comments window for one tracked user, applies the
//! configured filter, and records whatever qualifies.

use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::database::{CommentRecord, Database, DatabaseError};
use crate::reddit::{Comment, CommentSource, SourceError};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("comment source error: {0}")]
    Source(#[from] SourceError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Which comments a scan records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Only comments with score <= 0
    #[default]
    Downvoted,
    /// Every comment whose score is visible
    All,
}

impl FilterMode {
    fn accepts(&self, comment: &Comment) -> bool {
        // Score-hidden comments are skipped regardless of mode: the source
        // masks true scores for very new content.
        if comment.score_hidden {
            return false;
        }
        match self {
            FilterMode::Downvoted => comment.score <= 0,
            FilterMode::All => true,
        }
    }
}

/// Scans one user at a time against a comment source
pub struct Scanner<S> {
    source: S,
    database: Arc<Database>,
    mode: FilterMode,
}

impl<S: CommentSource> Scanner<S> {
    pub fn new(source: S, database: Arc<Database>, mode: FilterMode) -> Self {
        Self {
            source,
            database,
            mode,
        }
    }

    /// Scan one username and record every accepted comment.
    ///
    /// Comments are written one at a time in source order; the first failure
    /// aborts the scan and propagates to the caller. Returns how many comments
    /// were recorded.
    pub async fn scan(&self, username: &str) -> Result<usize, ScanError> {
        info!("Scanning user '{}'", username);
        let comments = self.source.fetch_newest(username).await?;

        let mut saved = 0;
        for comment in &comments {
            if !self.mode.accepts(comment) {
                debug!("Skipping comment {} (score {})", comment.fullname, comment.score);
                continue;
            }
            self.database.save_comment(&to_record(username, comment))?;
            saved += 1;
        }

        info!("Recorded {} of {} comments for '{}'", saved, comments.len(), username);
        Ok(saved)
    }
}

fn to_record(author: &str, comment: &Comment) -> CommentRecord {
    CommentRecord {
        id: comment.fullname.clone(),
        author: author.to_string(),
        score: comment.score,
        permalink: comment.permalink.clone(),
        sub_id: comment.subreddit_id.clone(),
        created: comment.created_utc.trunc() as i64,
        body: comment.body.clone(),
    }
}
