//! Database schema module

/// Schema constants and initialization SQL
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Initialization SQL, safe to run on every startup.
///
/// `downvoted.score` is deliberately unconstrained: the all-comments scan mode
/// records positive scores too.
pub const INIT_SQL: &str = r#"
-- Usernames under observation
CREATE TABLE IF NOT EXISTS tracked (
    username TEXT PRIMARY KEY,
    added INTEGER NOT NULL,
    hidden BOOLEAN DEFAULT 0,
    deleted BOOLEAN DEFAULT 0
);

-- Captured comments, keyed by the source comment's fullname
CREATE TABLE IF NOT EXISTS downvoted (
    id TEXT PRIMARY KEY,
    author TEXT NOT NULL,
    score INTEGER NOT NULL,
    permalink TEXT NOT NULL,
    sub_id TEXT NOT NULL,
    created INTEGER NOT NULL,
    body TEXT NOT NULL,
    FOREIGN KEY (author) REFERENCES tracked(username)
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_downvoted_author ON downvoted(author);
CREATE INDEX IF NOT EXISTS idx_downvoted_score ON downvoted(score);
"#;
