//! State survives a restart: the database file is the bot's only durable
//! state and must be re-openable with an idempotent schema pass.

use downtrack::database::{CommentRecord, Database};

fn sample(id: &str) -> CommentRecord {
    CommentRecord {
        id: id.to_string(),
        author: "alice".to_string(),
        score: -2,
        permalink: format!("/r/test/comments/{}", id),
        sub_id: "t5_abc".to_string(),
        created: 1_700_000_000,
        body: "still here".to_string(),
    }
}

#[test]
fn reopening_the_store_keeps_all_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("downtrack.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new(path).unwrap();
        db.initialize().unwrap();
        db.add_user("alice", false).unwrap();
        db.save_comment(&sample("t1_a")).unwrap();
    }

    let db = Database::new(path).unwrap();
    // Startup always re-runs schema creation.
    db.initialize().unwrap();

    let users = db.get_users().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "alice");

    let comments = db.get_comments("alice").unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0], sample("t1_a"));
}
