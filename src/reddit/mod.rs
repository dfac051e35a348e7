//! Comment source module
//!
//! Defines the comment-source seam the scanner pulls from, plus the Reddit
//! listing types. The real HTTP implementation lives in [`client`].

pub mod client;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use client::RedditClient;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("bad response status when fetching {path}: {status}")]
    BadStatus { path: String, status: u16 },
    #[error("authentication failed: {0}")]
    AuthError(String),
}

/// One comment as reported by the source.
///
/// Field names follow Reddit's listing JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    /// Fully-qualified identifier, e.g. `t1_abcdef`
    #[serde(rename = "name")]
    pub fullname: String,
    pub author: String,
    pub score: i64,
    pub score_hidden: bool,
    pub permalink: String,
    pub subreddit_id: String,
    pub created_utc: f64,
    pub body: String,
}

/// Listing envelope returned by `/user/{name}/comments`
#[derive(Debug, Deserialize)]
pub struct CommentListing {
    pub data: CommentListingData,
}

#[derive(Debug, Deserialize)]
pub struct CommentListingData {
    pub children: Vec<CommentChild>,
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentChild {
    pub data: Comment,
}

/// Anything that can produce the newest comments of a user.
///
/// Each call re-queries the source's current "newest" window; there is no
/// cursor, so previously seen comments may come back again.
#[async_trait]
pub trait CommentSource {
    async fn fetch_newest(&self, username: &str) -> Result<Vec<Comment>, SourceError>;
}
