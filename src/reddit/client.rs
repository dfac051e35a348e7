//! Reddit API client
//!
//! App-only OAuth (client credentials) against reddit.com, listings fetched
//! from oauth.reddit.com. Authentication and the single-window listing fetch
//! are all this bot needs; pagination and rate limiting are out of scope.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{debug, info};

use super::{Comment, CommentListing, CommentSource, SourceError};
use crate::ClientConfig;

const ACCESS_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE_URL: &str = "https://oauth.reddit.com";

/// Longest listing window Reddit serves in one request
const MAX_LISTING_LENGTH: u32 = 100;

#[derive(Debug, Deserialize)]
struct OAuthResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: String,
    #[allow(dead_code)]
    expires_in: u64,
}

/// Reddit comment source over HTTP
pub struct RedditClient {
    http: reqwest::Client,
    auth: ClientConfig,
    token: Mutex<Option<String>>,
}

impl RedditClient {
    pub fn new(auth: ClientConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            auth,
            token: Mutex::new(None),
        })
    }

    /// Get a fresh app-only token and remember it for later requests
    async fn connect(&self) -> Result<String, SourceError> {
        debug!("Requesting access token");
        let response = self
            .http
            .post(ACCESS_TOKEN_URL)
            .basic_auth(&self.auth.client_id, Some(&self.auth.client_secret))
            .header("User-Agent", &self.auth.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::AuthError(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }

        let oauth: OAuthResponse = response
            .json()
            .await
            .map_err(|e| SourceError::AuthError(e.to_string()))?;

        let mut token = self.token.lock().unwrap();
        *token = Some(oauth.access_token.clone());
        info!("Authenticated with Reddit");
        Ok(oauth.access_token)
    }

    async fn current_token(&self) -> Result<String, SourceError> {
        let cached = self.token.lock().unwrap().clone();
        match cached {
            Some(token) => Ok(token),
            None => self.connect().await,
        }
    }

    async fn get_listing(&self, path: &str) -> Result<CommentListing, SourceError> {
        let url = format!("{}{}", API_BASE_URL, path);
        let limit = MAX_LISTING_LENGTH.to_string();
        let mut token = self.current_token().await?;

        // One re-authentication on 401; expired tokens are routine for a
        // long-lived poll loop.
        for attempt in 0..2 {
            let response = self
                .http
                .get(&url)
                .query(&[
                    ("sort", "new"),
                    ("limit", limit.as_str()),
                    ("raw_json", "1"),
                ])
                .header("User-Agent", &self.auth.user_agent)
                .bearer_auth(&token)
                .send()
                .await?;

            let status = response.status();
            if status.as_u16() == 401 && attempt == 0 {
                token = self.connect().await?;
                continue;
            }
            if !status.is_success() {
                return Err(SourceError::BadStatus {
                    path: path.to_string(),
                    status: status.as_u16(),
                });
            }

            return Ok(response.json().await?);
        }

        Err(SourceError::AuthError("re-authentication failed".to_string()))
    }
}

#[async_trait]
impl CommentSource for RedditClient {
    async fn fetch_newest(&self, username: &str) -> Result<Vec<Comment>, SourceError> {
        let path = format!("/user/{}/comments", username);
        let listing = self.get_listing(&path).await?;
        let comments: Vec<Comment> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .collect();
        debug!("Fetched {} comments for '{}'", comments.len(), username);
        Ok(comments)
    }
}
