//! Twitch Helix client: app-access token cache plus the two lookups needed
//! to build a `ChannelStatus` per tracked login.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use quadview_proto::config::UpstreamConfig;
use quadview_proto::protocol::ChannelStatus;
use quadview_proto::roster::sort_roster;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const HELIX_URL: &str = "https://api.twitch.tv/helix";

/// Tokens are refreshed this long before they actually expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// Helix caps `login` / `user_login` query params per request.
const HELIX_BATCH: usize = 100;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("token request failed: {status} {body}")]
    Token { status: StatusCode, body: String },

    #[error("helix {endpoint} returned {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

// ── Token cache ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct TokenCache {
    access_token: String,
    expires_at: Option<Instant>,
}

impl TokenCache {
    fn valid_at(&self, now: Instant) -> Option<&str> {
        let expires_at = self.expires_at?;
        if self.access_token.is_empty() || now + TOKEN_REFRESH_MARGIN >= expires_at {
            return None;
        }
        Some(&self.access_token)
    }

    fn store(&mut self, access_token: String, expires_in: Duration, now: Instant) {
        self.access_token = access_token;
        self.expires_at = Some(now + expires_in);
    }

    fn invalidate(&mut self) {
        self.expires_at = None;
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

// ── Helix payloads ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct HelixPage<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HelixUser {
    pub login: String,
    pub display_name: String,
    #[serde(default)]
    pub profile_image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HelixStream {
    pub user_login: String,
    pub viewer_count: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub game_name: String,
}

/// Join user profiles with live streams.  A user is live iff a stream
/// exists for its lowercase login.  Output is in roster order.
pub fn merge_statuses(users: &[HelixUser], streams: &[HelixStream]) -> Vec<ChannelStatus> {
    let live: HashMap<String, &HelixStream> = streams
        .iter()
        .map(|s| (s.user_login.to_lowercase(), s))
        .collect();

    let mut statuses: Vec<ChannelStatus> = users
        .iter()
        .map(|user| {
            let login = user.login.to_lowercase();
            let status = match live.get(&login) {
                Some(stream) => ChannelStatus::live(
                    login,
                    stream.viewer_count,
                    stream.title.clone(),
                    stream.game_name.clone(),
                ),
                None => ChannelStatus::offline(login),
            };
            status.with_profile(user.display_name.clone(), user.profile_image_url.clone())
        })
        .collect();

    sort_roster(&mut statuses);
    statuses
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct TwitchClient {
    http: Client,
    client_id: String,
    client_secret: String,
    token: Mutex<TokenCache>,
}

impl TwitchClient {
    pub fn new(upstream: &UpstreamConfig) -> Self {
        Self {
            http: Client::new(),
            client_id: upstream.client_id.clone(),
            client_secret: upstream.client_secret.clone(),
            token: Mutex::new(TokenCache::default()),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    async fn access_token(&self) -> Result<String, UpstreamError> {
        let mut cache = self.token.lock().await;
        if let Some(token) = cache.valid_at(Instant::now()) {
            return Ok(token.to_string());
        }

        info!("Refreshing Twitch access token");
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Token { status, body });
        }

        let token: TokenResponse = response.json().await?;
        info!("Got token, expires in {} min", token.expires_in / 60);
        cache.store(
            token.access_token.clone(),
            Duration::from_secs(token.expires_in),
            Instant::now(),
        );
        Ok(token.access_token)
    }

    async fn send_helix(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
        token: &str,
    ) -> Result<reqwest::Response, UpstreamError> {
        Ok(self
            .http
            .get(format!("{}/{}", HELIX_URL, endpoint))
            .query(query)
            .bearer_auth(token)
            .header("Client-Id", &self.client_id)
            .send()
            .await?)
    }

    /// GET a Helix endpoint.  A 401 forces a token refresh and one retry.
    async fn helix_get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, UpstreamError> {
        let token = self.access_token().await?;
        let mut response = self.send_helix(endpoint, query, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("401 from helix {}, forcing token refresh", endpoint);
            self.token.lock().await.invalidate();
            let token = self.access_token().await?;
            response = self.send_helix(endpoint, query, &token).await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { endpoint, status });
        }

        let page: HelixPage<T> = response.json().await?;
        Ok(page.data)
    }

    /// Current status of every known login in `channels`, roster-sorted.
    pub async fn fetch_statuses(
        &self,
        channels: &[String],
    ) -> Result<Vec<ChannelStatus>, UpstreamError> {
        let mut users: Vec<HelixUser> = Vec::with_capacity(channels.len());
        let mut streams: Vec<HelixStream> = Vec::new();

        for batch in channels.chunks(HELIX_BATCH) {
            let logins: Vec<(&str, &str)> = batch.iter().map(|c| ("login", c.as_str())).collect();
            users.extend(self.helix_get::<HelixUser>("users", &logins).await?);

            let mut stream_query: Vec<(&str, &str)> =
                batch.iter().map(|c| ("user_login", c.as_str())).collect();
            stream_query.push(("first", "100"));
            streams.extend(self.helix_get::<HelixStream>("streams", &stream_query).await?);
        }

        debug!(
            "helix: {} users, {} live of {} tracked",
            users.len(),
            streams.len(),
            channels.len()
        );
        Ok(merge_statuses(&users, &streams))
    }
}
