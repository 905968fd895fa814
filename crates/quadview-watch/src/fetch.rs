//! Fetches the tracked-channel snapshot from a quadview server.

use std::time::Duration;

use anyhow::{Context, Result};
use quadview_proto::protocol::{ChannelStatus, ErrorResponse, StreamersResponse};
use reqwest::Client;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

pub fn streamers_url(server_url: &str) -> String {
    format!("{}/api/streamers", server_url.trim_end_matches('/'))
}

pub struct StatusFetcher {
    client: Client,
    url: String,
}

impl StatusFetcher {
    pub fn new(server_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: streamers_url(server_url),
        })
    }

    /// One full snapshot, or an error.  Never a partial list.
    pub async fn fetch(&self) -> Result<Vec<ChannelStatus>> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            match response.json::<ErrorResponse>().await {
                Ok(body) => anyhow::bail!("HTTP {}: {}", status.as_u16(), body.error),
                Err(_) => anyhow::bail!("HTTP {}", status.as_u16()),
            }
        }

        let body: StreamersResponse = response
            .json()
            .await
            .context("Failed to parse streamers response")?;
        Ok(body.streamers)
    }
}
