use serde::{Deserialize, Serialize};

/// Live status of one tracked channel at a single poll instant.
///
/// `viewer_count`, `title` and `category` are only meaningful while
/// `is_live` is true; see [`ChannelStatus::normalized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatus {
    /// Stable lowercase login, unique per channel.
    pub channel_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: String,
    pub is_live: bool,
    #[serde(default)]
    pub viewer_count: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ChannelStatus {
    /// An offline entry with no presentation metadata.
    pub fn offline(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            ..Self::default()
        }
    }

    /// A live entry with no presentation metadata.
    pub fn live(
        channel_id: impl Into<String>,
        viewer_count: u64,
        title: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            is_live: true,
            viewer_count: Some(viewer_count),
            title: Some(title.into()),
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn with_profile(
        mut self,
        display_name: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        self.display_name = display_name.into();
        self.avatar_url = avatar_url.into();
        self
    }

    /// Enforce the liveness invariant: `is_live == false` is definitive and
    /// drops any dangling stream fields.  Ids are lowercased.
    pub fn normalized(mut self) -> Self {
        if self.channel_id.chars().any(char::is_uppercase) {
            self.channel_id = self.channel_id.to_lowercase();
        }
        if !self.is_live {
            self.viewer_count = None;
            self.title = None;
            self.category = None;
        }
        self
    }

    /// Viewer count used for ordering; absent or offline counts as 0.
    pub fn viewers(&self) -> u64 {
        if self.is_live {
            self.viewer_count.unwrap_or(0)
        } else {
            0
        }
    }

    /// Name to show a human, falling back to the id.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.channel_id
        } else {
            &self.display_name
        }
    }
}

/// Body of a successful `GET /api/streamers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamersResponse {
    pub streamers: Vec<ChannelStatus>,
}

/// Body of a failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_camel_case() {
        let status = ChannelStatus::live("kamet0", 1337, "test stream", "League of Legends")
            .with_profile("Kamet0", "https://example.invalid/a.png");
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["channelId"], "kamet0");
        assert_eq!(json["displayName"], "Kamet0");
        assert_eq!(json["isLive"], true);
        assert_eq!(json["viewerCount"], 1337);
        assert_eq!(json["category"], "League of Legends");
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let json = r#"{"channelId":"solo","isLive":false}"#;
        let status: ChannelStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status, ChannelStatus::offline("solo"));
    }

    #[test]
    fn test_normalized_drops_dangling_stream_fields() {
        let mut status = ChannelStatus::live("Mixed", 10, "t", "c");
        status.is_live = false;
        let status = status.normalized();
        assert_eq!(status.channel_id, "mixed");
        assert!(status.viewer_count.is_none());
        assert!(status.title.is_none());
        assert!(status.category.is_none());
        assert_eq!(status.viewers(), 0);
    }

    #[test]
    fn test_label_falls_back_to_id() {
        assert_eq!(ChannelStatus::offline("abc").label(), "abc");
        assert_eq!(ChannelStatus::offline("abc").with_profile("ABC", "").label(), "ABC");
    }
}
