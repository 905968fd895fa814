use quadview_proto::protocol::ChannelStatus;

/// A live channel with a display name derived from its id.
pub fn live(id: &str, viewers: u64, title: &str) -> ChannelStatus {
    ChannelStatus::live(id, viewers, title, "Just Chatting")
        .with_profile(id.to_uppercase(), format!("https://cdn.invalid/{id}.png"))
}

pub fn offline(id: &str) -> ChannelStatus {
    ChannelStatus::offline(id).with_profile(id.to_uppercase(), format!("https://cdn.invalid/{id}.png"))
}
