use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type ChannelId = u64;
pub type DmId = u64;
pub type MessageId = u64;

/// Public view of a user. Removed users keep their id but lose email and handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub u_id: UserId,
    pub email: Option<String>,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel_id: ChannelId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmSummary {
    pub dm_id: DmId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub message_id: MessageId,
    pub u_id: UserId,
    pub message: String,
    /// Unix seconds, UTC.
    pub time_sent: i64,
}

/// One page of a container's history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<MessageView>,
    pub start: usize,
    /// Index of the next page, or -1 once the oldest message has been returned.
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDetails {
    pub name: String,
    pub is_public: bool,
    pub owner_members: Vec<UserProfile>,
    pub all_members: Vec<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmDetails {
    pub name: String,
    pub members: Vec<UserProfile>,
}
