use serde::{Deserialize, Serialize};

use crate::models::{
    ChannelDetails, ChannelId, ChannelSummary, DmId, DmSummary, MessageId, UserId, UserProfile,
};

// -- JWT Claims --

/// Session token payload shared by the REST middleware and the store's
/// session check. Carries no `exp`; a token is valid while `session` is in
/// the user's live session list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub session: String,
    pub total_sessions: u64,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub auth_user_id: UserId,
}

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChannelRequest {
    pub name: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateChannelResponse {
    pub channel_id: ChannelId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelsResponse {
    pub channels: Vec<ChannelSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub channel_id: ChannelId,
}

#[derive(Debug, Deserialize)]
pub struct ChannelMessagesQuery {
    pub channel_id: ChannelId,
    pub start: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelRequest {
    pub channel_id: ChannelId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelMemberRequest {
    pub channel_id: ChannelId,
    pub u_id: UserId,
}

pub type ChannelDetailsResponse = ChannelDetails;

// -- DMs --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDmRequest {
    pub u_ids: Vec<UserId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDmResponse {
    pub dm_id: DmId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DmsResponse {
    pub dms: Vec<DmSummary>,
}

#[derive(Debug, Deserialize)]
pub struct DmQuery {
    pub dm_id: DmId,
}

#[derive(Debug, Deserialize)]
pub struct DmMessagesQuery {
    pub dm_id: DmId,
    pub start: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DmRequest {
    pub dm_id: DmId,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub channel_id: ChannelId,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendDmRequest {
    pub dm_id: DmId,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message_id: MessageId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditMessageRequest {
    pub message_id: MessageId,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveMessageRequest {
    pub message_id: MessageId,
}

// -- Users --

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub u_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetNameRequest {
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetEmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetHandleRequest {
    pub handle_str: String,
}

// -- Admin --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveUserRequest {
    pub u_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionChangeRequest {
    pub u_id: UserId,
    pub permission_id: i64,
}
