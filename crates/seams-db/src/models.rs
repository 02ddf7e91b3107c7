//! Store records. These are what the snapshot serializes; the wire views in
//! seams-types are built from them on the way out.

use serde::{Deserialize, Serialize};

use seams_types::models::{ChannelId, DmId, MessageId, MessageView, UserId, UserProfile};

/// Body written over every message of a removed user.
pub const REMOVED_USER_TEXT: &str = "Removed user";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub handle: Option<String>,
    pub email: Option<String>,
    pub password_hash: String,
    pub name_first: String,
    pub name_last: String,
    pub is_owner: bool,
    pub is_active: bool,
    pub sessions: Vec<String>,
    pub total_sessions: u64,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            u_id: self.id,
            email: self.email.clone(),
            name_first: self.name_first.clone(),
            name_last: self.name_last.clone(),
            handle_str: self.handle.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: MessageId,
    pub author_id: UserId,
    pub body: String,
    pub time_sent: i64,
}

impl MessageRecord {
    pub fn view(&self) -> MessageView {
        MessageView {
            message_id: self.id,
            u_id: self.author_id,
            message: self.body.clone(),
            time_sent: self.time_sent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: ChannelId,
    pub name: String,
    pub is_public: bool,
    pub owner_members: Vec<UserId>,
    pub all_members: Vec<UserId>,
    /// Newest first.
    pub messages: Vec<MessageRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmRecord {
    pub id: DmId,
    /// Sorted, comma-joined handles at creation time. Never recomputed.
    pub name: String,
    /// The only user who can ever own this DM.
    pub creator: UserId,
    pub all_members: Vec<UserId>,
    /// Newest first.
    pub messages: Vec<MessageRecord>,
}

/// Anything holding a member set and a message sequence.
pub trait Container {
    fn members(&self) -> &[UserId];
    fn members_mut(&mut self) -> &mut Vec<UserId>;
    fn messages(&self) -> &[MessageRecord];
    fn messages_mut(&mut self) -> &mut Vec<MessageRecord>;

    /// Owners that are still members.
    fn owners(&self) -> Vec<UserId>;

    fn has_member(&self, user_id: UserId) -> bool {
        self.members().contains(&user_id)
    }

    fn has_owner(&self, user_id: UserId) -> bool {
        self.owners().contains(&user_id)
    }
}

impl Container for ChannelRecord {
    fn members(&self) -> &[UserId] {
        &self.all_members
    }

    fn members_mut(&mut self) -> &mut Vec<UserId> {
        &mut self.all_members
    }

    fn messages(&self) -> &[MessageRecord] {
        &self.messages
    }

    fn messages_mut(&mut self) -> &mut Vec<MessageRecord> {
        &mut self.messages
    }

    fn owners(&self) -> Vec<UserId> {
        self.owner_members.clone()
    }
}

impl Container for DmRecord {
    fn members(&self) -> &[UserId] {
        &self.all_members
    }

    fn members_mut(&mut self) -> &mut Vec<UserId> {
        &mut self.all_members
    }

    fn messages(&self) -> &[MessageRecord] {
        &self.messages
    }

    fn messages_mut(&mut self) -> &mut Vec<MessageRecord> {
        &mut self.messages
    }

    fn owners(&self) -> Vec<UserId> {
        if self.all_members.contains(&self.creator) {
            vec![self.creator]
        } else {
            Vec::new()
        }
    }
}
