use serde::{Deserialize, Serialize};

use seams_types::models::{ChannelId, DmId, UserId};

use crate::error::{StoreError, StoreResult};
use crate::models::{ChannelRecord, DmRecord, UserRecord};

/// The whole mutable state of the platform.
///
/// Users and channels are never deleted, so their ids are their positions.
/// DMs are deleted, so they draw ids from `dm_count`. Messages draw from
/// `message_count`, shared by every container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    pub users: Vec<UserRecord>,
    pub channels: Vec<ChannelRecord>,
    pub dms: Vec<DmRecord>,
    pub dm_count: u64,
    pub message_count: u64,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wipe every entity and both counters.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // -- Users --

    /// Any registered user, active or removed.
    pub fn user(&self, user_id: UserId) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub(crate) fn user_mut(&mut self, user_id: UserId) -> Option<&mut UserRecord> {
        self.users.iter_mut().find(|u| u.id == user_id)
    }

    pub fn active_user(&self, user_id: UserId) -> Option<&UserRecord> {
        self.user(user_id).filter(|u| u.is_active)
    }

    /// The caller of an operation. Callers come out of `authenticate`, so an
    /// unknown id here means the session vanished mid-flight.
    pub(crate) fn caller(&self, user_id: UserId) -> StoreResult<&UserRecord> {
        self.active_user(user_id)
            .ok_or_else(|| StoreError::access("Invalid token"))
    }

    pub(crate) fn next_user_id(&self) -> UserId {
        self.users.len() as UserId
    }

    pub fn global_owner_count(&self) -> usize {
        self.users
            .iter()
            .filter(|u| u.is_active && u.is_owner)
            .count()
    }

    // -- Channels --

    pub fn channel(&self, channel_id: ChannelId) -> Option<&ChannelRecord> {
        self.channels.iter().find(|c| c.id == channel_id)
    }

    pub(crate) fn channel_mut(&mut self, channel_id: ChannelId) -> Option<&mut ChannelRecord> {
        self.channels.iter_mut().find(|c| c.id == channel_id)
    }

    pub(crate) fn existing_channel(&self, channel_id: ChannelId) -> StoreResult<&ChannelRecord> {
        self.channel(channel_id)
            .ok_or_else(|| StoreError::input("Invalid channel"))
    }

    pub(crate) fn next_channel_id(&self) -> ChannelId {
        self.channels.len() as ChannelId
    }

    // -- DMs --

    pub fn dm(&self, dm_id: DmId) -> Option<&DmRecord> {
        self.dms.iter().find(|d| d.id == dm_id)
    }

    pub(crate) fn dm_mut(&mut self, dm_id: DmId) -> Option<&mut DmRecord> {
        self.dms.iter_mut().find(|d| d.id == dm_id)
    }

    pub(crate) fn existing_dm(&self, dm_id: DmId) -> StoreResult<&DmRecord> {
        self.dm(dm_id).ok_or_else(|| StoreError::input("Invalid DM"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRecord;

    #[test]
    fn clear_resets_entities_and_counters() {
        let mut state = StoreState::new();
        state.dm_count = 3;
        state.message_count = 12;
        state.channels.push(ChannelRecord {
            id: 0,
            name: "general".into(),
            is_public: true,
            owner_members: vec![0],
            all_members: vec![0],
            messages: vec![MessageRecord {
                id: 11,
                author_id: 0,
                body: "hi".into(),
                time_sent: 0,
            }],
        });

        state.clear();

        assert!(state.users.is_empty());
        assert!(state.channels.is_empty());
        assert!(state.dms.is_empty());
        assert_eq!(state.dm_count, 0);
        assert_eq!(state.message_count, 0);
    }
}
