//! Authorization predicates, one set per container kind.
//!
//! A global owner moderates every channel, member or not. Only the creator
//! moderates a DM.

use seams_types::models::UserId;

use crate::models::{ChannelRecord, Container, DmRecord, MessageRecord, UserRecord};

pub fn is_member<C: Container>(container: &C, user_id: UserId) -> bool {
    container.has_member(user_id)
}

/// Channel owner, or global owner.
pub fn can_moderate_channel(channel: &ChannelRecord, user: &UserRecord) -> bool {
    channel.has_owner(user.id) || user.is_owner
}

/// DM owner only. Global ownership grants nothing here.
pub fn can_moderate_dm(dm: &DmRecord, user: &UserRecord) -> bool {
    dm.has_owner(user.id)
}

pub fn is_author(message: &MessageRecord, user: &UserRecord) -> bool {
    message.author_id == user.id
}

/// The DM may be deleted only by its creator while still a member.
pub fn can_remove_dm(dm: &DmRecord, user_id: UserId) -> bool {
    dm.creator == user_id && dm.has_member(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: UserId, is_owner: bool) -> UserRecord {
        UserRecord {
            id,
            handle: Some(format!("user{}", id)),
            email: Some(format!("user{}@example.com", id)),
            password_hash: String::new(),
            name_first: "user".into(),
            name_last: id.to_string(),
            is_owner,
            is_active: true,
            sessions: vec![],
            total_sessions: 0,
        }
    }

    #[test]
    fn global_owner_moderates_channels_but_not_dms() {
        let admin = user(0, true);
        let channel = ChannelRecord {
            id: 0,
            name: "general".into(),
            is_public: true,
            owner_members: vec![1],
            all_members: vec![0, 1],
            messages: vec![],
        };
        let dm = DmRecord {
            id: 0,
            name: "user0, user1".into(),
            creator: 1,
            all_members: vec![1, 0],
            messages: vec![],
        };

        assert!(can_moderate_channel(&channel, &admin));
        let without_admin = ChannelRecord {
            all_members: vec![1],
            ..channel.clone()
        };
        assert!(can_moderate_channel(&without_admin, &admin));
        assert!(!can_moderate_channel(&without_admin, &user(2, false)));
        assert!(!can_moderate_dm(&dm, &admin));
        assert!(can_moderate_dm(&dm, &user(1, false)));
    }

    #[test]
    fn dm_creator_loses_ownership_after_leaving() {
        let creator = user(1, false);
        let dm = DmRecord {
            id: 0,
            name: "user0, user1".into(),
            creator: 1,
            all_members: vec![0],
            messages: vec![],
        };

        assert!(dm.owners().is_empty());
        assert!(!can_moderate_dm(&dm, &creator));
        assert!(!can_remove_dm(&dm, creator.id));
    }
}
