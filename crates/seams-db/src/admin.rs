//! Global-owner operations. Both enforce the sole-owner floor: while any
//! active user exists, at least one of them is a global owner.

use tracing::info;

use seams_types::models::UserId;

use crate::error::{StoreError, StoreResult};
use crate::models::{Container, REMOVED_USER_TEXT};
use crate::state::StoreState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionLevel {
    Owner,
    Member,
}

impl PermissionLevel {
    pub const OWNER_ID: i64 = 1;
    pub const MEMBER_ID: i64 = 2;
}

impl TryFrom<i64> for PermissionLevel {
    type Error = StoreError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        match id {
            Self::OWNER_ID => Ok(Self::Owner),
            Self::MEMBER_ID => Ok(Self::Member),
            _ => Err(StoreError::input("Invalid permission id")),
        }
    }
}

fn scrub_messages<C: Container>(containers: &mut [C], user_id: UserId) {
    for container in containers.iter_mut() {
        for message in container.messages_mut().iter_mut() {
            if message.author_id == user_id {
                message.body = REMOVED_USER_TEXT.to_string();
            }
        }
    }
}

fn drop_member<C: Container>(containers: &mut [C], user_id: UserId) {
    for container in containers.iter_mut() {
        container.members_mut().retain(|id| *id != user_id);
    }
}

impl StoreState {
    fn require_global_owner(&self, actor: UserId) -> StoreResult<()> {
        if !self.caller(actor)?.is_owner {
            return Err(StoreError::access(
                "Authorised user is not a global owner",
            ));
        }
        Ok(())
    }

    fn is_sole_global_owner(&self, user_id: UserId) -> bool {
        self.active_user(user_id).is_some_and(|u| u.is_owner) && self.global_owner_count() == 1
    }

    /// Promote or demote `target`. Demoting the last global owner is
    /// reported as invalid input, not access denied.
    pub fn change_permission(&mut self, actor: UserId, target: UserId, permission_id: i64) -> StoreResult<()> {
        self.require_global_owner(actor)?;

        let current = self
            .active_user(target)
            .ok_or_else(|| StoreError::input("Invalid user id"))?
            .is_owner;

        if self.is_sole_global_owner(target) && permission_id == PermissionLevel::MEMBER_ID {
            return Err(StoreError::input(
                "u_id refers to a user who is the only global owner and they are being demoted to a user",
            ));
        }

        let level = PermissionLevel::try_from(permission_id)?;
        let wants_owner = level == PermissionLevel::Owner;
        if wants_owner == current {
            return Err(StoreError::input(
                "User already has the permission level of the permission id",
            ));
        }

        if let Some(user) = self.user_mut(target) {
            user.is_owner = wants_owner;
        }
        info!("User {} set user {} to {:?}", actor, target, level);
        Ok(())
    }

    /// Remove `target` from the platform.
    ///
    /// Every message they ever wrote keeps its id, author and timestamp but
    /// reads as the placeholder text. They drop out of every member and owner
    /// set, their email and handle become free, and every session dies.
    pub fn remove_user(&mut self, actor: UserId, target: UserId) -> StoreResult<()> {
        self.require_global_owner(actor)?;

        if self.active_user(target).is_none() {
            return Err(StoreError::input("Invalid user id"));
        }
        if self.is_sole_global_owner(target) {
            return Err(StoreError::input(
                "u_id refers to a user who is the only global owner",
            ));
        }

        scrub_messages(&mut self.dms, target);
        scrub_messages(&mut self.channels, target);

        drop_member(&mut self.dms, target);
        drop_member(&mut self.channels, target);
        for channel in self.channels.iter_mut() {
            channel.owner_members.retain(|id| *id != target);
        }

        if let Some(user) = self.user_mut(target) {
            user.name_first = "Removed".to_string();
            user.name_last = "user".to_string();
            user.email = None;
            user.handle = None;
            user.sessions.clear();
            user.is_owner = false;
            user.is_active = false;
        }

        info!("User {} removed user {}", actor, target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded(count: usize) -> StoreState {
        let mut state = StoreState::new();
        for i in 0..count {
            state
                .register(&format!("user{}@example.com", i), "hash", "User", &format!("N{}", i))
                .unwrap();
        }
        state
    }

    #[test]
    fn permission_change_checks_actor_and_levels() {
        let mut state = seeded(3);

        assert!(matches!(
            state.change_permission(1, 2, 1),
            Err(StoreError::AccessDenied(_))
        ));
        for bad in [0, 3, 256, -1] {
            assert!(matches!(
                state.change_permission(0, 1, bad),
                Err(StoreError::InvalidInput(_))
            ));
        }
        assert!(matches!(
            state.change_permission(0, 1, 2),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            state.change_permission(0, 9, 1),
            Err(StoreError::InvalidInput(_))
        ));

        state.change_permission(0, 1, 1).unwrap();
        assert!(state.user(1).unwrap().is_owner);
        state.change_permission(1, 0, 2).unwrap();
        assert!(!state.user(0).unwrap().is_owner);
    }

    #[test]
    fn sole_owner_cannot_be_demoted_or_removed() {
        let mut state = seeded(2);

        assert!(matches!(
            state.change_permission(0, 0, 2),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            state.remove_user(0, 0),
            Err(StoreError::InvalidInput(_))
        ));
        assert_eq!(state.global_owner_count(), 1);
    }

    #[test]
    fn removal_scrubs_history_and_frees_identity() {
        let mut state = seeded(2);
        let channel = state.create_channel(0, "general", true).unwrap();
        state.channel_join(1, channel).unwrap();
        state.channel_add_owner(0, channel, 1).unwrap();
        let dm = state.dm_create(1, &[0]).unwrap();

        let in_channel = state.message_send(1, channel, "hi").unwrap();
        let in_dm = state.message_send_dm(1, dm, "psst").unwrap();
        let kept = state.message_send(0, channel, "still here").unwrap();
        state.channel_leave(1, channel).unwrap();

        let before = state.channel(channel).unwrap().messages.clone();
        state.remove_user(0, 1).unwrap();

        let after = &state.channel(channel).unwrap().messages;
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(after.iter()) {
            assert_eq!(old.id, new.id);
            assert_eq!(old.author_id, new.author_id);
            assert_eq!(old.time_sent, new.time_sent);
        }
        let body = |id| after.iter().find(|m| m.id == id).unwrap().body.clone();
        assert_eq!(body(in_channel), REMOVED_USER_TEXT);
        assert_eq!(body(kept), "still here");
        assert_eq!(state.dm(dm).unwrap().messages[0].id, in_dm);
        assert_eq!(state.dm(dm).unwrap().messages[0].body, REMOVED_USER_TEXT);

        assert!(!state.channel(channel).unwrap().owner_members.contains(&1));
        assert!(!state.dm(dm).unwrap().has_member(1));

        let removed = state.user(1).unwrap();
        assert!(!removed.is_active);
        assert!(removed.sessions.is_empty());
        assert_eq!(removed.email, None);
        assert_eq!(removed.handle, None);
        assert_eq!(state.user_profile(1).unwrap().name_first, "Removed");
        assert_eq!(state.users_all().len(), 1);

        // email and handle are free again
        let again = state
            .register("user1@example.com", "hash", "User", "N1")
            .unwrap();
        assert_eq!(again.user_id, 2);
        assert_eq!(state.user(2).unwrap().handle.as_deref(), Some("usern1"));

        assert!(matches!(
            state.remove_user(0, 1),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn removed_user_sessions_are_dead() {
        let mut state = seeded(2);
        let claims = state.login(1).unwrap();
        state.remove_user(0, 1).unwrap();

        assert!(state.authenticate(&claims).is_err());
        assert!(state.credentials("user1@example.com").is_err());
        assert!(state.login(1).is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Register,
        Change { actor: u64, target: u64, permission: i64 },
        Remove { actor: u64, target: u64 },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Register),
            (0..8u64, 0..8u64, -1..4i64).prop_map(|(actor, target, permission)| Op::Change {
                actor,
                target,
                permission,
            }),
            (0..8u64, 0..8u64).prop_map(|(actor, target)| Op::Remove { actor, target }),
        ]
    }

    proptest! {
        #[test]
        fn prop_global_owner_floor(ops in prop::collection::vec(op(), 1..60)) {
            let mut state = StoreState::new();
            let mut registered = 0u64;

            for op in ops {
                match op {
                    Op::Register => {
                        let email = format!("p{}@example.com", registered);
                        state.register(&email, "hash", "Prop", "User").unwrap();
                        registered += 1;
                    }
                    Op::Change { actor, target, permission } => {
                        let _ = state.change_permission(actor, target, permission);
                    }
                    Op::Remove { actor, target } => {
                        let _ = state.remove_user(actor, target);
                    }
                }

                let active = state.users.iter().filter(|u| u.is_active).count();
                if active > 0 {
                    prop_assert!(state.global_owner_count() >= 1);
                }
            }
        }
    }
}
