use tracing::info;

use seams_types::models::{ChannelDetails, ChannelId, ChannelSummary, UserId, UserProfile};

use crate::error::{StoreError, StoreResult};
use crate::models::{ChannelRecord, Container};
use crate::policy;
use crate::state::StoreState;

impl StoreState {
    pub(crate) fn profiles(&self, ids: &[UserId]) -> Vec<UserProfile> {
        ids.iter()
            .filter_map(|id| self.user(*id))
            .map(|u| u.profile())
            .collect()
    }

    pub fn create_channel(&mut self, creator: UserId, name: &str, is_public: bool) -> StoreResult<ChannelId> {
        self.caller(creator)?;

        let len = name.chars().count();
        if !(1..=20).contains(&len) {
            return Err(StoreError::input(
                "Invalid name, must be within 1-20 characters (inclusive)",
            ));
        }

        let id = self.next_channel_id();
        self.channels.push(ChannelRecord {
            id,
            name: name.to_string(),
            is_public,
            owner_members: vec![creator],
            all_members: vec![creator],
            messages: Vec::new(),
        });

        info!("User {} created channel {} ({})", creator, id, name);
        Ok(id)
    }

    /// Channels `user_id` belongs to.
    pub fn channels_list(&self, user_id: UserId) -> Vec<ChannelSummary> {
        self.channels
            .iter()
            .filter(|c| policy::is_member(*c, user_id))
            .map(|c| ChannelSummary {
                channel_id: c.id,
                name: c.name.clone(),
            })
            .collect()
    }

    /// Every channel, private ones included.
    pub fn channels_list_all(&self) -> Vec<ChannelSummary> {
        self.channels
            .iter()
            .map(|c| ChannelSummary {
                channel_id: c.id,
                name: c.name.clone(),
            })
            .collect()
    }

    pub fn channel_details(&self, user_id: UserId, channel_id: ChannelId) -> StoreResult<ChannelDetails> {
        let channel = self.existing_channel(channel_id)?;
        if !policy::is_member(channel, user_id) {
            return Err(StoreError::access(
                "Authorised user is not a member of the channel",
            ));
        }

        Ok(ChannelDetails {
            name: channel.name.clone(),
            is_public: channel.is_public,
            owner_members: self.profiles(&channel.owner_members),
            all_members: self.profiles(&channel.all_members),
        })
    }

    pub fn channel_join(&mut self, user_id: UserId, channel_id: ChannelId) -> StoreResult<()> {
        let user = self.caller(user_id)?;
        let channel = self.existing_channel(channel_id)?;

        let is_member = policy::is_member(channel, user_id);
        if !channel.is_public && !is_member && !user.is_owner {
            return Err(StoreError::access(
                "Non global owner can't join private channel",
            ));
        }
        if is_member {
            return Err(StoreError::input("Already a member"));
        }

        if let Some(channel) = self.channel_mut(channel_id) {
            channel.all_members.push(user_id);
        }
        info!("User {} joined channel {}", user_id, channel_id);
        Ok(())
    }

    /// Any member may invite, public or private channel alike.
    pub fn channel_invite(&mut self, inviter: UserId, channel_id: ChannelId, invitee: UserId) -> StoreResult<()> {
        let channel = self.existing_channel(channel_id)?;
        if !policy::is_member(channel, inviter) {
            return Err(StoreError::access(
                "Authorised user is not a member of the channel",
            ));
        }
        if self.active_user(invitee).is_none() {
            return Err(StoreError::input("Invalid u_id"));
        }
        if policy::is_member(channel, invitee) {
            return Err(StoreError::input("User with u_id already a member"));
        }

        if let Some(channel) = self.channel_mut(channel_id) {
            channel.all_members.push(invitee);
        }
        info!("User {} invited user {} to channel {}", inviter, invitee, channel_id);
        Ok(())
    }

    pub fn channel_leave(&mut self, user_id: UserId, channel_id: ChannelId) -> StoreResult<()> {
        let channel = self.existing_channel(channel_id)?;
        if !policy::is_member(channel, user_id) {
            return Err(StoreError::access(
                "User is not a member of the channel",
            ));
        }

        if let Some(channel) = self.channel_mut(channel_id) {
            channel.owner_members.retain(|id| *id != user_id);
            channel.all_members.retain(|id| *id != user_id);
        }
        info!("User {} left channel {}", user_id, channel_id);
        Ok(())
    }

    /// Validate a change to `target`'s ownership of `channel_id` on behalf of `actor`.
    fn check_owner_change(&self, actor: UserId, channel_id: ChannelId, target: UserId) -> StoreResult<&ChannelRecord> {
        let channel = self.existing_channel(channel_id)?;
        let actor = self.caller(actor)?;
        if !policy::can_moderate_channel(channel, actor) {
            return Err(StoreError::access("Auth user has no owner permissions"));
        }
        if self.active_user(target).is_none() {
            return Err(StoreError::input(
                "User with u_id does not refer to a valid user",
            ));
        }
        Ok(channel)
    }

    pub fn channel_add_owner(&mut self, actor: UserId, channel_id: ChannelId, target: UserId) -> StoreResult<()> {
        let channel = self.check_owner_change(actor, channel_id, target)?;
        if !policy::is_member(channel, target) {
            return Err(StoreError::input(
                "User with u_id is not a member of the channel",
            ));
        }
        if channel.has_owner(target) {
            return Err(StoreError::input("User with u_id already owner"));
        }

        if let Some(channel) = self.channel_mut(channel_id) {
            channel.owner_members.push(target);
        }
        info!("User {} made user {} an owner of channel {}", actor, target, channel_id);
        Ok(())
    }

    pub fn channel_remove_owner(&mut self, actor: UserId, channel_id: ChannelId, target: UserId) -> StoreResult<()> {
        let channel = self.check_owner_change(actor, channel_id, target)?;
        if !channel.has_owner(target) {
            return Err(StoreError::input(
                "User with u_id is not an owner of the channel",
            ));
        }
        if channel.owner_members.len() == 1 {
            return Err(StoreError::input(
                "User with u_id is the only owner of the channel",
            ));
        }

        if let Some(channel) = self.channel_mut(channel_id) {
            channel.owner_members.retain(|id| *id != target);
        }
        info!("User {} removed user {} as owner of channel {}", actor, target, channel_id);
        Ok(())
    }
}
