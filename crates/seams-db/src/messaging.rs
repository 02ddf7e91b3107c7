use chrono::Utc;
use tracing::{debug, info};

use seams_types::models::{ChannelId, DmId, MessageId, MessagePage, UserId};

use crate::error::{StoreError, StoreResult};
use crate::models::{Container, MessageRecord};
use crate::policy;
use crate::state::StoreState;

pub const PAGE_SIZE: usize = 50;
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Where a message lives: container index plus position in its message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Channel { container: usize, position: usize },
    Dm { container: usize, position: usize },
}

fn find_in<C: Container>(containers: &[C], user_id: UserId, message_id: MessageId) -> Option<(usize, usize)> {
    containers.iter().enumerate().find_map(|(container, c)| {
        if !policy::is_member(c, user_id) {
            return None;
        }
        c.messages()
            .iter()
            .position(|m| m.id == message_id)
            .map(|position| (container, position))
    })
}

fn page<C: Container>(container: &C, start: usize) -> StoreResult<MessagePage> {
    let messages = container.messages();
    if start > messages.len() {
        return Err(StoreError::input(
            "Start greater than total number of messages",
        ));
    }

    let stop = (start + PAGE_SIZE).min(messages.len());
    let end = if start + PAGE_SIZE < messages.len() {
        (start + PAGE_SIZE) as i64
    } else {
        -1
    };

    Ok(MessagePage {
        messages: messages[start..stop].iter().map(MessageRecord::view).collect(),
        start,
        end,
    })
}

fn check_body(body: &str) -> StoreResult<()> {
    let len = body.chars().count();
    if !(1..=MAX_MESSAGE_LEN).contains(&len) {
        return Err(StoreError::input(
            "Length of message is less than 1 or over 1000 characters",
        ));
    }
    Ok(())
}

impl StoreState {
    fn new_message(&mut self, author_id: UserId, body: &str) -> MessageRecord {
        let id = self.message_count;
        self.message_count += 1;
        MessageRecord {
            id,
            author_id,
            body: body.to_string(),
            time_sent: Utc::now().timestamp(),
        }
    }

    pub fn message_send(&mut self, user_id: UserId, channel_id: ChannelId, body: &str) -> StoreResult<MessageId> {
        let channel = self.existing_channel(channel_id)?;
        if !policy::is_member(channel, user_id) {
            return Err(StoreError::access(
                "User is not a member of the channel",
            ));
        }
        check_body(body)?;

        let message = self.new_message(user_id, body);
        let id = message.id;
        if let Some(channel) = self.channel_mut(channel_id) {
            channel.messages.insert(0, message);
        }
        debug!("User {} sent message {} to channel {}", user_id, id, channel_id);
        Ok(id)
    }

    pub fn message_send_dm(&mut self, user_id: UserId, dm_id: DmId, body: &str) -> StoreResult<MessageId> {
        let dm = self.existing_dm(dm_id)?;
        if !policy::is_member(dm, user_id) {
            return Err(StoreError::access("User is not a member of the DM"));
        }
        check_body(body)?;

        let message = self.new_message(user_id, body);
        let id = message.id;
        if let Some(dm) = self.dm_mut(dm_id) {
            dm.messages.insert(0, message);
        }
        debug!("User {} sent message {} to DM {}", user_id, id, dm_id);
        Ok(id)
    }

    pub fn channel_messages(&self, user_id: UserId, channel_id: ChannelId, start: usize) -> StoreResult<MessagePage> {
        let channel = self.existing_channel(channel_id)?;
        if !policy::is_member(channel, user_id) {
            return Err(StoreError::access(
                "User is not a member of the channel",
            ));
        }
        page(channel, start)
    }

    pub fn dm_messages(&self, user_id: UserId, dm_id: DmId, start: usize) -> StoreResult<MessagePage> {
        let dm = self.existing_dm(dm_id)?;
        if !policy::is_member(dm, user_id) {
            return Err(StoreError::access("User is not a member of the DM"));
        }
        page(dm, start)
    }

    /// Find `message_id` among the containers `user_id` belongs to, channels first.
    fn locate_message(&self, user_id: UserId, message_id: MessageId) -> Option<Location> {
        if let Some((container, position)) = find_in(&self.channels, user_id, message_id) {
            return Some(Location::Channel { container, position });
        }
        find_in(&self.dms, user_id, message_id)
            .map(|(container, position)| Location::Dm { container, position })
    }

    /// Locate a message and check the caller may change it.
    fn authorize_change(&self, user_id: UserId, message_id: MessageId) -> StoreResult<Location> {
        let user = self.caller(user_id)?;
        let location = self.locate_message(user_id, message_id).ok_or_else(|| {
            StoreError::input("Invalid message within channel/DM that user has joined")
        })?;

        match location {
            Location::Channel { container, position } => {
                let channel = &self.channels[container];
                if !policy::is_author(&channel.messages[position], user)
                    && !policy::can_moderate_channel(channel, user)
                {
                    return Err(StoreError::access(
                        "User is not sender nor has owner permissions in channel",
                    ));
                }
            }
            Location::Dm { container, position } => {
                let dm = &self.dms[container];
                if !policy::is_author(&dm.messages[position], user)
                    && !policy::can_moderate_dm(dm, user)
                {
                    return Err(StoreError::access(
                        "User is not sender nor has owner permissions in DM",
                    ));
                }
            }
        }
        Ok(location)
    }

    /// Replace a message body. An empty body removes the message instead.
    pub fn message_edit(&mut self, user_id: UserId, message_id: MessageId, body: &str) -> StoreResult<()> {
        if body.is_empty() {
            return self.message_remove(user_id, message_id);
        }

        let location = self.authorize_change(user_id, message_id)?;
        if body.chars().count() > MAX_MESSAGE_LEN {
            return Err(StoreError::input(
                "Length of message is over 1000 characters",
            ));
        }

        let message = match location {
            Location::Channel { container, position } => &mut self.channels[container].messages[position],
            Location::Dm { container, position } => &mut self.dms[container].messages[position],
        };
        message.body = body.to_string();

        info!("User {} edited message {}", user_id, message_id);
        Ok(())
    }

    pub fn message_remove(&mut self, user_id: UserId, message_id: MessageId) -> StoreResult<()> {
        match self.authorize_change(user_id, message_id)? {
            Location::Channel { container, position } => {
                self.channels[container].messages.remove(position);
            }
            Location::Dm { container, position } => {
                self.dms[container].messages.remove(position);
            }
        }

        info!("User {} removed message {}", user_id, message_id);
        Ok(())
    }
}
