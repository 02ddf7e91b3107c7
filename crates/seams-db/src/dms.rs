use std::collections::HashSet;

use tracing::info;

use seams_types::models::{DmDetails, DmId, DmSummary, UserId};

use crate::error::{StoreError, StoreResult};
use crate::models::DmRecord;
use crate::policy;
use crate::state::StoreState;

impl StoreState {
    /// Open a DM between `creator` and `u_ids`. The creator must not be listed.
    pub fn dm_create(&mut self, creator: UserId, u_ids: &[UserId]) -> StoreResult<DmId> {
        let creator_user = self.caller(creator)?;

        if u_ids.iter().any(|id| self.active_user(*id).is_none()) {
            return Err(StoreError::input(
                "Any u_id in u_ids does not refer to a valid user",
            ));
        }
        let mut seen = HashSet::from([creator]);
        if !u_ids.iter().all(|id| seen.insert(*id)) {
            return Err(StoreError::input("There are duplicate u_id's in u_ids"));
        }

        let mut handles: Vec<String> = std::iter::once(creator_user)
            .chain(u_ids.iter().filter_map(|id| self.active_user(*id)))
            .filter_map(|u| u.handle.clone())
            .collect();
        handles.sort();

        let id = self.dm_count;
        self.dm_count += 1;

        let mut all_members = Vec::with_capacity(u_ids.len() + 1);
        all_members.push(creator);
        all_members.extend_from_slice(u_ids);

        self.dms.push(DmRecord {
            id,
            name: handles.join(", "),
            creator,
            all_members,
            messages: Vec::new(),
        });

        info!("User {} created DM {} with {} members", creator, id, u_ids.len() + 1);
        Ok(id)
    }

    pub fn dm_list(&self, user_id: UserId) -> Vec<DmSummary> {
        self.dms
            .iter()
            .filter(|d| policy::is_member(*d, user_id))
            .map(|d| DmSummary {
                dm_id: d.id,
                name: d.name.clone(),
            })
            .collect()
    }

    pub fn dm_details(&self, user_id: UserId, dm_id: DmId) -> StoreResult<DmDetails> {
        let dm = self.existing_dm(dm_id)?;
        if !policy::is_member(dm, user_id) {
            return Err(StoreError::access("Authorised user is not a member"));
        }

        Ok(DmDetails {
            name: dm.name.clone(),
            members: self.profiles(&dm.all_members),
        })
    }

    /// Leaving never deletes the DM, even when the last member walks out.
    pub fn dm_leave(&mut self, user_id: UserId, dm_id: DmId) -> StoreResult<()> {
        let dm = self.existing_dm(dm_id)?;
        if !policy::is_member(dm, user_id) {
            return Err(StoreError::access("User is not a member of the DM"));
        }

        if let Some(dm) = self.dm_mut(dm_id) {
            dm.all_members.retain(|id| *id != user_id);
        }
        info!("User {} left DM {}", user_id, dm_id);
        Ok(())
    }

    /// Delete the DM outright. Only its creator, while still a member, may.
    pub fn dm_remove(&mut self, user_id: UserId, dm_id: DmId) -> StoreResult<()> {
        let dm = self
            .dm(dm_id)
            .ok_or_else(|| StoreError::input("DM with dm_id is not valid"))?;

        if !policy::can_remove_dm(dm, user_id) {
            return Err(if dm.creator == user_id {
                StoreError::access("Authorised user is no longer in the DM")
            } else {
                StoreError::access("Authorised user is not the original creator")
            });
        }

        self.dms.retain(|d| d.id != dm_id);
        info!("User {} removed DM {}", user_id, dm_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Container;

    fn seeded() -> StoreState {
        let mut state = StoreState::new();
        for (email, first, last) in [
            ("a@example.com", "Zaphod", "Beeblebrox"),
            ("b@example.com", "Arthur", "Dent"),
            ("c@example.com", "Ford", "Prefect"),
        ] {
            state.register(email, "hash", first, last).unwrap();
        }
        state
    }

    #[test]
    fn name_is_sorted_handles_and_never_recomputed() {
        let mut state = seeded();
        let id = state.dm_create(0, &[1, 2]).unwrap();
        assert_eq!(state.dm(id).unwrap().name, "arthurdent, fordprefect, zaphodbeeblebrox");

        state.dm_leave(2, id).unwrap();
        state.set_handle(1, "arthur").unwrap();
        assert_eq!(state.dm(id).unwrap().name, "arthurdent, fordprefect, zaphodbeeblebrox");
    }

    #[test]
    fn solo_dm_is_named_after_creator() {
        let mut state = seeded();
        let id = state.dm_create(1, &[]).unwrap();
        assert_eq!(state.dm(id).unwrap().name, "arthurdent");
        assert_eq!(state.dm(id).unwrap().owners(), vec![1]);
    }

    #[test]
    fn create_rejects_invalid_and_duplicate_ids() {
        let mut state = seeded();
        assert!(matches!(
            state.dm_create(0, &[1, 9]),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            state.dm_create(0, &[1, 1]),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            state.dm_create(0, &[0]),
            Err(StoreError::InvalidInput(_))
        ));
        assert_eq!(state.dm_count, 0);
    }

    #[test]
    fn dm_ids_are_not_reused_after_removal() {
        let mut state = seeded();
        let first = state.dm_create(0, &[1]).unwrap();
        state.dm_remove(0, first).unwrap();
        let second = state.dm_create(0, &[1]).unwrap();

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert!(state.dm(first).is_none());
    }

    #[test]
    fn remove_distinguishes_left_creator_from_non_creator() {
        let mut state = seeded();
        let id = state.dm_create(0, &[1]).unwrap();

        assert!(matches!(
            state.dm_remove(1, id),
            Err(StoreError::AccessDenied(reason)) if reason.contains("original creator")
        ));

        state.dm_leave(0, id).unwrap();
        assert!(matches!(
            state.dm_remove(0, id),
            Err(StoreError::AccessDenied(reason)) if reason.contains("no longer")
        ));
        assert!(matches!(
            state.dm_remove(0, 77),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(state.dm(id).is_some());
    }

    #[test]
    fn leaving_solo_dm_orphans_it() {
        let mut state = seeded();
        let id = state.dm_create(0, &[]).unwrap();
        state.dm_leave(0, id).unwrap();

        assert!(matches!(
            state.dm_details(0, id),
            Err(StoreError::AccessDenied(_))
        ));
        assert!(state.dm(id).is_some());
        assert!(state.dm_list(0).is_empty());
    }

    #[test]
    fn details_list_members() {
        let mut state = seeded();
        let id = state.dm_create(0, &[2]).unwrap();

        let details = state.dm_details(2, id).unwrap();
        let ids: Vec<_> = details.members.iter().map(|m| m.u_id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert!(matches!(
            state.dm_details(1, id),
            Err(StoreError::AccessDenied(_))
        ));
    }
}
