use tracing::info;

use seams_types::models::{UserId, UserProfile};

use crate::error::{StoreError, StoreResult};
use crate::identity::{check_email, check_name};
use crate::state::StoreState;

impl StoreState {
    /// Profiles of every active user, in registration order.
    pub fn users_all(&self) -> Vec<UserProfile> {
        self.users
            .iter()
            .filter(|u| u.is_active)
            .map(|u| u.profile())
            .collect()
    }

    /// Profile of any user ever registered, removed ones included.
    pub fn user_profile(&self, user_id: UserId) -> StoreResult<UserProfile> {
        self.user(user_id)
            .map(|u| u.profile())
            .ok_or_else(|| StoreError::input("Invalid user_id"))
    }

    pub fn set_name(&mut self, user_id: UserId, name_first: &str, name_last: &str) -> StoreResult<()> {
        self.caller(user_id)?;
        check_name(name_first)?;
        check_name(name_last)?;

        if let Some(user) = self.user_mut(user_id) {
            user.name_first = name_first.to_string();
            user.name_last = name_last.to_string();
        }
        Ok(())
    }

    pub fn set_email(&mut self, user_id: UserId, email: &str) -> StoreResult<()> {
        self.caller(user_id)?;
        check_email(email)?;
        if self.email_taken(email) {
            return Err(StoreError::input("Email already registered"));
        }

        if let Some(user) = self.user_mut(user_id) {
            user.email = Some(email.to_string());
        }
        Ok(())
    }

    pub fn set_handle(&mut self, user_id: UserId, handle: &str) -> StoreResult<()> {
        self.caller(user_id)?;

        let len = handle.chars().count();
        if !(3..=20).contains(&len) {
            return Err(StoreError::input(
                "Invalid handle, must be within 3-20 characters (inclusive)",
            ));
        }
        if !handle.chars().all(char::is_alphanumeric) {
            return Err(StoreError::input(
                "Invalid handle, can only contain alphanumeric characters",
            ));
        }
        if self.handle_taken(handle) {
            return Err(StoreError::input(
                "Handle is already being used by another user",
            ));
        }

        if let Some(user) = self.user_mut(user_id) {
            info!("User {} changed handle to {}", user_id, handle);
            user.handle = Some(handle.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> StoreState {
        let mut state = StoreState::new();
        state
            .register("a@example.com", "hash", "Arthur", "Dent")
            .unwrap();
        state
            .register("b@example.com", "hash", "Ford", "Prefect")
            .unwrap();
        state
    }

    #[test]
    fn profile_setters_validate_and_apply() {
        let mut state = seeded();

        state.set_name(1, "Zaphod", "Beeblebrox").unwrap();
        assert!(state.set_name(1, "", "Beeblebrox").is_err());

        assert!(state.set_email(1, "a@example.com").is_err());
        assert!(state.set_email(1, "not-an-email").is_err());
        state.set_email(1, "z@example.com").unwrap();

        assert!(state.set_handle(1, "ab").is_err());
        assert!(state.set_handle(1, "has space").is_err());
        assert!(state.set_handle(1, "arthurdent").is_err());
        state.set_handle(1, "zaphod").unwrap();

        let profile = state.user_profile(1).unwrap();
        assert_eq!(profile.name_first, "Zaphod");
        assert_eq!(profile.email.as_deref(), Some("z@example.com"));
        assert_eq!(profile.handle_str.as_deref(), Some("zaphod"));
    }

    #[test]
    fn unknown_profile_is_invalid_input() {
        let state = seeded();
        assert!(matches!(
            state.user_profile(7),
            Err(StoreError::InvalidInput(_))
        ));
        assert_eq!(state.users_all().len(), 2);
    }
}
