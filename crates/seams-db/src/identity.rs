//! Registration, login and session bookkeeping.

use chrono::{SecondsFormat, Utc};
use tracing::info;

use seams_types::api::Claims;
use seams_types::models::UserId;

use crate::error::{StoreError, StoreResult};
use crate::models::UserRecord;
use crate::state::StoreState;

const MAX_HANDLE_BASE_LEN: usize = 20;

/// `local@domain.tld`, with the same character classes the sign-up form allows.
pub fn is_valid_email(email: &str) -> bool {
    fn local_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
    }
    fn domain_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '-')
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    !local.is_empty()
        && local.chars().all(local_char)
        && !host.is_empty()
        && host.chars().all(domain_char)
        && tld.chars().count() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

pub(crate) fn check_name(name: &str) -> StoreResult<()> {
    let len = name.chars().count();
    if !(1..=50).contains(&len) {
        return Err(StoreError::input(
            "Invalid name, must be within 1-50 characters (inclusive)",
        ));
    }
    Ok(())
}

pub(crate) fn check_email(email: &str) -> StoreResult<()> {
    if !is_valid_email(email) {
        return Err(StoreError::input("Invalid email"));
    }
    Ok(())
}

/// Issue a fresh session on `user` and return the token payload for it.
fn open_session(user: &mut UserRecord) -> Claims {
    user.total_sessions += 1;
    let session = format!(
        "{}#{}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
        user.total_sessions
    );
    user.sessions.push(session.clone());

    Claims {
        user_id: user.id,
        session,
        total_sessions: user.total_sessions,
    }
}

impl StoreState {
    pub(crate) fn email_taken(&self, email: &str) -> bool {
        self.users.iter().any(|u| u.email.as_deref() == Some(email))
    }

    pub(crate) fn handle_taken(&self, handle: &str) -> bool {
        self.users.iter().any(|u| u.handle.as_deref() == Some(handle))
    }

    /// Lower-cased alphanumerics of first + last, cut to 20 characters, then
    /// suffixed with 0, 1, 2, ... until no user holds it.
    pub(crate) fn generate_handle(&self, name_first: &str, name_last: &str) -> String {
        let base: String = name_first
            .chars()
            .chain(name_last.chars())
            .flat_map(char::to_lowercase)
            .filter(|c| c.is_alphanumeric())
            .take(MAX_HANDLE_BASE_LEN)
            .collect();

        if !self.handle_taken(&base) {
            return base;
        }

        let mut suffix: u64 = 0;
        loop {
            let candidate = format!("{}{}", base, suffix);
            if !self.handle_taken(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Create a user and its first session. The very first user ever
    /// registered becomes a global owner.
    pub fn register(
        &mut self,
        email: &str,
        password_hash: &str,
        name_first: &str,
        name_last: &str,
    ) -> StoreResult<Claims> {
        check_name(name_first)?;
        check_name(name_last)?;
        check_email(email)?;

        if self.email_taken(email) {
            return Err(StoreError::input("Email already registered"));
        }

        let id = self.next_user_id();
        let handle = self.generate_handle(name_first, name_last);
        let mut user = UserRecord {
            id,
            handle: Some(handle),
            email: Some(email.to_string()),
            password_hash: password_hash.to_string(),
            name_first: name_first.to_string(),
            name_last: name_last.to_string(),
            is_owner: id == 0,
            is_active: true,
            sessions: Vec::new(),
            total_sessions: 0,
        };
        let claims = open_session(&mut user);

        info!("Registered user {} (owner: {})", id, user.is_owner);
        self.users.push(user);
        Ok(claims)
    }

    /// Id and stored password hash of the active user holding `email`.
    /// The store never looks inside the hash.
    pub fn credentials(&self, email: &str) -> StoreResult<(UserId, String)> {
        self.users
            .iter()
            .find(|u| u.is_active && u.email.as_deref() == Some(email))
            .map(|u| (u.id, u.password_hash.clone()))
            .ok_or_else(|| StoreError::input("User does not exist"))
    }

    /// Open a new session for `user_id` once its password has been checked.
    pub fn login(&mut self, user_id: UserId) -> StoreResult<Claims> {
        let user = self
            .user_mut(user_id)
            .filter(|u| u.is_active)
            .ok_or_else(|| StoreError::input("User does not exist"))?;

        let claims = open_session(user);
        info!("User {} logged in ({} sessions live)", user.id, user.sessions.len());
        Ok(claims)
    }

    /// Resolve a decoded token to its user, provided the session is still live.
    pub fn authenticate(&self, claims: &Claims) -> StoreResult<UserId> {
        self.users
            .iter()
            .find(|u| u.id == claims.user_id && u.sessions.contains(&claims.session))
            .map(|u| u.id)
            .ok_or_else(|| StoreError::access("Invalid token"))
    }

    /// Drop the one session named by `claims`.
    pub fn logout(&mut self, claims: &Claims) -> StoreResult<()> {
        let user_id = self.authenticate(claims)?;
        let user = self
            .user_mut(user_id)
            .ok_or_else(|| StoreError::access("Invalid token"))?;
        user.sessions.retain(|s| s != &claims.session);

        info!("User {} logged out", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(state: &mut StoreState, email: &str, first: &str, last: &str) -> Claims {
        state.register(email, "hash", first, last).unwrap()
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("heart@of.gold"));
        assert!(is_valid_email("first.last+tag@mail.example.com"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@of.gold"));
        assert!(!is_valid_email("heart@gold"));
        assert!(!is_valid_email("heart@of.g"));
        assert!(!is_valid_email("heart@of.g0ld"));
        assert!(!is_valid_email("he@rt@of.gold"));
    }

    #[test]
    fn first_user_is_the_only_initial_owner() {
        let mut state = StoreState::new();
        let a = register(&mut state, "a@example.com", "Arthur", "Dent");
        let b = register(&mut state, "b@example.com", "Ford", "Prefect");

        assert_eq!(a.user_id, 0);
        assert_eq!(b.user_id, 1);
        assert!(state.user(0).unwrap().is_owner);
        assert!(!state.user(1).unwrap().is_owner);
    }

    #[test]
    fn handles_are_truncated_and_suffixed() {
        let mut state = StoreState::new();
        register(&mut state, "a@example.com", "Arthur", "Dent");
        register(&mut state, "b@example.com", "Arthur", "Dent");
        register(&mut state, "c@example.com", "Ar-thur", "D'ent");
        register(
            &mut state,
            "d@example.com",
            "Abcdefghijklmnop",
            "Qrstuvwxyz",
        );

        let handles: Vec<_> = state
            .users
            .iter()
            .map(|u| u.handle.clone().unwrap())
            .collect();
        assert_eq!(
            handles,
            vec!["arthurdent", "arthurdent0", "arthurdent1", "abcdefghijklmnopqrst"]
        );
    }

    #[test]
    fn duplicate_email_does_not_consume_an_id() {
        let mut state = StoreState::new();
        register(&mut state, "a@example.com", "Arthur", "Dent");

        let err = state
            .register("a@example.com", "hash", "Ford", "Prefect")
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));

        let next = register(&mut state, "b@example.com", "Ford", "Prefect");
        assert_eq!(next.user_id, 1);
    }

    #[test]
    fn register_rejects_bad_names() {
        let mut state = StoreState::new();
        assert!(state.register("a@example.com", "h", "", "Dent").is_err());
        assert!(state
            .register("a@example.com", "h", "Arthur", &"x".repeat(51))
            .is_err());
        assert!(state.users.is_empty());
    }

    #[test]
    fn login_opens_independent_sessions() {
        let mut state = StoreState::new();
        let first = register(&mut state, "a@example.com", "Arthur", "Dent");

        assert_eq!(state.credentials("a@example.com").unwrap(), (0, "hash".to_string()));
        let err = state.credentials("nobody@example.com").unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        let err = state.login(7).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));

        let second = state.login(0).unwrap();
        assert_ne!(first.session, second.session);
        assert_eq!(second.total_sessions, 2);

        state.logout(&first).unwrap();
        assert!(state.authenticate(&first).is_err());
        assert_eq!(state.authenticate(&second).unwrap(), 0);
    }

    #[test]
    fn logout_twice_is_access_denied() {
        let mut state = StoreState::new();
        let claims = register(&mut state, "a@example.com", "Arthur", "Dent");

        state.logout(&claims).unwrap();
        let err = state.logout(&claims).unwrap_err();
        assert!(matches!(err, StoreError::AccessDenied(_)));
    }
}
