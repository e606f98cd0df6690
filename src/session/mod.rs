//! Auth session observer.
//!
//! The observer is the only writer of the session signal. Everyone else gets
//! a [`ReadSignal`] and reacts to it.

use crate::collab::{AuthProvider, AuthSubscription};
use crate::models::AuthUser;
use leptos::prelude::*;
use log::info;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<AuthUser>,
}

impl Session {
    pub fn from_user(user: Option<AuthUser>) -> Self {
        Self { user }
    }

    pub fn is_active(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.uid.as_str())
    }
}

pub struct SessionObserver {
    session: RwSignal<Session>,
    subscription: Option<AuthSubscription>,
}

impl SessionObserver {
    pub fn new() -> Self {
        Self {
            session: RwSignal::new(Session::default()),
            subscription: None,
        }
    }

    /// Subscribes to `auth`, replacing any previous subscription.
    pub fn start(&mut self, auth: &dyn AuthProvider) {
        self.stop();
        let session = self.session;
        let subscription = auth.subscribe(Arc::new(move |user| {
            apply_auth_event(session, user);
        }));
        self.subscription = Some(subscription);
    }

    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            info!("event=session_unsubscribe module=session status=ok");
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn session(&self) -> ReadSignal<Session> {
        self.session.read_only()
    }
}

impl Default for SessionObserver {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the session derived from an auth event. Repeated events for the same
/// state are absorbed so readers see one notification per transition.
pub(crate) fn apply_auth_event(session: RwSignal<Session>, user: Option<AuthUser>) -> bool {
    let next = Session::from_user(user);
    let mut changed = false;
    session.maybe_update(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        changed = true;
        true
    });
    if changed {
        info!(
            "event=session_transition module=session status=ok active={}",
            session.with_untracked(Session::is_active)
        );
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testing::{user, FakeAuth};

    #[test]
    fn test_start_delivers_current_state() {
        let auth = FakeAuth::signed_in("u-1");
        let mut observer = SessionObserver::new();
        observer.start(&auth);

        let session = observer.session().get_untracked();
        assert!(session.is_active());
        assert_eq!(session.user_id(), Some("u-1"));
    }

    #[test]
    fn test_session_follows_auth_transitions() {
        let auth = FakeAuth::default();
        let mut observer = SessionObserver::new();
        observer.start(&auth);
        let session = observer.session();
        assert!(!session.get_untracked().is_active());

        auth.emit(Some(user("u-1")));
        assert!(session.get_untracked().is_active());

        auth.emit(None);
        assert!(!session.get_untracked().is_active());
    }

    #[test]
    fn test_repeated_event_is_not_a_transition() {
        let session = RwSignal::new(Session::default());
        assert!(apply_auth_event(session, Some(user("u-1"))));
        assert!(!apply_auth_event(session, Some(user("u-1"))));
        assert!(apply_auth_event(session, Some(user("u-2"))));
        assert!(apply_auth_event(session, None));
        assert!(!apply_auth_event(session, None));
    }

    #[test]
    fn test_restart_keeps_exactly_one_subscription() {
        let auth = FakeAuth::default();
        let mut observer = SessionObserver::new();
        observer.start(&auth);
        observer.start(&auth);
        assert_eq!(auth.listener_count(), 1);
    }

    #[test]
    fn test_stop_unsubscribes_and_ignores_later_events() {
        let auth = FakeAuth::default();
        let mut observer = SessionObserver::new();
        observer.start(&auth);
        observer.stop();

        assert_eq!(auth.listener_count(), 0);
        assert!(!observer.is_subscribed());
        auth.emit(Some(user("u-1")));
        assert!(!observer.session().get_untracked().is_active());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let auth = FakeAuth::default();
        {
            let mut observer = SessionObserver::new();
            observer.start(&auth);
            assert_eq!(auth.listener_count(), 1);
        }
        assert_eq!(auth.listener_count(), 0);
    }
}
