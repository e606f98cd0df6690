//! Confirm-then-mutate protocol for destructive actions.

use crate::collab::{AuthProvider, DocumentStore};
use crate::error::AppError;
use crate::models::JOURNALS_COLLECTION;
use crate::navigation::HeaderAction;
use log::{error, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    Logout,
    DeleteJournal { journal_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub title: &'static str,
    pub message: &'static str,
    pub confirm_label: &'static str,
}

impl Mutation {
    pub fn from_action(action: &HeaderAction) -> Option<Self> {
        match action {
            HeaderAction::Logout => Some(Self::Logout),
            HeaderAction::Delete { journal_id } => Some(Self::DeleteJournal {
                journal_id: journal_id.clone(),
            }),
            HeaderAction::Add { .. } => None,
        }
    }

    pub fn prompt(&self) -> Prompt {
        match self {
            Self::Logout => Prompt {
                title: "Logout",
                message: "Are you sure you want to logout?",
                confirm_label: "Logout",
            },
            Self::DeleteJournal { .. } => Prompt {
                title: "Delete Journal",
                message: "Are you sure you want to delete this journal?",
                confirm_label: "Delete",
            },
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Logout => "logout",
            Self::DeleteJournal { .. } => "delete_journal",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    Idle,
    Confirming(Mutation),
    Committing(Mutation),
}

/// Navigation consequence of a committed mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consequence {
    /// The session observer swaps trees; nothing to navigate.
    AwaitSession,
    /// Leave the screen showing the removed record.
    PopScreen,
}

/// One confirmation flow shared by every destructive action. Only one
/// mutation can be in flight at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfirmFlow {
    state: FlowState,
}

impl ConfirmFlow {
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn pending_prompt(&self) -> Option<Prompt> {
        match &self.state {
            FlowState::Confirming(m) => Some(m.prompt()),
            _ => None,
        }
    }

    pub fn is_committing(&self) -> bool {
        matches!(self.state, FlowState::Committing(_))
    }

    /// Idle -> Confirming. Refused while another mutation is pending.
    pub fn activate(&mut self, mutation: Mutation) -> bool {
        if self.state != FlowState::Idle {
            return false;
        }
        self.state = FlowState::Confirming(mutation);
        true
    }

    /// Confirming -> Idle without side effects.
    pub fn dismiss(&mut self) -> Option<Mutation> {
        match std::mem::take(&mut self.state) {
            FlowState::Confirming(m) => {
                info!("event=confirm module=flows status=cancelled action={}", m.label());
                Some(m)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Confirming -> Committing. Returns the mutation to commit.
    pub fn confirm(&mut self) -> Option<Mutation> {
        match std::mem::take(&mut self.state) {
            FlowState::Confirming(m) => {
                self.state = FlowState::Committing(m.clone());
                Some(m)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Committing -> Idle once the mutation has resolved either way.
    pub fn settle(&mut self) {
        if self.is_committing() {
            self.state = FlowState::Idle;
        }
    }
}

/// Runs a confirmed mutation against its collaborator.
pub async fn commit(
    mutation: &Mutation,
    auth: &dyn AuthProvider,
    store: &dyn DocumentStore,
) -> Result<Consequence, AppError> {
    let result = match mutation {
        Mutation::Logout => auth
            .sign_out()
            .await
            .map(|_| Consequence::AwaitSession)
            .map_err(AppError::Logout),
        Mutation::DeleteJournal { journal_id } => store
            .delete(journal_id, JOURNALS_COLLECTION)
            .await
            .map(|_| Consequence::PopScreen)
            .map_err(AppError::DeleteJournal),
    };

    match &result {
        Ok(_) => info!("event=commit module=flows status=ok action={}", mutation.label()),
        Err(err) => error!(
            "event=commit module=flows status=error action={} error={}",
            mutation.label(),
            err
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testing::{FakeAuth, FakeStore, StoreCall};
    use crate::error::StoreError;
    use futures::executor::block_on;
    use serde_json::json;

    fn delete(id: &str) -> Mutation {
        Mutation::DeleteJournal {
            journal_id: id.to_string(),
        }
    }

    #[test]
    fn test_state_machine_happy_path() {
        let mut flow = ConfirmFlow::default();
        assert!(flow.activate(Mutation::Logout));
        assert_eq!(flow.pending_prompt().map(|p| p.title), Some("Logout"));

        assert_eq!(flow.confirm(), Some(Mutation::Logout));
        assert!(flow.is_committing());
        assert!(flow.pending_prompt().is_none());

        flow.settle();
        assert_eq!(flow.state(), &FlowState::Idle);
    }

    #[test]
    fn test_dismiss_returns_to_idle() {
        let mut flow = ConfirmFlow::default();
        flow.activate(delete("J1"));
        assert_eq!(flow.dismiss(), Some(delete("J1")));
        assert_eq!(flow.state(), &FlowState::Idle);
        assert_eq!(flow.confirm(), None);
    }

    #[test]
    fn test_cannot_commit_without_confirming() {
        let mut flow = ConfirmFlow::default();
        assert_eq!(flow.confirm(), None);
        assert_eq!(flow.state(), &FlowState::Idle);
    }

    #[test]
    fn test_second_activation_is_refused_while_busy() {
        let mut flow = ConfirmFlow::default();
        assert!(flow.activate(Mutation::Logout));
        assert!(!flow.activate(delete("J1")));

        flow.confirm();
        assert!(!flow.activate(delete("J1")));
        assert_eq!(flow.dismiss(), None);
        assert!(flow.is_committing());
    }

    #[test]
    fn test_prompts_use_client_copy() {
        let p = delete("J1").prompt();
        assert_eq!(p.title, "Delete Journal");
        assert_eq!(p.message, "Are you sure you want to delete this journal?");
        assert_eq!(p.confirm_label, "Delete");
        assert_eq!(Mutation::Logout.prompt().message, "Are you sure you want to logout?");
    }

    #[test]
    fn test_from_action_skips_add() {
        assert_eq!(
            Mutation::from_action(&HeaderAction::Add { target: "AddJournal" }),
            None
        );
        assert_eq!(
            Mutation::from_action(&HeaderAction::Delete {
                journal_id: "J1".to_string()
            }),
            Some(delete("J1"))
        );
    }

    #[test]
    fn test_commit_delete_targets_journals_collection() {
        let auth = FakeAuth::signed_in("u-1");
        let store = FakeStore::default();
        store.insert("journals", "J1", json!({ "text": "hello" }));

        let result = block_on(commit(&delete("J1"), &auth, &store));
        assert_eq!(result, Ok(Consequence::PopScreen));
        assert_eq!(
            store.calls(),
            vec![StoreCall::Delete {
                id: "J1".to_string(),
                collection: "journals".to_string()
            }]
        );
        assert_eq!(auth.sign_out_calls(), 0);
    }

    #[test]
    fn test_commit_delete_failure_is_typed() {
        let auth = FakeAuth::signed_in("u-1");
        let store = FakeStore::default();
        store.fail(true);

        let result = block_on(commit(&delete("J1"), &auth, &store));
        assert_eq!(
            result,
            Err(AppError::DeleteJournal(StoreError::Network("offline".to_string())))
        );
    }

    #[test]
    fn test_commit_logout_failure_keeps_session() {
        let auth = FakeAuth::signed_in("u-1");
        auth.fail_sign_out(true);
        let store = FakeStore::default();

        let result = block_on(commit(&Mutation::Logout, &auth, &store));
        assert!(matches!(result, Err(AppError::Logout(_))));
        assert_eq!(auth.sign_out_calls(), 1);
        assert!(store.calls().is_empty());
    }
}
