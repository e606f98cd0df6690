//! Interfaces of the external collaborators the orchestration layer consumes.

use crate::error::{AuthError, SensorError, StoreError};
use crate::models::{AuthUser, Coordinates, Document};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[cfg(test)]
pub(crate) mod testing;

pub type AuthListener = Arc<dyn Fn(Option<AuthUser>) + Send + Sync>;

#[async_trait(?Send)]
pub trait AuthProvider: Send + Sync {
    /// Registers `listener` for auth state changes. The current state is
    /// delivered once on registration.
    fn subscribe(&self, listener: AuthListener) -> AuthSubscription;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

#[async_trait(?Send)]
pub trait DocumentStore: Send + Sync {
    async fn get_one(&self, id: &str, collection: &str) -> Result<Option<Document>, StoreError>;

    async fn update(&self, id: &str, partial: Document, collection: &str)
        -> Result<(), StoreError>;

    async fn delete(&self, id: &str, collection: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PermissionGrant {
    pub granted: bool,
}

#[async_trait(?Send)]
pub trait LocationSensor: Send + Sync {
    fn check_permission(&self) -> PermissionGrant;

    async fn request_permission(&self) -> PermissionGrant;

    async fn read_once(&self) -> Result<Coordinates, SensorError>;
}

/// Live registration with an [`AuthProvider`]. Dropping it unsubscribes.
pub struct AuthSubscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl AuthSubscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(u64, AuthListener)>,
}

/// Listener bookkeeping shared by auth provider implementations.
#[derive(Clone, Default)]
pub struct AuthListeners {
    table: Arc<Mutex<ListenerTable>>,
}

impl AuthListeners {
    pub fn add(&self, listener: AuthListener) -> AuthSubscription {
        let id = {
            let mut table = self.table.lock();
            table.next_id += 1;
            let id = table.next_id;
            table.entries.push((id, listener));
            id
        };

        let table = Arc::clone(&self.table);
        AuthSubscription::new(move || {
            table.lock().entries.retain(|(entry_id, _)| *entry_id != id);
        })
    }

    /// Delivers `user` to every registered listener. Listeners run outside the
    /// table lock so they may unsubscribe from inside the callback.
    pub fn notify(&self, user: Option<AuthUser>) {
        let listeners: Vec<AuthListener> = self
            .table
            .lock()
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(user.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
