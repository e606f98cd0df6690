//! In-memory collaborators for unit tests.

use super::{
    AuthListener, AuthListeners, AuthProvider, AuthSubscription, DocumentStore, LocationSensor,
    PermissionGrant,
};
use crate::error::{AuthError, SensorError, StoreError};
use crate::models::{AuthUser, Coordinates, Document};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

pub(crate) fn user(uid: &str) -> AuthUser {
    AuthUser {
        uid: uid.to_string(),
        email: Some(format!("{uid}@example.com")),
    }
}

#[derive(Default)]
pub(crate) struct FakeAuth {
    listeners: AuthListeners,
    current: Mutex<Option<AuthUser>>,
    fail_sign_out: Mutex<bool>,
    sign_out_calls: Mutex<usize>,
}

impl FakeAuth {
    pub fn signed_in(uid: &str) -> Self {
        let auth = Self::default();
        *auth.current.lock() = Some(user(uid));
        auth
    }

    pub fn emit(&self, user: Option<AuthUser>) {
        *self.current.lock() = user.clone();
        self.listeners.notify(user);
    }

    pub fn fail_sign_out(&self, fail: bool) {
        *self.fail_sign_out.lock() = fail;
    }

    pub fn sign_out_calls(&self) -> usize {
        *self.sign_out_calls.lock()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[async_trait(?Send)]
impl AuthProvider for FakeAuth {
    fn subscribe(&self, listener: AuthListener) -> AuthSubscription {
        let current = self.current.lock().clone();
        let subscription = self.listeners.add(listener.clone());
        listener(current);
        subscription
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.sign_out_calls.lock() += 1;
        if *self.fail_sign_out.lock() {
            return Err(AuthError::Network("offline".to_string()));
        }
        self.emit(None);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum StoreCall {
    GetOne { id: String, collection: String },
    Update { id: String, partial: Document, collection: String },
    Delete { id: String, collection: String },
}

#[derive(Default)]
pub(crate) struct FakeStore {
    docs: Mutex<HashMap<(String, String), Document>>,
    calls: Mutex<Vec<StoreCall>>,
    fail: Mutex<bool>,
}

impl FakeStore {
    pub fn insert(&self, collection: &str, id: &str, doc: serde_json::Value) {
        let doc = match doc {
            serde_json::Value::Object(map) => map,
            _ => Document::new(),
        };
        self.docs
            .lock()
            .insert((collection.to_string(), id.to_string()), doc);
    }

    pub fn doc(&self, collection: &str, id: &str) -> Option<Document> {
        self.docs
            .lock()
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }

    pub fn fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if *self.fail.lock() {
            Err(StoreError::Network("offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait(?Send)]
impl DocumentStore for FakeStore {
    async fn get_one(&self, id: &str, collection: &str) -> Result<Option<Document>, StoreError> {
        self.calls.lock().push(StoreCall::GetOne {
            id: id.to_string(),
            collection: collection.to_string(),
        });
        self.check()?;
        Ok(self.doc(collection, id))
    }

    async fn update(
        &self,
        id: &str,
        partial: Document,
        collection: &str,
    ) -> Result<(), StoreError> {
        self.calls.lock().push(StoreCall::Update {
            id: id.to_string(),
            partial: partial.clone(),
            collection: collection.to_string(),
        });
        self.check()?;
        let mut docs = self.docs.lock();
        let doc = docs
            .entry((collection.to_string(), id.to_string()))
            .or_default();
        for (k, v) in partial {
            doc.insert(k, v);
        }
        Ok(())
    }

    async fn delete(&self, id: &str, collection: &str) -> Result<(), StoreError> {
        self.calls.lock().push(StoreCall::Delete {
            id: id.to_string(),
            collection: collection.to_string(),
        });
        self.check()?;
        self.docs
            .lock()
            .remove(&(collection.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

pub(crate) struct FakeSensor {
    granted: Mutex<bool>,
    grant_on_request: bool,
    reading: Result<Coordinates, SensorError>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeSensor {
    pub fn new(granted: bool, grant_on_request: bool, reading: Coordinates) -> Self {
        Self {
            granted: Mutex::new(granted),
            grant_on_request,
            reading: Ok(reading),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: SensorError) -> Self {
        Self {
            granted: Mutex::new(true),
            grant_on_request: true,
            reading: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn revoke(&self) {
        *self.granted.lock() = false;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }
}

#[async_trait(?Send)]
impl LocationSensor for FakeSensor {
    fn check_permission(&self) -> PermissionGrant {
        self.calls.lock().push("check_permission");
        PermissionGrant {
            granted: *self.granted.lock(),
        }
    }

    async fn request_permission(&self) -> PermissionGrant {
        self.calls.lock().push("request_permission");
        let mut granted = self.granted.lock();
        *granted = self.grant_on_request;
        PermissionGrant { granted: *granted }
    }

    async fn read_once(&self) -> Result<Coordinates, SensorError> {
        self.calls.lock().push("read_once");
        self.reading.clone()
    }
}
