//! Integration tests for `#[secure_storage]` accessors.

use codable_synth::store::{self, MemoryStore, SecureStore, StoredValue};
use codable_synth::{codable, secure_storage};
use serde_json::json;
use std::sync::Mutex;

/// Records every call before delegating to a [`MemoryStore`].
#[derive(Debug, Default)]
struct RecordingStore {
    calls: Mutex<Vec<String>>,
    inner: MemoryStore,
}

impl RecordingStore {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl SecureStore for RecordingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.record(format!("get {key}"));
        self.inner.get(key)
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.record(format!("get_bool {key}"));
        self.inner.get_bool(key)
    }

    fn get_data(&self, key: &str) -> Option<Vec<u8>> {
        self.record(format!("get_data {key}"));
        self.inner.get_data(key)
    }

    fn set(&self, value: StoredValue, key: &str) -> bool {
        self.record(format!("set {key}"));
        self.inner.set(value, key)
    }

    fn delete(&self, key: &str) -> bool {
        self.record(format!("delete {key}"));
        self.inner.delete(key)
    }
}

#[secure_storage(store = self.vault)]
struct Session {
    user: String,
    vault: RecordingStore,
    #[secure("session-token")]
    token: Option<String>,
    #[secure("remember-me")]
    remember: Option<bool>,
    #[secure("avatar")]
    avatar: Option<Vec<u8>>,
    #[secure("login-count")]
    logins: Option<u32>,
}

#[secure_storage]
struct Device {
    #[secure("device-id")]
    id: Option<String>,
}

#[codable]
#[secure_storage]
#[derive(Debug)]
struct Login {
    user: String,
    #[secure("login-password")]
    password: Option<String>,
}

fn session() -> Session {
    Session {
        user: "ada".into(),
        vault: RecordingStore::default(),
    }
}

#[test]
fn getter_reads_through_the_store() {
    let session = session();
    assert_eq!(session.token(), None);
    session.vault.inner.set("abc".into(), "session-token");
    assert_eq!(session.token().as_deref(), Some("abc"));
    assert_eq!(
        session.vault.take_calls(),
        vec!["get session-token", "get session-token"]
    );
    assert_eq!(session.user, "ada");
}

#[test]
fn some_sets_exactly_once() {
    let session = session();
    session.set_token(Some("abc".into()));
    assert_eq!(session.vault.take_calls(), vec!["set session-token"]);
    assert_eq!(
        session.vault.inner.get("session-token").as_deref(),
        Some("abc")
    );
}

#[test]
fn none_deletes() {
    let session = session();
    session.set_token(Some("abc".into()));
    session.set_token(None);
    assert_eq!(
        session.vault.take_calls(),
        vec!["set session-token", "delete session-token"]
    );
    assert_eq!(session.token(), None);
}

#[test]
fn typed_accessors_pick_typed_reads() {
    let session = session();
    session.set_remember(Some(true));
    session.set_avatar(Some(vec![1, 2]));
    session.set_logins(Some(42));
    session.vault.take_calls();

    assert_eq!(session.remember(), Some(true));
    assert_eq!(session.avatar(), Some(vec![1, 2]));
    assert_eq!(session.logins(), Some(42));
    assert_eq!(
        session.vault.take_calls(),
        vec!["get_bool remember-me", "get_data avatar", "get login-count"]
    );
    assert_eq!(
        session.vault.inner.get("login-count").as_deref(),
        Some("42")
    );
}

#[test]
fn unparsable_value_reads_as_none() {
    let session = session();
    session.vault.inner.set("many".into(), "login-count");
    assert_eq!(session.logins(), None);
}

#[test]
fn default_store_is_shared() {
    let device = Device {};
    device.set_id(Some("d-1".into()));
    assert_eq!(store::shared().get("device-id").as_deref(), Some("d-1"));
    assert_eq!(device.id().as_deref(), Some("d-1"));
    device.set_id(None);
    assert_eq!(store::shared().get("device-id"), None);
}

#[test]
fn secure_fields_are_not_coded() {
    let login: Login =
        codable_synth::from_value(&json!({ "user": "ada", "password": "hunter2" })).unwrap();
    assert_eq!(login.user, "ada");
    assert_eq!(login.password(), None);

    login.set_password(Some("s3cret".into()));
    assert_eq!(login.password().as_deref(), Some("s3cret"));
    assert_eq!(
        codable_synth::to_value(&login).unwrap(),
        json!({ "user": "ada" })
    );
    login.set_password(None);
}
