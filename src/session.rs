//! Session state held in durable client-side storage.
//!
//! The dashboard never keeps sessions on the server. Whatever the client
//! stores under the three keys below *is* the session; a [`SessionContext`]
//! is built per request over that storage and is the only thing allowed to
//! read, establish or clear it.

use std::collections::HashMap;

use serde_json::Value;

use crate::api::LoginResponse;
use crate::error::AuthError;
use crate::role::Role;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_TYPE_KEY: &str = "user_type";
pub const USER_DATA_KEY: &str = "user_data";

/// Every key a session writes. Logout removes all of them.
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, USER_TYPE_KEY, USER_DATA_KEY];

/// Key/value storage that survives between page loads on the client.
pub trait ClientStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);

    fn clear(&mut self) {
        for key in SESSION_KEYS {
            self.remove(key);
        }
    }
}

/// In-process storage, used when there is no browser on the other end.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// An authenticated user: bearer token, role and the profile record the backend sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub user: Value,
}

impl Session {
    /// Name for the "Welcome, ..." line. Empty when the profile has none.
    pub fn display_name(&self) -> &str {
        self.user
            .get("full_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Explicit handle on the session stored in `S`.
pub struct SessionContext<S> {
    storage: S,
}

impl<S: ClientStorage> SessionContext<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The persisted session, if the storage holds a usable one.
    ///
    /// Token and user type must both be present and the user type must name a
    /// known role. A missing or unreadable profile falls back to `{}`.
    pub fn current(&self) -> Option<Session> {
        let token = self.storage.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())?;
        let role = self.storage.get(USER_TYPE_KEY)?.parse::<Role>().ok()?;
        let user = self
            .storage
            .get(USER_DATA_KEY)
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Default::default()));
        Some(Session { token, role, user })
    }

    /// Persist a successful login. The role is stored lower-cased.
    pub fn establish(&mut self, login: &LoginResponse) -> Result<Session, AuthError> {
        let role = login
            .user_type
            .parse::<Role>()
            .map_err(|_| AuthError::UnknownRole(login.user_type.clone()))?;
        if login.access_token.is_empty() {
            return Err(AuthError::Malformed("empty access_token".to_string()));
        }

        let user_data = serde_json::to_string(&login.user)
            .map_err(|e| AuthError::Malformed(e.to_string()))?;
        self.storage.set(ACCESS_TOKEN_KEY, &login.access_token);
        self.storage.set(USER_TYPE_KEY, role.as_str());
        self.storage.set(USER_DATA_KEY, &user_data);

        Ok(Session {
            token: login.access_token.clone(),
            role,
            user: login.user.clone(),
        })
    }

    pub fn logout(&mut self) {
        self.storage.clear();
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
