//! User models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use utoipa::ToSchema;

/// A stored user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Payload accepted by `createUser`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// In-memory user storage keyed by id.
#[derive(Debug, Default)]
pub struct UserStore {
    users: Mutex<BTreeMap<String, User>>,
    next_id: AtomicU64,
}

impl UserStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new user and returns it with its assigned id.
    pub fn insert(&self, new_user: NewUser) -> User {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = User {
            user_id: id.to_string(),
            name: new_user.name,
            email: new_user.email,
        };
        self.lock().insert(user.user_id.clone(), user.clone());
        user
    }

    /// Looks up one user.
    pub fn get(&self, user_id: &str) -> Option<User> {
        self.lock().get(user_id).cloned()
    }

    /// Users whose name contains `name` (all users when `None`).
    pub fn list(&self, name: Option<&str>) -> Vec<User> {
        self.lock()
            .values()
            .filter(|user| name.map_or(true, |n| user.name.contains(n)))
            .cloned()
            .collect()
    }

    /// Removes one user, returning whether it existed.
    pub fn remove(&self, user_id: &str) -> bool {
        self.lock().remove(user_id).is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
