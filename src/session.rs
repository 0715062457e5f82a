// src/session.rs

use crate::error::ClientError;
use crate::models::user::Role;
use crate::storage::{LocalStore, keys};

/// Identity facts for the current session.
///
/// Written by the login/logout flow, read synchronously by every component.
/// An absent identity is the normal logged-out state, never an error.
#[derive(Debug, Clone, Default)]
pub struct SessionIdentity {
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

impl SessionIdentity {
    /// Reads the persisted identity facts from the local store.
    /// A storage failure reads as logged out.
    pub fn load(store: &LocalStore) -> Self {
        let user_id = match store.get_json::<String>(keys::USER_ID) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("failed to read session identity: {}", e);
                None
            }
        };

        let role = match store.get_json::<String>(keys::DESIGNATION) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("failed to read session designation: {}", e);
                None
            }
        }
        .and_then(|raw| {
            let role = Role::parse(&raw);
            if role.is_none() {
                tracing::warn!("unknown designation '{}' in local store", raw);
            }
            role
        });

        Self { user_id, role }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Persists identity facts at login. Called by the login flow, never by the
/// state containers themselves.
pub fn persist_login(store: &LocalStore, user_id: &str, role: Role) -> Result<(), ClientError> {
    store.put_json(keys::USER_ID, &user_id)?;
    store.put_json(keys::DESIGNATION, &role.as_str())?;
    Ok(())
}

/// Clears identity facts at logout.
pub fn clear_login(store: &LocalStore) -> Result<(), ClientError> {
    store.remove(keys::USER_ID)?;
    store.remove(keys::DESIGNATION)
}
