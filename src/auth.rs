//! # Auth and subscription gating
//!
//! Saving to the store and exporting the PDF require a signed-in user
//! with an active subscription; editing and the preview work without. The
//! [`AuthProvider`] trait is the seam for the identity source, and
//! [`subscription_is_active`] asks the store whether the user has paid.

use crate::error::ProposalError;
use crate::store::{ListOptions, RecordStore, SUBSCRIPTIONS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
}

pub trait AuthProvider {
    /// The signed-in user, if any.
    fn current_user(&self) -> Option<User>;

    /// Drop the session. Idempotent.
    fn sign_out(&mut self);
}

/// A user has pro access while a subscription record with
/// `status = "active"` exists for them.
pub fn subscription_is_active(
    store: &dyn RecordStore,
    user_id: &str,
) -> Result<bool, ProposalError> {
    let options = ListOptions {
        filter: Some(format!("user=\"{}\" && status=\"active\"", user_id)),
        sort: None,
    };
    let page = store.list(SUBSCRIPTIONS, 1, 1, &options)?;
    Ok(!page.items.is_empty())
}

/// Fixed identity for tests and the CLI's offline mode.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<User>,
}

impl StaticAuth {
    pub fn signed_out() -> Self {
        Self { user: None }
    }

    pub fn signed_in(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user: Some(User {
                id: id.into(),
                email: email.into(),
            }),
        }
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<User> {
        self.user.clone()
    }

    fn sign_out(&mut self) {
        self.user = None;
    }
}
