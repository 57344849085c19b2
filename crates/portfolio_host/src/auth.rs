//! Authentication collaborator: the provider contract and host-owned session state.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use serde::{Deserialize, Serialize};

/// Object-safe boxed future used by [`AuthProvider`] async methods.
pub type AuthFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Signed-in user as reported by the auth provider.
pub struct AuthUser {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
}

/// External authentication service. Sign-in and sign-up happen in host-owned modals.
pub trait AuthProvider {
    /// Ends the provider-side session.
    fn sign_out(&self) -> AuthFuture<'_, Result<(), String>>;
}

#[derive(Debug, Clone, Default)]
/// Provider that always succeeds, optionally failing on demand for tests.
pub struct MemoryAuthProvider {
    failure: Option<String>,
    sign_outs: Rc<RefCell<u32>>,
}

impl MemoryAuthProvider {
    /// Provider whose sign-out fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of successful sign-outs.
    pub fn sign_out_count(&self) -> u32 {
        *self.sign_outs.borrow()
    }
}

impl AuthProvider for MemoryAuthProvider {
    fn sign_out(&self) -> AuthFuture<'_, Result<(), String>> {
        Box::pin(async move {
            if let Some(message) = &self.failure {
                return Err(message.clone());
            }
            *self.sign_outs.borrow_mut() += 1;
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Default)]
/// Current user shared between the host UI and commands. Clones share state.
pub struct AuthSession {
    user: Rc<RefCell<Option<AuthUser>>>,
}

impl AuthSession {
    /// Session with `user` already signed in.
    pub fn signed_in(user: AuthUser) -> Self {
        let session = Self::default();
        session.set_user(Some(user));
        session
    }

    /// Current user, if any.
    pub fn user(&self) -> Option<AuthUser> {
        self.user.borrow().clone()
    }

    /// Returns whether someone is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.user.borrow().is_some()
    }

    /// Replaces the current user. The host calls this after its sign-in flow completes.
    pub fn set_user(&self, user: Option<AuthUser>) {
        *self.user.borrow_mut() = user;
    }
}
