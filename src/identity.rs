//! Seam to the external identity provider.

use std::sync::RwLock;

use crate::domain::UserId;

/// Supplies the currently authenticated user, if any.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<UserId>;

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

/// Identity holder that is signed in and out programmatically. Useful for
/// embedding hosts that receive auth state changes as events.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    user: RwLock<Option<UserId>>,
}

impl StaticIdentity {
    pub fn signed_in(user: UserId) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: UserId) {
        if let Ok(mut slot) = self.user.write() {
            *slot = Some(user);
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut slot) = self.user.write() {
            *slot = None;
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.user.read().ok().and_then(|slot| slot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out_toggle_current_user() {
        let identity = StaticIdentity::signed_out();
        assert!(!identity.is_authenticated());
        identity.sign_in(UserId::new("u-1"));
        assert_eq!(identity.current_user(), Some(UserId::new("u-1")));
        identity.sign_out();
        assert_eq!(identity.current_user(), None);
    }
}
