//! Identity resolution seam.
//!
//! The engine never reads an ambient current user; every core call takes
//! the acting `Participant` explicitly. This trait is the one boundary
//! where an opaque caller credential becomes a stable profile.

use futures::future::BoxFuture;

use koyomi_store::model::UserProfile;

use crate::error::ServiceResult;

pub trait IdentityResolver: Send + Sync {
    /// Resolves an opaque caller credential into a stable user profile.
    fn resolve<'a>(&'a self, credential: &'a str) -> BoxFuture<'a, ServiceResult<UserProfile>>;
}

/// Resolver that yields one fixed profile regardless of credential.
/// Backs single-user embeddings and tests.
#[derive(Debug, Clone)]
pub struct FixedIdentity {
    profile: UserProfile,
}

impl FixedIdentity {
    #[must_use]
    pub const fn new(profile: UserProfile) -> Self {
        Self { profile }
    }
}

impl IdentityResolver for FixedIdentity {
    fn resolve<'a>(&'a self, _credential: &'a str) -> BoxFuture<'a, ServiceResult<UserProfile>> {
        Box::pin(async move { Ok(self.profile.clone()) })
    }
}
