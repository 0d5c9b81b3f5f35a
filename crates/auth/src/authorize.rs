use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use keydrop_core::{ActorId, RoleId};

use crate::Actor;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: actor {0} lacks administrative capability")]
    NotAdmin(ActorId),
}

/// Capability predicate: does this actor hold administrative rights?
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// Injected into the engine so mutating operations can be checked without a
/// live platform connection.
pub trait AdminCheck: Send + Sync {
    fn is_admin(&self, actor: &Actor) -> bool;
}

impl<C> AdminCheck for Arc<C>
where
    C: AdminCheck + ?Sized,
{
    fn is_admin(&self, actor: &Actor) -> bool {
        (**self).is_admin(actor)
    }
}

/// Admin iff the actor holds one configured role.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RoleAdminCheck {
    admin_role: RoleId,
}

impl RoleAdminCheck {
    pub fn new(admin_role: RoleId) -> Self {
        Self { admin_role }
    }

    pub fn admin_role(&self) -> RoleId {
        self.admin_role
    }
}

impl AdminCheck for RoleAdminCheck {
    fn is_admin(&self, actor: &Actor) -> bool {
        actor.has_role(self.admin_role)
    }
}

/// Admin iff the actor id is in a fixed set (tests, tooling).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticAdminCheck {
    admins: HashSet<ActorId>,
}

impl StaticAdminCheck {
    pub fn new(admins: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }
}

impl AdminCheck for StaticAdminCheck {
    fn is_admin(&self, actor: &Actor) -> bool {
        self.admins.contains(&actor.id())
    }
}

/// Authorize a mutating operation for `actor`.
pub fn authorize_admin<C: AdminCheck + ?Sized>(check: &C, actor: &Actor) -> Result<(), AuthzError> {
    if check.is_admin(actor) {
        Ok(())
    } else {
        Err(AuthzError::NotAdmin(actor.id()))
    }
}
