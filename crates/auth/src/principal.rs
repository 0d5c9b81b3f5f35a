use serde::{Deserialize, Serialize};

use keydrop_core::{ActorId, RoleId};

/// A resolved actor for authorization decisions.
///
/// Construction is decoupled from transport: the command surface derives it
/// from token claims, tests build it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    roles: Vec<RoleId>,
}

impl Actor {
    pub fn new(id: ActorId, roles: Vec<RoleId>) -> Self {
        Self { id, roles }
    }

    /// Actor without any roles.
    pub fn member(id: ActorId) -> Self {
        Self::new(id, Vec::new())
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn roles(&self) -> &[RoleId] {
        &self.roles
    }

    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}
