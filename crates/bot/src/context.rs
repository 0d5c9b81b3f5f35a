use keydrop_auth::Actor;
use keydrop_core::{ActorId, RoleId};

/// Authenticated caller of a request.
///
/// Inserted by the auth middleware; every protected route can extract it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor.id()
    }

    pub fn roles(&self) -> &[RoleId] {
        self.actor.roles()
    }
}
