//! Strongly-typed identifiers used across the domain.
//!
//! Chat platforms hand out 64-bit snowflake ids for users, roles and messages.
//! They are opaque here: the engine only compares and hashes them.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identity of whoever issued a command.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(u64);

/// Identity of the member receiving (or losing) an entitlement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(u64);

/// Identifier of a platform role (used for the admin capability check).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(u64);

/// Handle to an artifact sent through the delivery channel (a private message id).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryHandle(u64);

macro_rules! impl_snowflake_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(raw))
            }
        }
    };
}

impl_snowflake_newtype!(ActorId, "ActorId");
impl_snowflake_newtype!(RecipientId, "RecipientId");
impl_snowflake_newtype!(RoleId, "RoleId");
impl_snowflake_newtype!(DeliveryHandle, "DeliveryHandle");

impl From<ActorId> for RecipientId {
    /// The same platform member can act as an admin and be a recipient.
    fn from(value: ActorId) -> Self {
        Self(value.0)
    }
}
