//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of an aggregate root (order, product, warehouse, return).
///
/// Domain crates wrap this in their own newtypes so identifiers of different
/// kinds cannot be confused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(Uuid);

impl AggregateId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for AggregateId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<AggregateId> for Uuid {
    fn from(value: AggregateId) -> Self {
        value.0
    }
}

impl FromStr for AggregateId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s)
            .map_err(|e| DomainError::invalid_argument(format!("AggregateId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Implements the standard surface for a domain id newtype over [`AggregateId`]:
/// constructor, Display, FromStr and conversions.
#[macro_export]
macro_rules! impl_id_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(id: $crate::AggregateId) -> Self {
                Self(id)
            }

            /// Fresh random (UUIDv7) identifier.
            pub fn generate() -> Self {
                Self($crate::AggregateId::new())
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$crate::AggregateId> for $t {
            fn from(value: $crate::AggregateId) -> Self {
                Self(value)
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<$crate::AggregateId>()
                    .map(Self)
                    .map_err(|_| {
                        $crate::DomainError::invalid_argument(format!(
                            "{}: not a valid id: {s}",
                            $name
                        ))
                    })
            }
        }
    };
}
