//! Strongly-typed identifier types for the complaint management domain.
//!
//! Every persisted entity is keyed by a store-assigned 64-bit integer. Wrapping
//! each key in its own newtype keeps a complaint id from being passed where an
//! admin id is expected.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store key
            #[inline]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the underlying store key
            #[inline]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

define_id!(ComplaintId, "Internal identifier of a complaint record");

define_id!(CategoryId, "Identifier of a complaint category");

define_id!(UserId, "Identifier of a registered citizen");

define_id!(AdminId, "Identifier of an administrative user");

define_id!(
    HistoryEntryId,
    "Identifier of a status history ledger entry"
);

define_id!(NotificationId, "Identifier of a notification record");
