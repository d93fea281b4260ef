//! Typed IDs for type-safe entity references.
//!
//! Products and expense categories are owned by the catalog service and keyed
//! by integer primary keys. Wrapping them keeps a `ProductId` from being
//! passed where an `ExpenseCategoryId` is expected.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers around integer keys.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Creates an ID from a raw key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw key.
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
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

typed_id!(ProductId, "Identifier of a product in the catalog.");
typed_id!(
    ExpenseCategoryId,
    "Identifier of an expense category (freight, customs, insurance...)."
);
