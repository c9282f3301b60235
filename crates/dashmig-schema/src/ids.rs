//! Numeric identifiers used by the analytics platform
//!
//! All ids are plain non-negative integers on the wire. The newtypes keep a
//! table id from being passed where a column id is expected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw integer value
            #[inline]
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Read the id from a JSON number
            ///
            /// Returns `None` for anything that is not a non-negative integer.
            #[inline]
            #[must_use]
            pub fn from_json(value: &Value) -> Option<Self> {
                value.as_u64().map(Self)
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for Value {
            #[inline]
            fn from(id: $name) -> Self {
                Value::from(id.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

numeric_id!(
    /// Database id on the destination installation
    DatabaseId
);
numeric_id!(
    /// Table id (source or destination)
    TableId
);
numeric_id!(
    /// Column (field) id (source or destination)
    ColumnId
);
numeric_id!(
    /// Card (saved question) id
    CardId
);
numeric_id!(
    /// Dashboard id
    DashboardId
);
