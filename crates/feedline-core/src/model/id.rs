// ── Identity types ──
//
// Record and category ids arrive as numbers or strings depending on the
// feed. Both are normalised to strings so lookups never care which.

use std::fmt;

use serde::{Deserialize, Serialize};

use feedline_api::eonet::WireId;

/// Identifier of a single domain record (event or activity).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

/// Identifier of a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<&WireId> for $ty {
            fn from(id: &WireId) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(RecordId);
string_id!(CategoryId);
