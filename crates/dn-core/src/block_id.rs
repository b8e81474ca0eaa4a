//! Strongly-typed block id wrapper.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Strongly-typed wrapper for block ids.
///
/// Prevents accidental mixing of block ids with notebook ids, symbol
/// names, or other string types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Create a new `BlockId`, panicking in debug builds if the id is empty.
    ///
    /// Prefer [`try_new`](Self::try_new) when handling untrusted input.
    pub fn new(id: impl Into<String>) -> Self {
        let s = id.into();
        debug_assert!(!s.is_empty(), "BlockId must not be empty");
        Self(s)
    }

    /// Try to create a new `BlockId`, returning `None` if the id is empty.
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let s = id.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Return the underlying id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for BlockId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for BlockId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for BlockId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BlockId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_empty() {
        assert!(BlockId::try_new("").is_none());
        assert_eq!(BlockId::try_new("b1").unwrap().as_str(), "b1");
    }

    #[test]
    fn borrow_allows_str_lookup() {
        let mut set = std::collections::HashSet::new();
        set.insert(BlockId::new("abc"));
        assert!(set.contains("abc"));
    }
}
