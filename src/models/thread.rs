//! Thread handle: the durable key of one conversation lineage.

use std::fmt::{Display, Formatter};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identifies one durable conversation lineage.
///
/// Minted once at session start from the wall clock, stable for the session's
/// lifetime, and passed unchanged to every checkpoint read and write. A
/// session reset mints a new handle; the old lineage is never touched again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ThreadHandle(String);

impl ThreadHandle {
    /// Mint a fresh handle from the current wall-clock time.
    #[must_use]
    pub fn mint() -> Self {
        Self(format!("thread-{}", Utc::now().format("%Y%m%d_%H%M%S_%3f")))
    }

    /// Reconstruct a handle from its stored string key.
    #[must_use]
    pub fn from_key(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The string key used in checkpoint records.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ThreadHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
