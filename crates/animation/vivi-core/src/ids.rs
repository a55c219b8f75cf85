//! Session identifiers and their allocator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical animation session id. Opaque to callers; rendered in generated
/// rule names as its decimal value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic allocator for SessionId. The first id handed out is 1 and ids
/// are never reused for the lifetime of the allocator.
#[derive(Debug)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> SessionId {
        let id = SessionId(self.next);
        self.next += 1;
        id
    }
}
