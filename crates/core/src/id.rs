// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types.
//!
//! Formats follow spec.md's data model exactly: tasks are `t-{epoch_ms}`,
//! events are `evt-{epoch_ms}-{rand}`. Instance ids are caller-supplied
//! (the instance names itself at `system.register` time) and session ids
//! come from the upstream hook session, so both are opaque strings rather
//! than generated.

use crate::clock::Clock;
use serde::{Deserialize, Serialize};

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    let end = std::cmp::min(n, s.len());
    &s[..end]
}

/// Define a newtype string id with `Display`, `Deref<Target = str>`, and the
/// usual `From` conversions. Generation (if any) is left to the type itself.
macro_rules! define_string_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
    };
}

define_string_id! {
    /// Unique identifier for a task, `t-{epoch_ms}`.
    pub struct TaskId;
}

impl TaskId {
    /// Generate a new task id from the current clock reading.
    ///
    /// Collisions within the same millisecond are caught by `task.create`'s
    /// existence check in the atomic script, not avoided here (spec.md §4.3).
    pub fn generate(clock: &impl Clock) -> Self {
        Self(format!("t-{}", clock.epoch_ms()))
    }
}

define_string_id! {
    /// Caller-supplied identifier for a running instance.
    pub struct InstanceId;
}

define_string_id! {
    /// Unique identifier for a bus event, `evt-{epoch_ms}-{rand}`.
    pub struct EventId;
}

impl EventId {
    pub fn generate(clock: &impl Clock) -> Self {
        let rand_suffix: u32 = rand::random();
        Self(format!("evt-{}-{:08x}", clock.epoch_ms(), rand_suffix))
    }
}

define_string_id! {
    /// Identifier for an upstream hook session being folded by the state processor.
    pub struct SessionId;
}

define_string_id! {
    /// Identifier for a session snapshot, `{sid}-{epoch_ms}`.
    pub struct SnapshotId;
}

impl SnapshotId {
    pub fn generate(sid: &SessionId, clock: &impl Clock) -> Self {
        Self(format!("{}-{}", sid.as_str(), clock.epoch_ms()))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
