// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SHA1 digest used to address scripts for `EVALSHA` (spec.md §4.2
//! "loaded once at startup (by SHA if the store supports it)").

use sha1::{Digest, Sha1};

pub fn sha1_hex(source: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}
