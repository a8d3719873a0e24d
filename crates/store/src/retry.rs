// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capped exponential backoff for transient connection errors (spec.md §7
//! "Recovery vs surface": "connection-level blips on store commands retry
//! with capped exponential backoff inside the adapter"). Command/script
//! failures are never retried here — only errors [`StoreError`] classifies
//! as connection-level.

use crate::error::StoreError;
use std::future::Future;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 4;
const BASE_DELAY: Duration = Duration::from_millis(20);
const MAX_DELAY: Duration = Duration::from_millis(500);

pub async fn with_retry<T, F, Fut>(mut op: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(StoreError::Connection(msg)) if attempt + 1 < MAX_ATTEMPTS => {
                let delay = std::cmp::min(BASE_DELAY * 2u32.pow(attempt), MAX_DELAY);
                tracing::warn!(attempt, %msg, ?delay, "store connection error, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_connection_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(|| async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(StoreError::Connection("reset".into()))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_retries_command_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, _> = with_retry(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Command("bad syntax".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
