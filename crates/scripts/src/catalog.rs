// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loads every script once at startup so the first real invocation can use
//! `EVALSHA` (spec.md §4.2). `FakeStore::script_load` is a no-op; this still
//! runs so both backends exercise the same startup path.

use crate::error::ScriptError;
use cb_store::StoreAdapter;

macro_rules! scripts {
    ($($module:ident => $name:literal),+ $(,)?) => {
        $(
            pub(crate) mod $module {
                pub const NAME: &str = $name;
                pub const SOURCE: &str = include_str!(concat!("../lua/", $name, ".lua"));
            }
        )+

        /// Pre-loads every script against a store. Call once per process,
        /// before the first handler dispatch.
        pub async fn load_all(store: &dyn StoreAdapter) -> Result<(), ScriptError> {
            $(store.script_load($module::SOURCE).await?;)+
            Ok(())
        }
    };
}

scripts! {
    task_create => "task_create",
    task_claim => "task_claim",
    task_update => "task_update",
    task_complete => "task_complete",
    task_reassign => "task_reassign",
    task_delete => "task_delete",
    task_auto_assign => "task_auto_assign",
    system_register => "system_register",
    system_heartbeat => "system_heartbeat",
    task_reassign_failed => "task_reassign_failed",
    event_is_duplicate => "event_is_duplicate",
    event_add_to_partition => "event_add_to_partition",
    metrics_aggregate => "metrics_aggregate",
    state_sync => "state_sync",
}

/// Invokes a cataloged script and parses its `{ok, ...}` reply, turning
/// `ok: 0` into the matching [`ScriptError`] variant via the `error` field.
pub(crate) async fn invoke(
    store: &dyn StoreAdapter,
    name: &'static str,
    source: &'static str,
    keys: &[String],
    args: &[String],
) -> Result<serde_json::Value, ScriptError> {
    let reply = store.eval_script(name, source, keys, args).await?;
    let value: serde_json::Value = serde_json::from_str(&reply)
        .map_err(|e| ScriptError::MalformedReply { script: name, detail: e.to_string() })?;
    let ok = value.get("ok").and_then(|v| v.as_i64()).unwrap_or(0);
    if ok == 0 {
        let code = value.get("error").and_then(|v| v.as_str()).unwrap_or("unknown");
        return Err(ScriptError::from_code(name, code));
    }
    Ok(value)
}
