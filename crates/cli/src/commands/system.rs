// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cb system *` subcommands: instance registration/heartbeat and the
//! read-only aggregated snapshots (spec.md §6).

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::Client;
use crate::output::{emit, OutputFormat};

#[derive(Subcommand)]
pub enum SystemCommand {
    /// Register an instance under the given id and roles.
    Register(RegisterArgs),
    /// Renew an instance's lease.
    Heartbeat(HeartbeatArgs),
    /// Liveness snapshot: reachability and active-instance count.
    Health,
    /// Condensed global state snapshot (`cb:state:global`).
    GetState,
    /// Raw gauge snapshot (`cb:metrics:global` / `cb:metrics:queues`).
    Metrics,
    /// Sweep instances for failure and trigger orphan reassignment.
    CheckHealth,
    /// Read the latest gossip quorum view.
    CheckQuorum,
    /// List every registered operation and its description.
    Inventory,
}

#[derive(Args)]
pub struct RegisterArgs {
    id: String,
    /// Comma-separated role list, e.g. `worker,coordinator`.
    #[arg(long, default_value = "worker")]
    roles: String,
}

#[derive(Args)]
pub struct HeartbeatArgs {
    instance_id: String,
}

pub async fn run(client: &Client, cmd: SystemCommand, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SystemCommand::Register(args) => {
            let roles: Vec<&str> = args.roles.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
            let result = client.execute("system.register", json!({"id": args.id, "roles": roles})).await?;
            emit(format, &result, |v| {
                println!("registered {}{}", args.id, if v["becameLeader"].as_bool().unwrap_or(false) { " (became leader)" } else { "" })
            })?;
        }
        SystemCommand::Heartbeat(args) => {
            let result = client.execute("system.heartbeat", json!({"instanceId": args.instance_id})).await?;
            emit(format, &result, |v| println!("ok{}", if v["isLeader"].as_bool().unwrap_or(false) { " (leader)" } else { "" }))?;
        }
        SystemCommand::Health => {
            let result = client.execute("system.health", json!({})).await?;
            emit(format, &result, |v| println!("active instances: {}", v["activeInstances"].as_u64().unwrap_or(0)))?;
        }
        SystemCommand::GetState => {
            let result = client.execute("system.get_state", json!({})).await?;
            emit(format, &result, |v| println!("{}", serde_json::to_string_pretty(v).unwrap_or_default()))?;
        }
        SystemCommand::Metrics => {
            let result = client.execute("system.metrics", json!({})).await?;
            emit(format, &result, |v| println!("{}", serde_json::to_string_pretty(v).unwrap_or_default()))?;
        }
        SystemCommand::CheckHealth => {
            let result = client.execute("system.check_health", json!({})).await?;
            emit(format, &result, |v| {
                let healthy = v["healthy"].as_array().map(Vec::len).unwrap_or(0);
                let failed = v["failed"].as_array().map(Vec::len).unwrap_or(0);
                println!("healthy: {healthy}, failed: {failed}");
            })?;
        }
        SystemCommand::CheckQuorum => {
            let result = client.execute("system.check_quorum", json!({})).await?;
            emit(format, &result, |v| {
                println!(
                    "{}/{} healthy{}{}",
                    v["healthy"].as_u64().unwrap_or(0),
                    v["total"].as_u64().unwrap_or(0),
                    if v["partitioned"].as_bool().unwrap_or(false) { " — partition detected" } else { "" },
                    if v["recovered"].as_bool().unwrap_or(false) { " — recovered" } else { "" },
                )
            })?;
        }
        SystemCommand::Inventory => {
            let entries = client.inventory();
            match format {
                OutputFormat::Json => {
                    let value = json!(entries
                        .iter()
                        .map(|e| json!({
                            "event": e.event,
                            "description": e.description,
                            "inputSchema": e.input_schema,
                            "outputSchema": e.output_schema,
                            "rateLimit": e.rate_limit,
                        }))
                        .collect::<Vec<_>>());
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                OutputFormat::Text => {
                    for entry in entries {
                        let rate_limit = entry.rate_limit.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
                        let validated = if entry.input_schema.is_some() { "validated" } else { "unvalidated" };
                        println!("{:<28} {:<10} {:<12} {}", entry.event, rate_limit, validated, entry.description);
                    }
                }
            }
        }
    }
    Ok(())
}
