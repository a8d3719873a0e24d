// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cb task *` subcommands: thin wrappers over the `task.*` operation
//! surface (spec.md §6), projected through [`crate::client::Client`]
//! exactly the way a JSON-RPC transport would call `Registry::execute`.

use clap::{Args, Subcommand};
use serde_json::json;

use crate::client::Client;
use crate::color;
use crate::output::{emit, OutputFormat};

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a pending task.
    Create(CreateArgs),
    /// Merge field updates into a task.
    Update(UpdateArgs),
    /// Claim the highest-priority pending task for a worker.
    Claim(ClaimArgs),
    /// Mark an assigned task completed or failed.
    Complete(CompleteArgs),
    /// Directly assign a task to an instance.
    Assign(AssignArgs),
    /// Restore an assigned task to pending.
    Unassign(UnassignArgs),
    /// Delete a task and its queue memberships.
    Delete(DeleteArgs),
    /// List tasks by filter/sort/page.
    List(ListArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// Task description.
    text: String,
    #[arg(long, default_value_t = 50)]
    priority: u8,
    /// JSON-encoded metadata object.
    #[arg(long)]
    metadata: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    id: String,
    /// JSON-encoded object of fields to merge (e.g. `{"priority":90}`).
    updates: String,
}

#[derive(Args)]
pub struct ClaimArgs {
    worker_id: String,
}

#[derive(Args)]
pub struct CompleteArgs {
    id: String,
    /// JSON-encoded result; presence of `--error` wins regardless (spec.md
    /// §9 open question: `error` is the single discriminator).
    #[arg(long)]
    result: Option<String>,
    #[arg(long)]
    error: Option<String>,
}

#[derive(Args)]
pub struct AssignArgs {
    task_id: String,
    instance_id: String,
}

#[derive(Args)]
pub struct UnassignArgs {
    task_id: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    id: String,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    assigned_to: Option<String>,
    #[arg(long)]
    priority: Option<u8>,
    #[arg(long, default_value = "priority")]
    order_by: String,
    #[arg(long, default_value = "desc")]
    order: String,
    #[arg(long, default_value_t = 50)]
    limit: u64,
    #[arg(long, default_value_t = 0)]
    offset: u64,
}

fn parse_json_arg(raw: &str, flag: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("invalid JSON for {flag}: {e}"))
}

pub async fn run(client: &Client, cmd: TaskCommand, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TaskCommand::Create(args) => {
            let metadata = match args.metadata {
                Some(raw) => parse_json_arg(&raw, "--metadata")?,
                None => serde_json::Value::Null,
            };
            let result = client.execute("task.create", json!({"text": args.text, "priority": args.priority, "metadata": metadata})).await?;
            emit(format, &result, |v| println!("created {} ({})", v["id"].as_str().unwrap_or("?"), color::status(v["status"].as_str().unwrap_or("?"))))?;
        }
        TaskCommand::Update(args) => {
            let updates = parse_json_arg(&args.updates, "updates")?;
            let result = client.execute("task.update", json!({"id": args.id, "updates": updates})).await?;
            emit(format, &result, |v| println!("updated {}", v["id"].as_str().unwrap_or("?")))?;
        }
        TaskCommand::Claim(args) => {
            let result = client.execute("task.claim", json!({"workerId": args.worker_id})).await?;
            emit(format, &result, |v| {
                if v["claimed"].as_bool().unwrap_or(false) {
                    println!("claimed {}", v["taskId"].as_str().unwrap_or("?"));
                } else {
                    println!("nothing to claim");
                }
            })?;
        }
        TaskCommand::Complete(args) => {
            let result_value = args.result.as_deref().map(|raw| parse_json_arg(raw, "--result")).transpose()?;
            let mut params = json!({"id": args.id});
            if let Some(result_value) = result_value {
                params["result"] = result_value;
            }
            if let Some(error) = args.error {
                params["error"] = json!(error);
            }
            let result = client.execute("task.complete", params).await?;
            emit(format, &result, |v| println!("{} -> {}", v["id"].as_str().unwrap_or("?"), color::status(v["status"].as_str().unwrap_or("?"))))?;
        }
        TaskCommand::Assign(args) => {
            let result = client.execute("task.assign", json!({"taskId": args.task_id, "instanceId": args.instance_id})).await?;
            emit(format, &result, |v| println!("assigned {} -> {}", v["taskId"].as_str().unwrap_or("?"), v["instanceId"].as_str().unwrap_or("?")))?;
        }
        TaskCommand::Unassign(args) => {
            let result = client.execute("task.unassign", json!({"taskId": args.task_id})).await?;
            emit(format, &result, |v| println!("unassigned {}", v["taskId"].as_str().unwrap_or("?")))?;
        }
        TaskCommand::Delete(args) => {
            let result = client.execute("task.delete", json!({"id": args.id})).await?;
            emit(format, &result, |v| println!("deleted {}", v["id"].as_str().unwrap_or("?")))?;
        }
        TaskCommand::List(args) => {
            let params = json!({
                "status": args.status,
                "assignedTo": args.assigned_to,
                "priority": args.priority,
                "orderBy": args.order_by,
                "order": args.order,
                "limit": args.limit,
                "offset": args.offset,
            });
            let result = client.execute("task.list", params).await?;
            emit(format, &result, |v| print_task_table(v))?;
        }
    }
    Ok(())
}

fn print_task_table(value: &serde_json::Value) {
    let empty = Vec::new();
    let tasks = value["tasks"].as_array().unwrap_or(&empty);
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    println!("{:<16} {:<8} {:<12} {:<16} TEXT", "ID", "PRI", "STATUS", "ASSIGNED");
    for task in tasks {
        println!(
            "{:<16} {:<8} {:<12} {:<16} {}",
            task["id"].as_str().unwrap_or("?"),
            task["priority"].as_u64().unwrap_or(0),
            color::status(task["status"].as_str().unwrap_or("?")),
            task["assignedTo"].as_str().unwrap_or("-"),
            task["text"].as_str().unwrap_or(""),
        );
    }
    let total = value["totalCount"].as_u64().unwrap_or(tasks.len() as u64);
    println!("\n{} of {} task(s){}", tasks.len(), total, if value["hasMore"].as_bool().unwrap_or(false) { " (more available)" } else { "" });
}
