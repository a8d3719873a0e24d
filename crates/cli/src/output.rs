// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints a handler's raw JSON result, either as a compact pretty-printed
/// blob (`--format json`) or routed through `render` for the human view.
pub fn emit(format: OutputFormat, value: &serde_json::Value, render: impl FnOnce(&serde_json::Value)) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => render(value),
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
