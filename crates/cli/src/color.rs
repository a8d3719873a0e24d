// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers and status=`in_progress`/`healthy`: pastel cyan.
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey.
    pub const LITERAL: u8 = 250;
    /// Descriptions and context: medium grey.
    pub const CONTEXT: u8 = 245;
    /// Failed/offline/unhealthy rows.
    pub const WARN: u8 = 203;
}

/// Priority: `NO_COLOR=1` disables, `COLOR=1` forces, otherwise a TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";

pub fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("{}{}{}", fg256(code), text, RESET)
    } else {
        text.to_string()
    }
}

/// Colors a task/instance status for table output: warm for terminal or
/// unhealthy states, cyan otherwise.
pub fn status(text: &str) -> String {
    match text {
        "failed" | "offline" | "unhealthy" => paint(codes::WARN, text),
        _ => paint(codes::HEADER, text),
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
