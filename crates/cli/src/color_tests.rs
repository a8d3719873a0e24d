// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn codes_have_expected_values() {
    assert_eq!(codes::HEADER, 74);
    assert_eq!(codes::LITERAL, 250);
    assert_eq!(codes::CONTEXT, 245);
    assert_eq!(codes::WARN, 203);
}

#[test]
#[serial]
fn styles_returns_styled_when_color_forced() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");

    let s = styles();
    assert_ne!(format!("{s:?}"), format!("{:?}", Styles::plain()));
}

#[test]
#[serial]
fn styles_returns_plain_when_no_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::remove_var("COLOR");

    let s = styles();
    assert_eq!(format!("{s:?}"), format!("{:?}", Styles::plain()));
}

#[test]
#[serial]
fn paint_produces_ansi_when_color_forced() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");

    let result = paint(codes::HEADER, "foo");
    assert!(result.contains("\x1b[38;5;74m"));
    assert!(result.contains("foo"));
    assert!(result.contains(RESET));
}

#[test]
#[serial]
fn paint_plain_when_no_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::remove_var("COLOR");

    assert_eq!(paint(codes::HEADER, "foo"), "foo");
}

#[test]
#[serial]
fn status_warns_on_terminal_failure_states() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");

    assert!(status("failed").contains("\x1b[38;5;203m"));
    assert!(status("offline").contains("\x1b[38;5;203m"));
    assert!(status("unhealthy").contains("\x1b[38;5;203m"));
    assert!(status("in_progress").contains("\x1b[38;5;74m"));
}

#[test]
#[serial]
fn should_colorize_respects_no_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::set_var("COLOR", "1");
    assert!(!should_colorize(), "NO_COLOR=1 should override COLOR=1");
}

#[test]
#[serial]
fn should_colorize_respects_color_force() {
    std::env::remove_var("NO_COLOR");
    std::env::set_var("COLOR", "1");
    assert!(should_colorize(), "COLOR=1 should force color on");
}
