// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn maps_not_found_to_code_three() {
    let err = CbError::not_found("no such task");
    let exit: ExitError = err.into();
    assert_eq!(exit.code, 3);
    assert!(exit.message.contains("no such task"));
}

#[test]
fn maps_rate_limited_and_circuit_open_distinctly() {
    assert_eq!(ExitError::from(CbError::rate_limited(500)).code, 5);
    assert_eq!(ExitError::from(CbError::circuit_open("open")).code, 7);
}

#[test]
fn maps_invalid_params_to_code_two() {
    let exit: ExitError = CbError::invalid_params("id", "missing field").into();
    assert_eq!(exit.code, 2);
}

#[test]
fn display_shows_the_message() {
    let exit = ExitError::new(9, "service unavailable");
    assert_eq!(exit.to_string(), "service unavailable");
}
