// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON Schema validation (spec.md §4.6 "validate"). Schemas are compiled
//! once per call rather than cached per descriptor, since `jsonschema`'s
//! `Validator` borrows its schema `Value` and a descriptor's schema is
//! itself a `'static`-free `Value` owned by the pipeline.

use cb_core::CbError;
use serde_json::Value;

pub fn validate(schema: &Value, instance: &Value) -> Result<(), CbError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| CbError::internal(&format!("invalid schema: {e}")))?;
    if let Some(error) = validator.iter_errors(instance).next() {
        let field = error.instance_path.to_string();
        let field = if field.is_empty() { "<root>".to_string() } else { field };
        return Err(CbError::invalid_params(field, error.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
