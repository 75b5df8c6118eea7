//! Field-by-field validation of decoded request bodies.
//!
//! Request bodies are first decoded into an untyped `serde_json::Value`;
//! the functions here turn that value into a typed request or report every
//! rule it breaks. A JSON `null` counts as a present field of the wrong type.

use serde_json::{Map, Value};

use crate::error::ValidationErrors;
use crate::types::{CreateItem, UpdateItem};

pub const NOT_AN_OBJECT: &str = "Request body must be a JSON object";
pub const CREATE_NAME: &str = "Name is required and must be a non-empty string";
pub const UPDATE_NAME: &str = "Name must be a non-empty string";
pub const QUANTITY: &str = "Quantity must be a non-negative number";
pub const PURCHASED: &str = "Purchased must be a boolean value";

/// Validate a create payload. `name` is required; `quantity` is optional.
pub fn validate_create(payload: &Value) -> Result<CreateItem, ValidationErrors> {
    let fields = as_object(payload)?;
    let mut errors = ValidationErrors::new();

    let name = fields.get("name").and_then(check_name);
    if name.is_none() {
        errors.push(CREATE_NAME);
    }

    let quantity = optional(fields, "quantity", check_quantity, QUANTITY, &mut errors);

    match name {
        Some(name) if errors.is_empty() => Ok(CreateItem { name, quantity }),
        _ => Err(errors),
    }
}

/// Validate a partial update. Every field is optional.
pub fn validate_update(payload: &Value) -> Result<UpdateItem, ValidationErrors> {
    let fields = as_object(payload)?;
    let mut errors = ValidationErrors::new();

    let name = optional(fields, "name", check_name, UPDATE_NAME, &mut errors);
    let quantity = optional(fields, "quantity", check_quantity, QUANTITY, &mut errors);
    let purchased = optional(fields, "purchased", Value::as_bool, PURCHASED, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(UpdateItem {
        name,
        quantity,
        purchased,
    })
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    payload.as_object().ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.push(NOT_AN_OBJECT);
        errors
    })
}

/// Absent is fine; present but rejected by `check` records `message`.
fn optional<T>(
    fields: &Map<String, Value>,
    key: &str,
    check: impl Fn(&Value) -> Option<T>,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    let value = fields.get(key)?;
    let checked = check(value);
    if checked.is_none() {
        errors.push(message);
    }
    checked
}

fn check_name(value: &Value) -> Option<String> {
    let trimmed = value.as_str()?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `-0` is accepted and stored as `0`.
fn check_quantity(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .filter(|quantity| *quantity >= 0.0)
        .map(|quantity| if quantity == 0.0 { 0.0 } else { quantity })
}
