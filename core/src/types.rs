//! Domain types for the shopping-list API.
//!
//! # Design
//! `Item` is the stored record and the wire shape at the same time; field
//! names are camelCase on the wire. `CreateItem` and `UpdateItem` are only
//! ever produced by the validator, never deserialized straight from request
//! bodies, so a value of either type has already passed every field rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A single shopping-list entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub purchased: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated payload for creating an item. `name` is already trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateItem {
    pub name: String,
    pub quantity: Option<f64>,
}

/// Validated partial update. Only the fields that are `Some` are applied;
/// the rest of the stored record stays as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub purchased: Option<bool>,
}

/// Uniform JSON wrapper used by every response that carries a body.
///
/// Unset fields are left out of the serialized form, so a list response
/// looks like `{"success":true,"data":[...],"count":2}` and a validation
/// failure like `{"success":false,"message":"...","errors":[...]}`. `data`
/// is serialized straight from its typed value, so items keep their field
/// order on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T = Value> {
    #[serde(default)]
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Envelope {
    pub fn ok() -> Self {
        Self::with_success(true)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::with_success(false).with_message(message)
    }

    fn with_success(success: bool) -> Self {
        Self {
            success,
            message: None,
            data: None,
            count: None,
            errors: None,
            timestamp: None,
        }
    }
}

impl<T> Envelope<T> {
    pub fn with_data<U>(self, data: U) -> Envelope<U> {
        Envelope {
            success: self.success,
            message: self.message,
            data: Some(data),
            count: self.count,
            errors: self.errors,
            timestamp: self.timestamp,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
