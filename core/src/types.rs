//! Domain DTOs for the cart endpoints.
//!
//! # Design
//! The cart snapshot is owned by the remote service, so `CartSnapshot` keeps
//! the raw JSON and only offers read-only views over the two fields every
//! consumer relies on (`item_count` and the line items). Request payloads are
//! fully typed because this crate is the one producing them.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a purchasable variant, as understood by the cart service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(String);

impl VariantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VariantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for VariantId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Tag naming the cart operation a result or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    Update,
    /// Read-only `GET /cart`.
    Fetch,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Remove => "remove",
            Operation::Update => "update",
            Operation::Fetch => "fetch",
        }
    }

    /// Whether a successful call mutates the server cart.
    pub fn is_mutation(self) -> bool {
        !matches!(self, Operation::Fetch)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the `POST /cart/add` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub id: VariantId,
    pub quantity: NonZeroU32,
}

/// Request payload for `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItems {
    pub items: Vec<AddItem>,
}

/// Request payload for `POST /cart/change`. A quantity of zero removes the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLineItem {
    pub id: VariantId,
    pub quantity: u32,
}

/// Server-defined cart representation, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot(Value);

impl CartSnapshot {
    pub fn from_json(value: Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    /// The `item_count` field, when the service sent one.
    pub fn item_count(&self) -> Option<u64> {
        self.0.get("item_count").and_then(Value::as_u64)
    }

    /// Line items that carry a recognizable variant id and quantity.
    ///
    /// `variant_id` wins over `id` when both are present. Entries missing
    /// either field are skipped.
    pub fn line_items(&self) -> Vec<LineItem> {
        let Some(items) = self.0.get("items").and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let id = item.get("variant_id").or_else(|| item.get("id"))?;
                let variant_id = match id {
                    Value::String(s) => VariantId::new(s.as_str()),
                    Value::Number(n) => VariantId::new(n.to_string()),
                    _ => return None,
                };
                let quantity = item.get("quantity")?.as_u64()?;
                Some(LineItem { variant_id, quantity })
            })
            .collect()
    }

    /// Quantity of `variant` in this snapshot, zero when absent.
    pub fn quantity_of(&self, variant: &VariantId) -> u64 {
        self.line_items()
            .into_iter()
            .filter(|line| &line.variant_id == variant)
            .map(|line| line.quantity)
            .sum()
    }
}

impl PartialEq<Value> for CartSnapshot {
    fn eq(&self, other: &Value) -> bool {
        &self.0 == other
    }
}

/// Read-only view of one snapshot line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub variant_id: VariantId,
    pub quantity: u64,
}
