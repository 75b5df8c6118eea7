//! In-memory item store.
//!
//! # Design
//! `ItemRepository` is the only owner of item state. It keeps items in a
//! `Vec` so listing preserves insertion order; lookups are linear, which is
//! fine for a shopping list. Ids are random UUID v4 values and collisions
//! are not checked. Nothing is persisted: dropping the repository drops
//! every item.

use chrono::{DateTime, Duration, Utc};
use log::debug;
use uuid::Uuid;

use crate::types::{CreateItem, Item, UpdateItem};

const DEFAULT_QUANTITY: f64 = 1.0;

#[derive(Debug, Default)]
pub struct ItemRepository {
    items: Vec<Item>,
}

impl ItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_all(&self) -> &[Item] {
        &self.items
    }

    pub fn get_by_id(&self, id: &Uuid) -> Option<&Item> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Store a new item with defaults applied and return a copy of it.
    pub fn create(&mut self, input: CreateItem) -> Item {
        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            quantity: input.quantity.unwrap_or(DEFAULT_QUANTITY),
            purchased: false,
            created_at: now,
            updated_at: now,
        };
        debug!("created item {}", item.id);
        self.items.push(item.clone());
        item
    }

    /// Merge the provided fields over the stored item. Returns `None` when
    /// no item has `id`.
    pub fn update(&mut self, id: &Uuid, changes: UpdateItem) -> Option<Item> {
        let slot = self.items.iter_mut().find(|item| item.id == *id)?;

        let updated = Item {
            name: changes
                .name
                .map(|name| name.trim().to_string())
                .unwrap_or_else(|| slot.name.clone()),
            quantity: changes.quantity.unwrap_or(slot.quantity),
            purchased: changes.purchased.unwrap_or(slot.purchased),
            updated_at: next_stamp(slot.updated_at),
            ..slot.clone()
        };
        *slot = updated.clone();
        debug!("updated item {id}");
        Some(updated)
    }

    /// Remove the item with `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: &Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != *id);
        let removed = self.items.len() < before;
        if removed {
            debug!("deleted item {id}");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// `updatedAt` must move forward even when the clock has not ticked since
/// the previous stamp.
fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
