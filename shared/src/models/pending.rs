//! Pending ("în așteptare") models
//!
//! A pending row tracks a unit opened for piece-by-piece sale. Only the total
//! and the pieces sold so far are stored; the remaining count is derived.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pieces of an opened unit still to be sold
pub fn remaining_pieces(qty_total: i32, qty_sold: i32) -> i32 {
    qty_total - qty_sold
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingItem {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub description: String,
    pub unit: String,
    pub qty_total: i32,
    pub qty_sold: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl PendingItem {
    /// Pieces still to be sold
    pub fn qty_pending(&self) -> i32 {
        remaining_pieces(self.qty_total, self.qty_sold)
    }

    pub fn is_fully_sold(&self) -> bool {
        self.qty_sold >= self.qty_total
    }
}

/// Pending row as returned to clients, with the derived remaining count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingItemView {
    #[serde(flatten)]
    pub item: PendingItem,
    pub qty_pending: i32,
}

impl From<PendingItem> for PendingItemView {
    fn from(item: PendingItem) -> Self {
        let qty_pending = item.qty_pending();
        Self { item, qty_pending }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPendingItem {
    pub stock_item_id: Uuid,
    pub description: String,
    pub unit: String,
    pub qty_total: i32,
    pub qty_sold: i32,
    pub comment: String,
}
