//! Realtime sold-item feed
//!
//! Row changes on `sold_items` are pushed to subscribers as [`SoldItemChange`]
//! messages. Clients keep a local list up to date with [`apply_change`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SoldItem;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SoldItemChange {
    Insert { record: SoldItem },
    Update { record: SoldItem },
    Delete { id: Uuid },
}

impl SoldItemChange {
    pub fn id(&self) -> Uuid {
        match self {
            SoldItemChange::Insert { record } | SoldItemChange::Update { record } => record.id,
            SoldItemChange::Delete { id } => *id,
        }
    }
}

/// Apply a change to a newest-first list.
///
/// Inserts and updates replace the row with the same id in place when one is
/// present and are prepended otherwise. Deletes drop the row.
pub fn apply_change(items: &mut Vec<SoldItem>, change: SoldItemChange) {
    match change {
        SoldItemChange::Delete { id } => items.retain(|item| item.id != id),
        SoldItemChange::Insert { record } | SoldItemChange::Update { record } => {
            match items.iter_mut().find(|item| item.id == record.id) {
                Some(existing) => *existing = record,
                None => items.insert(0, record),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn sold(name: &str) -> SoldItem {
        SoldItem {
            id: Uuid::new_v4(),
            stock_item_id: Some(Uuid::new_v4()),
            name: name.to_string(),
            category: String::new(),
            description: name.to_string(),
            unit: "buc".to_string(),
            quantity_sold: 1,
            sale_price: Decimal::from(20),
            total_value: Decimal::from(20),
            sold_by: "ana@example.com".to_string(),
            sold_date: Utc::now(),
            source: "Instagram".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_prepends() {
        let first = sold("Cana");
        let mut items = vec![first.clone()];
        let second = sold("Farfurie");
        apply_change(&mut items, SoldItemChange::Insert { record: second.clone() });
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, second.id);
        assert_eq!(items[1].id, first.id);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let a = sold("Cana");
        let b = sold("Farfurie");
        let mut items = vec![a.clone(), b.clone()];
        let mut changed = b.clone();
        changed.total_value = Decimal::from(25);
        apply_change(&mut items, SoldItemChange::Update { record: changed });
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].total_value, Decimal::from(25));
    }

    #[test]
    fn test_delete_removes() {
        let a = sold("Cana");
        let mut items = vec![a.clone()];
        apply_change(&mut items, SoldItemChange::Delete { id: a.id });
        assert!(items.is_empty());
    }

    #[test]
    fn test_change_wire_format() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(SoldItemChange::Delete { id }).unwrap();
        assert_eq!(json["type"], "delete");
        assert_eq!(json["id"], id.to_string());
    }
}
