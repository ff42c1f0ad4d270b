//! Realtime sold-item changes
//!
//! A trigger on `sold_items` publishes every row change on the
//! `sold_items_changes` channel. One background task listens on that channel
//! and fans the decoded changes out to WebSocket subscribers.

use std::time::Duration;

use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::broadcast;

use shared::SoldItemChange;

pub const SOLD_ITEMS_CHANNEL: &str = "sold_items_changes";

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

pub type FeedSender = broadcast::Sender<SoldItemChange>;

pub fn feed_channel(capacity: usize) -> FeedSender {
    let (tx, _rx) = broadcast::channel(capacity.max(1));
    tx
}

/// Decode a notification payload written by the trigger
pub fn parse_notification(payload: &str) -> Result<SoldItemChange, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Forward database notifications into `feed` until the process exits
pub fn spawn_listener(db: PgPool, feed: FeedSender) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match listen(&db, &feed).await {
                Ok(()) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Sold items listener failed, reconnecting");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    })
}

async fn listen(db: &PgPool, feed: &FeedSender) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(db).await?;
    listener.listen(SOLD_ITEMS_CHANNEL).await?;
    tracing::info!(channel = SOLD_ITEMS_CHANNEL, "Listening for sold item changes");

    loop {
        let notification = listener.recv().await?;
        match parse_notification(notification.payload()) {
            Ok(change) => {
                tracing::debug!(id = %change.id(), subscribers = feed.receiver_count(), "Sold item change");
                // No subscribers is not an error
                let _ = feed.send(change);
            }
            Err(e) => {
                tracing::warn!(error = %e, payload = notification.payload(), "Ignoring malformed notification");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert_payload() {
        let payload = r#"{"type": "insert", "record": {
            "id": "6f1c1e38-5a4e-4c43-9d7d-9f3f0a1b2c3d",
            "stock_item_id": null,
            "name": "Vaza", "category": "", "description": "Vaza", "unit": "buc",
            "quantity_sold": 2, "sale_price": "40.00", "total_value": "40.00",
            "sold_by": "ana@example.com",
            "sold_date": "2025-07-18T12:30:00.123456+00:00",
            "source": "TikTok",
            "created_at": "2025-07-18T12:30:00.123456+00:00"
        }}"#;
        match parse_notification(payload).unwrap() {
            SoldItemChange::Insert { record } => {
                assert_eq!(record.name, "Vaza");
                assert_eq!(record.quantity_sold, 2);
                assert_eq!(record.source, "TikTok");
                assert!(record.stock_item_id.is_none());
            }
            other => panic!("unexpected change {:?}", other),
        }
    }

    #[test]
    fn test_parse_delete_payload() {
        let payload = r#"{"type": "delete", "id": "6f1c1e38-5a4e-4c43-9d7d-9f3f0a1b2c3d"}"#;
        assert!(matches!(parse_notification(payload), Ok(SoldItemChange::Delete { .. })));
        assert!(parse_notification(r#"{"type": "truncate"}"#).is_err());
    }

    #[tokio::test]
    async fn test_feed_reaches_subscribers() {
        let feed = feed_channel(8);
        let mut rx = feed.subscribe();
        let id = uuid::Uuid::new_v4();
        feed.send(SoldItemChange::Delete { id }).unwrap();
        assert_eq!(rx.recv().await.unwrap().id(), id);
    }
}
