//! Shared test fixtures.

use relay_bus::{
    handler_fn, ConsumerError, Notification, NotificationHandler, Subscription,
    SubscriptionBuilder,
};
use relay_types::SourceFilter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Tick interval used by every scenario (the shortest accepted).
pub const TICK: Duration = Duration::from_secs(1);

/// Consumer forwarding every notification to the returned receiver.
pub fn collector() -> (Arc<dyn NotificationHandler>, mpsc::UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let consumer = handler_fn(move |batch: Notification| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(batch);
            Ok::<(), ConsumerError>(())
        }
    });
    (consumer, rx)
}

/// Everything received so far, without waiting.
pub fn received(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

/// Event ids of every received notification, flattened in order.
pub fn received_ids(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<i32> {
    received(rx)
        .iter()
        .flat_map(|batch| batch.iter().map(|record| record.id).collect::<Vec<_>>())
        .collect()
}

/// Subscription ticking every [`TICK`] with a collecting consumer.
pub fn collecting_subscription(
    id: &str,
    filters: Vec<SourceFilter>,
) -> anyhow::Result<(Subscription, mpsc::UnboundedReceiver<Notification>)> {
    let (consumer, rx) = collector();
    let subscription = SubscriptionBuilder::new()
        .id(id)
        .filters(filters)
        .interval(TICK)
        .consumer(consumer)
        .build()?;
    Ok((subscription, rx))
}
