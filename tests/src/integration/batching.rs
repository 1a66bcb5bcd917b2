//! # Batching and Buffering
//!
//! ## Flows Tested:
//!
//! 1. **Batch cap**: 25 buffered records with a cap of 10 arrive as 10, 10, 5
//!    on consecutive ticks, in order, then empty ticks follow
//! 2. **Overflow**: a capacity-5 buffer offered 8 records keeps the first 5
//! 3. **Previous execution**: absent on the first tick, present afterwards

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{collector, received, TICK};
    use relay_bus::{ContainerBuilder, Notification, SubscriptionBuilder, TraceHub};
    use relay_types::{EmittedEvent, SourceFilter};
    use std::time::Duration;
    use tokio::time::sleep;

    const SLACK: Duration = Duration::from_millis(10);

    #[tokio::test(start_paused = true)]
    async fn test_batches_capped_and_ordered() -> anyhow::Result<()> {
        let hub = TraceHub::new();
        let (consumer, mut rx) = collector();
        let subscription = SubscriptionBuilder::new()
            .id("capped")
            .filter(SourceFilter::all_informational("Orders"))
            .interval(TICK)
            .max_batch_size(10)
            .consumer(consumer)
            .build()?;
        let container = ContainerBuilder::new().subscription(subscription).build(&hub)?;

        for id in 0..25 {
            hub.emit(EmittedEvent::new("Orders", id, "Placed"));
        }

        container.start()?;
        sleep(TICK * 3 + SLACK).await;

        let batches = received(&mut rx);
        let sizes: Vec<usize> = batches.iter().map(Notification::len).collect();
        let remaining: Vec<usize> = batches.iter().map(|b| b.remaining).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(remaining, vec![15, 5, 0]);

        let ids: Vec<i32> = batches
            .iter()
            .flat_map(|b| b.iter().map(|r| r.id).collect::<Vec<_>>())
            .collect();
        assert_eq!(ids, (0..25).collect::<Vec<_>>());

        // The consumer keeps being called with empty batches.
        sleep(TICK).await;
        let empty = received(&mut rx);
        assert_eq!(empty.len(), 1);
        assert!(empty[0].is_empty());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_keeps_oldest_records() -> anyhow::Result<()> {
        let hub = TraceHub::new();
        let (consumer, mut rx) = collector();
        let subscription = SubscriptionBuilder::new()
            .id("small")
            .filter(SourceFilter::all_informational("Burst"))
            .interval(TICK)
            .buffer_capacity(5)
            .consumer(consumer)
            .build()?;
        let container = ContainerBuilder::new().subscription(subscription).build(&hub)?;

        for id in 0..8 {
            hub.emit(EmittedEvent::new("Burst", id, "Spike"));
        }
        assert_eq!(container.metrics().dropped_full, 3);
        assert_eq!(container.get("small").map(|h| h.buffer().dropped()), Some(3));

        container.start()?;
        sleep(TICK + SLACK).await;

        let batches = received(&mut rx);
        let ids: Vec<i32> = batches[0].iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_previous_execution_tracking() -> anyhow::Result<()> {
        let hub = TraceHub::new();
        let (consumer, mut rx) = collector();
        let subscription = SubscriptionBuilder::new()
            .filter(SourceFilter::all_errors("Any"))
            .interval(TICK)
            .consumer(consumer)
            .build()?;
        let container = ContainerBuilder::new().subscription(subscription).build(&hub)?;

        container.start()?;
        sleep(TICK * 2 + SLACK).await;

        let batches = received(&mut rx);
        assert_eq!(batches.len(), 2);
        assert!(batches[0].previous_execution.is_none());
        assert!(batches[1].previous_execution.is_some());
        Ok(())
    }
}
