//! # Catch-All Mode
//!
//! One subscription receives every record of every source the hub knows,
//! with each source enabled at the subscription's minimum level.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{collector, received_ids, TICK};
    use relay_bus::{CatchAllBuilder, ContainerBuilder, TraceHub};
    use relay_types::{EmittedEvent, EventLevel, Keywords, Registration};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_catch_all_receives_every_source() -> anyhow::Result<()> {
        let hub = TraceHub::new();
        // Announced before the container exists; enabled on attach.
        hub.announce_source("Early");

        let (consumer, mut rx) = collector();
        let subscription = CatchAllBuilder::new(EventLevel::Warning)
            .id("everything")
            .interval(TICK)
            .consumer(consumer)
            .build()?;
        let container = ContainerBuilder::new().catch_all(subscription).build(&hub)?;
        assert!(container.is_catch_all());

        assert_eq!(
            hub.registration("Early"),
            Some(Registration::new("Early", EventLevel::Warning, Keywords::ALL))
        );

        hub.emit(EmittedEvent::new("Early", 1, "A").with_level(EventLevel::Error));
        hub.emit(EmittedEvent::new("Late", 2, "B").with_level(EventLevel::Warning));
        // Above the minimum level: never reaches the dispatcher.
        hub.emit(EmittedEvent::new("Late", 3, "C").with_level(EventLevel::Verbose));
        hub.emit(EmittedEvent::new("Other", 4, "D").with_level(EventLevel::Critical));

        container.start()?;
        sleep(TICK + Duration::from_millis(10)).await;

        assert_eq!(received_ids(&mut rx), vec![1, 2, 4]);

        let metrics = container.metrics();
        assert_eq!(metrics.sources_discovered, 3);
        assert_eq!(metrics.sources_enabled, 3);
        assert_eq!(metrics.records_enqueued, 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_catch_all_at_log_always_receives_every_level() -> anyhow::Result<()> {
        let hub = TraceHub::new();
        let (consumer, mut rx) = collector();
        let subscription = CatchAllBuilder::new(EventLevel::LogAlways)
            .interval(TICK)
            .consumer(consumer)
            .build()?;
        let container = ContainerBuilder::new().catch_all(subscription).build(&hub)?;

        hub.emit(EmittedEvent::new("S", 1, "A").with_level(EventLevel::Critical));
        hub.emit(EmittedEvent::new("S", 2, "B").with_level(EventLevel::Informational));
        hub.emit(EmittedEvent::new("S", 3, "C").with_level(EventLevel::Verbose));
        hub.emit(EmittedEvent::new("S", 4, "D").with_level(EventLevel::LogAlways));

        container.start()?;
        sleep(TICK + Duration::from_millis(10)).await;

        assert_eq!(received_ids(&mut rx), vec![1, 2, 3, 4]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_catch_all_disposal_frees_hub() -> anyhow::Result<()> {
        let hub = TraceHub::new();
        let (consumer, _rx) = collector();
        let subscription = CatchAllBuilder::new(EventLevel::Verbose)
            .interval(TICK)
            .consumer(consumer)
            .build()?;
        let container = ContainerBuilder::new().catch_all(subscription).build(&hub)?;

        hub.emit(EmittedEvent::new("S", 1, "A"));
        container.dispose();

        assert!(!hub.has_listener());
        assert!(hub.registration("S").is_none());
        assert!(!hub.emit(EmittedEvent::new("S", 2, "B")));
        Ok(())
    }
}
