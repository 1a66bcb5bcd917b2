//! # Routing Through the Hub
//!
//! Records emitted on a [`TraceHub`] reach exactly the subscriptions whose
//! filters match on source name and event id.
//!
//! ## Flows Tested:
//!
//! 1. **Wildcard + exact**: both subscriptions get the exact id, only the
//!    wildcard gets other ids, unknown sources go nowhere
//! 2. **Level fan-in**: the source is enabled at the broadest level asked for,
//!    and every matching subscription receives what that admits
//! 3. **Catalog sources**: filters built from a named source share its
//!    keyword mask, so records tagged outside it never leave the hub
//! 4. **Concurrent producers**: every record lands exactly once per match

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{collecting_subscription, received, received_ids, TICK};
    use relay_bus::{ContainerBuilder, TraceHub};
    use relay_types::{EmittedEvent, EventLevel, Keywords, SourceCatalog, SourceFilter};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_wildcard_and_exact_subscriptions() -> anyhow::Result<()> {
        let hub = TraceHub::new();
        let (wild, mut wild_rx) =
            collecting_subscription("wild", vec![SourceFilter::all_informational("A")])?;
        let (five, mut five_rx) = collecting_subscription(
            "five",
            vec![SourceFilter::exact("A", 5, EventLevel::Informational)],
        )?;
        let container = ContainerBuilder::new()
            .subscription(wild)
            .subscription(five)
            .build(&hub)?;

        assert!(hub.emit(EmittedEvent::new("A", 5, "Five")));
        assert!(hub.emit(EmittedEvent::new("A", 6, "Six")));
        assert!(!hub.emit(EmittedEvent::new("B", 5, "Elsewhere")));

        container.start()?;
        sleep(TICK + Duration::from_millis(10)).await;

        assert_eq!(received_ids(&mut wild_rx), vec![5, 6]);
        assert_eq!(received_ids(&mut five_rx), vec![5]);

        let metrics = container.metrics();
        assert_eq!(metrics.records_received, 2);
        assert_eq!(metrics.records_enqueued, 3);
        assert_eq!(metrics.sources_discovered, 2);
        assert_eq!(metrics.sources_enabled, 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_level_fan_in_across_subscriptions() -> anyhow::Result<()> {
        let hub = TraceHub::new();
        let (errors, mut errors_rx) =
            collecting_subscription("errors", vec![SourceFilter::all_errors("Db")])?;
        let (verbose, mut verbose_rx) =
            collecting_subscription("verbose", vec![SourceFilter::all_verbose("Db")])?;
        let container = ContainerBuilder::new()
            .subscription(errors)
            .subscription(verbose)
            .build(&hub)?;

        let registration = hub.announce_source("Db").expect("source enabled");
        assert_eq!(registration.level, EventLevel::Verbose);

        hub.emit(EmittedEvent::new("Db", 1, "Query").with_level(EventLevel::Verbose));
        hub.emit(EmittedEvent::new("Db", 2, "Failure").with_level(EventLevel::Error));

        container.start()?;
        sleep(TICK + Duration::from_millis(10)).await;

        // The error-level subscriber also sees the verbose record.
        assert_eq!(received_ids(&mut errors_rx), vec![1, 2]);
        assert_eq!(received_ids(&mut verbose_rx), vec![1, 2]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_source_filters() -> anyhow::Result<()> {
        const CACHE: SourceCatalog = SourceCatalog::new("cache", Keywords(0x8));

        let hub = TraceHub::new();
        let (sub, mut rx) = collecting_subscription(
            "cache",
            vec![CACHE.all_warnings(), CACHE.event(30, EventLevel::Verbose)],
        )?;
        let container = ContainerBuilder::new().subscription(sub).build(&hub)?;

        let registration = hub.announce_source("cache").expect("source enabled");
        assert_eq!(registration.level, EventLevel::Verbose);
        assert_eq!(registration.keywords, CACHE.keywords());

        hub.emit(
            EmittedEvent::new("cache", 30, "Evicted")
                .with_level(EventLevel::Verbose)
                .with_keywords(Keywords(0x8)),
        );
        // Tagged with a keyword the catalog does not enable.
        hub.emit(
            EmittedEvent::new("cache", 31, "Other")
                .with_level(EventLevel::Warning)
                .with_keywords(Keywords(0x1)),
        );
        hub.emit(EmittedEvent::new("cache", 32, "Miss").with_level(EventLevel::Warning));

        container.start()?;
        sleep(TICK + Duration::from_millis(10)).await;

        assert_eq!(received_ids(&mut rx), vec![30, 32]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_carry_registration_and_payload() -> anyhow::Result<()> {
        let hub = TraceHub::new();
        let (sub, mut rx) = collecting_subscription("s", vec![SourceFilter::all_warnings("Api")])?;
        let container = ContainerBuilder::new().subscription(sub).build(&hub)?;

        hub.emit(
            EmittedEvent::new("Api", 42, "RequestFailed")
                .with_level(EventLevel::Warning)
                .with_message("upstream timed out")
                .with_field("status", 504)
                .with_field("route", "/orders"),
        );

        container.start()?;
        sleep(TICK + Duration::from_millis(10)).await;

        let batches = received(&mut rx);
        let record = batches[0].iter().next().expect("one record");
        assert_eq!(record.name, "RequestFailed");
        assert_eq!(record.message.as_deref(), Some("upstream timed out"));
        assert_eq!(record.field("status"), Some(&serde_json::json!(504)));
        assert_eq!(record.registration.level, EventLevel::Warning);
        assert!(record.listened_at >= record.created_at);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_producers() -> anyhow::Result<()> {
        let hub = TraceHub::new();
        let (a, _a_rx) = collecting_subscription("a", vec![SourceFilter::all_verbose("P")])?;
        let (b, _b_rx) = collecting_subscription(
            "b",
            vec![SourceFilter::exact("P", 0, EventLevel::Verbose)],
        )?;
        let container = Arc::new(
            ContainerBuilder::new()
                .subscription(a)
                .subscription(b)
                .build(&hub)?,
        );

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let hub = hub.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        hub.emit(EmittedEvent::new("P", i % 2, "Work"));
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().map_err(|_| anyhow::anyhow!("producer panicked"))?;
        }

        assert_eq!(container.get("a").map(|h| h.buffer().len()), Some(400));
        assert_eq!(container.get("b").map(|h| h.buffer().len()), Some(200));
        assert_eq!(container.metrics().records_enqueued, 600);
        assert_eq!(hub.events_forwarded(), 400);
        Ok(())
    }
}
