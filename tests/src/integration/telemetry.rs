//! # Telemetry Around a Running Relay
//!
//! Installs the global subscriber once for this test binary and runs a
//! relay under it, so every log statement on the hot path and in the
//! scheduler is exercised with a live subscriber.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{collecting_subscription, received_ids, TICK};
    use relay_bus::{ContainerBuilder, TraceHub};
    use relay_telemetry::{init_logging, TelemetryConfig, TelemetryError};
    use relay_types::{EmittedEvent, EventLevel, SourceFilter};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_relay_runs_under_trace_logging() -> anyhow::Result<()> {
        let config = TelemetryConfig::from_lookup(|key| match key {
            "RELAY_SERVICE_NAME" => Some("relay-tests".to_string()),
            "RELAY_LOG_LEVEL" => Some("relay_bus=trace,warn".to_string()),
            "RELAY_JSON_LOGS" => Some("true".to_string()),
            _ => None,
        });
        assert_eq!(config.service_name, "relay-tests");
        assert!(config.json_logs);

        let guard = match init_logging(&config) {
            Ok(guard) => Some(guard),
            // Another test in this binary got there first.
            Err(TelemetryError::AlreadyInitialized(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let hub = TraceHub::new();
        let (sub, mut rx) = collecting_subscription("logged", vec![SourceFilter::all_verbose("L")])?;
        let container = ContainerBuilder::new()
            .subscription(sub)
            .build(&hub)?;

        hub.emit(EmittedEvent::new("L", 1, "Traced").with_level(EventLevel::Verbose));
        container.start()?;
        sleep(TICK + Duration::from_millis(10)).await;
        assert_eq!(received_ids(&mut rx), vec![1]);

        container.dispose();
        drop(guard);
        Ok(())
    }
}
