//! # Builders
//!
//! Fluent construction of subscriptions and of the container that runs
//! them. All validation happens here, once; the runtime types assume valid
//! input.
//!
//! ```ignore
//! let hub = TraceHub::new();
//! let errors = SubscriptionBuilder::new()
//!     .id("errors")
//!     .filter(SourceFilter::all_errors("Payments"))
//!     .interval(Duration::from_secs(5))
//!     .consumer(handler_fn(|batch: Notification| async move {
//!         println!("{} errors", batch.len());
//!         Ok(())
//!     }))
//!     .build()?;
//!
//! let container = ContainerBuilder::new().subscription(errors).build(&hub)?;
//! container.start()?;
//! ```

use crate::buffer::SubscriptionBuffer;
use crate::config::{ExecutionConfig, SubscriptionOptions};
use crate::container::SubscriptionContainer;
use crate::dispatcher::{DispatchTarget, Dispatcher};
use crate::error::BuildError;
use crate::handler::NotificationHandler;
use crate::hub::TraceHub;
use crate::scheduler::SubscriptionHandler;
use relay_types::{ConfigError, EventLevel, SourceFilter};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// A validated filtered subscription.
#[derive(Clone)]
pub struct Subscription {
    pub id: String,
    pub filters: Vec<SourceFilter>,
    pub execution: ExecutionConfig,
    pub options: SubscriptionOptions,
    pub consumer: Arc<dyn NotificationHandler>,
}

impl Subscription {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::EmptySubscriptionId);
        }
        if self.filters.is_empty() {
            return Err(ConfigError::NoFilters {
                subscription: self.id.clone(),
            });
        }
        for filter in &self.filters {
            filter.validate()?;
        }
        self.execution.validate()?;
        self.options.validate()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("filters", &self.filters)
            .field("execution", &self.execution)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A validated catch-all subscription: every source, one minimum level.
#[derive(Clone)]
pub struct CatchAllSubscription {
    pub id: String,
    pub minimum_level: EventLevel,
    pub execution: ExecutionConfig,
    pub options: SubscriptionOptions,
    pub consumer: Arc<dyn NotificationHandler>,
}

impl CatchAllSubscription {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::EmptySubscriptionId);
        }
        self.execution.validate()?;
        self.options.validate()
    }
}

impl std::fmt::Debug for CatchAllSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatchAllSubscription")
            .field("id", &self.id)
            .field("minimum_level", &self.minimum_level)
            .field("execution", &self.execution)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

type Resolved = (
    String,
    ExecutionConfig,
    SubscriptionOptions,
    Arc<dyn NotificationHandler>,
);

/// Settings shared by both subscription builders.
#[derive(Default)]
struct Common {
    id: Option<String>,
    execution: ExecutionConfig,
    options: SubscriptionOptions,
    consumer: Option<Arc<dyn NotificationHandler>>,
}

impl Common {
    /// Resolve the id (random UUID when unset) and the consumer.
    fn finish(self) -> Result<Resolved, ConfigError> {
        let id = self.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        if id.is_empty() {
            return Err(ConfigError::EmptySubscriptionId);
        }
        let consumer = self
            .consumer
            .ok_or_else(|| ConfigError::MissingConsumer {
                subscription: id.clone(),
            })?;
        Ok((id, self.execution, self.options, consumer))
    }
}

/// Builder for [`Subscription`].
#[derive(Default)]
pub struct SubscriptionBuilder {
    common: Common,
    filters: Vec<SourceFilter>,
}

impl SubscriptionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscription id. A random UUID is used when unset.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.common.id = Some(id.into());
        self
    }

    pub fn filter(mut self, filter: SourceFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = SourceFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.common.execution.interval = interval;
        self
    }

    pub fn max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.common.execution.max_batch_size = max_batch_size;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.common.options.buffer_capacity = capacity;
        self
    }

    pub fn consumer(mut self, consumer: Arc<dyn NotificationHandler>) -> Self {
        self.common.consumer = Some(consumer);
        self
    }

    pub fn build(self) -> Result<Subscription, ConfigError> {
        let (id, execution, options, consumer) = self.common.finish()?;
        let subscription = Subscription {
            id,
            filters: self.filters,
            execution,
            options,
            consumer,
        };
        subscription.validate()?;
        Ok(subscription)
    }
}

/// Builder for [`CatchAllSubscription`].
pub struct CatchAllBuilder {
    common: Common,
    minimum_level: EventLevel,
}

impl CatchAllBuilder {
    /// Every discovered source is enabled at `minimum_level`.
    /// `EventLevel::LogAlways` enables every level.
    pub fn new(minimum_level: EventLevel) -> Self {
        Self {
            common: Common::default(),
            minimum_level,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.common.id = Some(id.into());
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.common.execution.interval = interval;
        self
    }

    pub fn max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.common.execution.max_batch_size = max_batch_size;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.common.options.buffer_capacity = capacity;
        self
    }

    pub fn consumer(mut self, consumer: Arc<dyn NotificationHandler>) -> Self {
        self.common.consumer = Some(consumer);
        self
    }

    pub fn build(self) -> Result<CatchAllSubscription, ConfigError> {
        let (id, execution, options, consumer) = self.common.finish()?;
        let subscription = CatchAllSubscription {
            id,
            minimum_level: self.minimum_level,
            execution,
            options,
            consumer,
        };
        subscription.validate()?;
        Ok(subscription)
    }
}

/// Builder for [`SubscriptionContainer`].
///
/// A container is either filtered (any number of [`Subscription`]s) or
/// catch-all (exactly one [`CatchAllSubscription`]).
#[derive(Default)]
pub struct ContainerBuilder {
    subscriptions: Vec<Subscription>,
    catch_all: Vec<CatchAllSubscription>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    pub fn catch_all(mut self, subscription: CatchAllSubscription) -> Self {
        self.catch_all.push(subscription);
        self
    }

    /// Validate, build the routing tables once and attach the dispatcher
    /// to `hub`.
    ///
    /// Fails with [`HubError::ListenerActive`](crate::HubError::ListenerActive)
    /// while another container is attached to the same hub.
    pub fn build(self, hub: &TraceHub) -> Result<SubscriptionContainer, BuildError> {
        let Self {
            subscriptions,
            mut catch_all,
        } = self;

        if catch_all.len() > 1 {
            return Err(BuildError::MultipleCatchAll);
        }

        let (handlers, dispatcher) = match (subscriptions.is_empty(), catch_all.pop()) {
            (true, None) => return Err(BuildError::NoSubscriptions),
            (false, Some(_)) => return Err(BuildError::ConflictingModes),
            (false, None) => Self::filtered(subscriptions)?,
            (true, Some(subscription)) => Self::catch_all_mode(subscription)?,
        };

        let dispatcher = Arc::new(dispatcher);
        hub.attach(dispatcher.clone())?;

        info!(
            subscriptions = handlers.len(),
            catch_all = dispatcher.is_catch_all(),
            "Subscription container built"
        );
        Ok(SubscriptionContainer::new(handlers, dispatcher, hub.clone()))
    }

    fn filtered(
        subscriptions: Vec<Subscription>,
    ) -> Result<(BTreeMap<String, SubscriptionHandler>, Dispatcher), BuildError> {
        let mut handlers = BTreeMap::new();
        let mut targets = Vec::with_capacity(subscriptions.len());

        for subscription in subscriptions {
            subscription.validate()?;
            if handlers.contains_key(&subscription.id) {
                return Err(BuildError::DuplicateSubscriptionId(subscription.id));
            }

            let buffer = Arc::new(SubscriptionBuffer::new(subscription.options.buffer_capacity));
            let handler = SubscriptionHandler::new(
                subscription.id.clone(),
                subscription.execution,
                buffer.clone(),
                subscription.consumer,
            );
            handlers.insert(subscription.id.clone(), handler);
            targets.push(DispatchTarget {
                id: subscription.id,
                buffer,
                filters: subscription.filters,
            });
        }

        Ok((handlers, Dispatcher::filtered(targets)))
    }

    fn catch_all_mode(
        subscription: CatchAllSubscription,
    ) -> Result<(BTreeMap<String, SubscriptionHandler>, Dispatcher), BuildError> {
        subscription.validate()?;

        let buffer = Arc::new(SubscriptionBuffer::new(subscription.options.buffer_capacity));
        let handler = SubscriptionHandler::new(
            subscription.id.clone(),
            subscription.execution,
            buffer.clone(),
            subscription.consumer,
        );
        let dispatcher =
            Dispatcher::catch_all(subscription.id.clone(), buffer, subscription.minimum_level);

        let mut handlers = BTreeMap::new();
        handlers.insert(subscription.id, handler);
        Ok((handlers, dispatcher))
    }
}
