use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, trace, warn};

/// Broadcast buffer used when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Fan-out with a bounded replay buffer per receiver.
    Broadcast { capacity: usize },
    /// Single latest value.
    Watch,
}

impl ChannelKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Broadcast { .. } => "broadcast",
            Self::Watch => "watch",
        }
    }
}

/// Anything `Send + Sync + 'static` can travel on the bus.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct ChannelState {
    kind: ChannelKind,
    sender: Box<dyn Any + Send + Sync>,
}

impl ChannelState {
    fn sender<S: Clone + 'static, T: Event>(&self, wanted: ChannelKind) -> Result<S, EventBusError> {
        if std::mem::discriminant(&self.kind) != std::mem::discriminant(&wanted) {
            return Err(EventBusError::ChannelKindMismatch {
                message: format!(
                    "{} is registered as {}, not {}",
                    type_name::<T>(),
                    self.kind.label(),
                    wanted.label()
                )
                .into(),
                context: None,
            });
        }
        self.sender.downcast_ref::<S>().cloned().ok_or_else(|| EventBusError::TypeMismatch {
            message: type_name::<T>().into(),
            context: Some("stored sender has a different event type".into()),
        })
    }
}

/// Shared, cloneable event bus. Clones publish into the same channels.
#[derive(Debug, Clone)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, ChannelState>>>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self { channels: Arc::default(), capacity: DEFAULT_CAPACITY }
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus whose broadcast channels buffer `capacity` events per receiver.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, EventBusError> {
        if capacity == 0 {
            return Err(EventBusError::InvalidCapacity {
                message: "capacity must be >= 1".into(),
                context: None,
            });
        }
        Ok(Self { channels: Arc::default(), capacity })
    }

    /// Subscribes to broadcast events of type `T`.
    ///
    /// Only events published after this call are received.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is a watch channel.
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        Ok(self.broadcast_sender::<T>()?.subscribe())
    }

    /// Publishes `event` to every current subscriber and returns how many
    /// received it. No subscribers yields `Ok(0)`.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is a watch channel.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Same as [`EventBus::publish`] for an already shared event.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is a watch channel.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.broadcast_sender::<T>()?;
        let delivered = sender.send(event).unwrap_or_else(|_| {
            trace!(event = type_name::<T>(), "Event dropped: no active subscribers");
            0
        });
        if delivered > 0 {
            trace!(event = type_name::<T>(), delivered, "Event dispatched");
        }
        Ok(delivered)
    }

    /// Subscribes to the latest-value channel for `T`, creating it with
    /// `initial` when absent. An existing value is kept.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is a broadcast channel.
    pub fn subscribe_watch<T: Event>(
        &self,
        initial: T,
    ) -> Result<watch::Receiver<Arc<T>>, EventBusError> {
        Ok(self.watch_sender(Arc::new(initial))?.subscribe())
    }

    /// Replaces the latest value for `T`, creating the channel when absent.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is a broadcast channel.
    pub fn publish_watch<T: Event>(&self, value: T) -> Result<(), EventBusError> {
        let value = Arc::new(value);
        let sender = self.watch_sender(Arc::clone(&value))?;
        sender.send_replace(value);
        trace!(event = type_name::<T>(), receivers = sender.receiver_count(), "Watch value replaced");
        Ok(())
    }

    /// Current value of the watch channel for `T`, if one was ever published.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is a broadcast channel.
    pub fn latest<T: Event>(&self) -> Result<Option<Arc<T>>, EventBusError> {
        let channels = self.channels.read();
        channels
            .get(&TypeId::of::<T>())
            .map(|state| {
                state
                    .sender::<watch::Sender<Arc<T>>, T>(ChannelKind::Watch)
                    .map(|tx| Arc::clone(&tx.borrow()))
            })
            .transpose()
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    /// Drops every channel. Receivers observe closure once their buffers drain.
    /// Returns the number of channels closed.
    pub fn shutdown(&self) -> usize {
        let count = {
            let mut channels = self.channels.write();
            let count = channels.len();
            channels.clear();
            count
        };
        debug!(channels = count, "Event bus shut down");
        count
    }

    fn broadcast_sender<T: Event>(&self) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        let kind = ChannelKind::Broadcast { capacity: self.capacity };
        let id = TypeId::of::<T>();

        if let Some(state) = self.channels.read().get(&id) {
            return state.sender::<broadcast::Sender<Arc<T>>, T>(kind);
        }

        let mut channels = self.channels.write();
        let state = channels.entry(id).or_insert_with(|| {
            trace!(event = type_name::<T>(), capacity = self.capacity, "Initializing broadcast channel");
            let (tx, _) = broadcast::channel::<Arc<T>>(self.capacity);
            ChannelState { kind, sender: Box::new(tx) }
        });
        if let ChannelKind::Broadcast { capacity } = state.kind
            && capacity != self.capacity
        {
            warn!(
                event = type_name::<T>(),
                existing_capacity = capacity,
                requested_capacity = self.capacity,
                "Broadcast channel already initialized with a different capacity"
            );
        }
        state.sender::<broadcast::Sender<Arc<T>>, T>(kind)
    }

    fn watch_sender<T: Event>(&self, initial: Arc<T>) -> Result<watch::Sender<Arc<T>>, EventBusError> {
        let id = TypeId::of::<T>();

        if let Some(state) = self.channels.read().get(&id) {
            return state.sender::<watch::Sender<Arc<T>>, T>(ChannelKind::Watch);
        }

        let mut channels = self.channels.write();
        let state = channels.entry(id).or_insert_with(|| {
            trace!(event = type_name::<T>(), "Initializing watch channel");
            let (tx, _) = watch::channel::<Arc<T>>(initial);
            ChannelState { kind: ChannelKind::Watch, sender: Box::new(tx) }
        });
        state.sender::<watch::Sender<Arc<T>>, T>(ChannelKind::Watch)
    }
}
