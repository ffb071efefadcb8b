//! Change Notification
//!
//! Field-level publish/subscribe for the entity tree. Every setter on a
//! [`Workflow`](super::Workflow), [`Task`](super::Task) or
//! [`Step`](super::Step) emits a [`ChangeEvent`] through the node's
//! [`Notifier`] before it returns.
//!
//! A notifier is a shared handle: attaching a child to a parent hands the
//! parent's notifier to the whole subtree, so a single subscription on the
//! root store observes every node.

use std::fmt;
use std::sync::{Arc, RwLock};

use super::model::NodeId;

/// An observable field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Name,
    Url,
    Progress,
    IsCompleted,
}

impl Property {
    /// The field's key in the persisted document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Url => "url",
            Self::Progress => "progress",
            Self::IsCompleted => "isCompleted",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value a field was just set to.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

/// A single field write.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChanged {
    pub node: NodeId,
    pub property: Property,
    pub value: PropertyValue,
}

/// Anything a subscriber can be told about.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// A field on `node` was written.
    Property(PropertyChanged),
    /// The child sequence of `parent` changed; `None` is the root collection.
    ChildrenChanged { parent: Option<NodeId> },
}

type Subscriber = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Cloneable handle to a shared list of subscribers.
#[derive(Clone, Default)]
pub struct Notifier {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked synchronously for every event.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.push(Arc::new(callback));
    }

    /// Delivers `event` to every subscriber before returning.
    pub fn emit(&self, event: ChangeEvent) {
        // Snapshot so a callback may subscribe without deadlocking.
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        for subscriber in subscribers {
            subscriber(&event);
        }
    }

    pub(crate) fn property(&self, node: NodeId, property: Property, value: PropertyValue) {
        self.emit(ChangeEvent::Property(PropertyChanged {
            node,
            property,
            value,
        }));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// True if both handles share the same subscriber list.
    pub fn same_channel(&self, other: &Notifier) -> bool {
        Arc::ptr_eq(&self.subscribers, &other.subscribers)
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
