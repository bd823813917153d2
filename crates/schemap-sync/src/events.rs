//! Notification envelope, mapping event payloads and sinks.
//!
//! Payload field names are consumed by downstream catalog and UI components
//! and must not change.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use schemap_model::{ChangeType, FieldMapping, MappingType, SchemaChange};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::PublishError;

/// Event type emitted after a full generation pass.
pub const MAPPING_GENERATED: &str = "schema.mapping.generated";
/// Event type emitted after an incremental update.
pub const MAPPING_UPDATED: &str = "schema.mapping.updated";
/// Topic mapping events are published on unless configured otherwise.
pub const DEFAULT_TOPIC: &str = "mapping.events";

/// Envelope wrapping every published payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub event_type: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    /// Identifier of the publishing agent.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl Message {
    pub fn new(
        event_type: impl Into<String>,
        payload: serde_json::Value,
        source: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            timestamp: Utc::now(),
            source: source.into(),
            correlation_id: None,
        }
    }

    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One mapping as reported in a [`MAPPING_GENERATED`] payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSummary {
    pub source_field: String,
    pub target_field: String,
    pub confidence: f64,
    pub mapping_type: MappingType,
    pub has_transformation: bool,
}

impl From<&FieldMapping> for MappingSummary {
    fn from(mapping: &FieldMapping) -> Self {
        Self {
            source_field: mapping.source_field.clone(),
            target_field: mapping.target_field.clone(),
            confidence: mapping.confidence,
            mapping_type: mapping.mapping_type,
            has_transformation: mapping.has_transformation(),
        }
    }
}

/// Payload of [`MAPPING_GENERATED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingGeneratedEvent {
    pub source_id: String,
    pub target_id: String,
    pub mapping_count: usize,
    pub mappings: Vec<MappingSummary>,
}

impl MappingGeneratedEvent {
    pub fn new(source_id: &str, target_id: &str, mappings: &[FieldMapping]) -> Self {
        Self {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            mapping_count: mappings.len(),
            mappings: mappings.iter().map(MappingSummary::from).collect(),
        }
    }
}

/// One change as reported in a [`MAPPING_UPDATED`] payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub change_type: ChangeType,
    pub field_name: String,
}

/// Payload of [`MAPPING_UPDATED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingUpdatedEvent {
    pub source_id: String,
    pub target_id: String,
    pub change_count: usize,
    pub mapping_count: usize,
    pub changes: Vec<ChangeSummary>,
}

impl MappingUpdatedEvent {
    pub fn new(
        source_id: &str,
        target_id: &str,
        changes: &[SchemaChange],
        mappings: &[FieldMapping],
    ) -> Self {
        Self {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            change_count: changes.len(),
            mapping_count: mappings.len(),
            changes: changes
                .iter()
                .map(|c| ChangeSummary {
                    change_type: c.change_type,
                    field_name: c.field_name.clone(),
                })
                .collect(),
        }
    }
}

/// Destination for mapping notifications.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, topic: &str, message: &Message) -> Result<(), PublishError>;
}

type Handler = Arc<dyn Fn(&Message) + Send + Sync>;

/// Synchronous in-process bus.
///
/// Every subscriber of a topic receives every message published to it, in
/// subscription order. Publishing to a topic nobody listens on is a no-op,
/// and so is every publish after [`InMemoryBus::close`].
#[derive(Default)]
pub struct InMemoryBus {
    subscribers: RwLock<BTreeMap<String, Vec<Handler>>>,
    closed: AtomicBool,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: impl Into<String>, handler: impl Fn(&Message) + Send + Sync + 'static) {
        let topic = topic.into();
        debug!(%topic, "subscribed");
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Drops every subscriber of `topic`.
    pub fn unsubscribe(&self, topic: &str) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(topic);
    }

    /// Drops all subscribers. Later publishes deliver nothing.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl NotificationSink for InMemoryBus {
    fn publish(&self, topic: &str, message: &Message) -> Result<(), PublishError> {
        if self.is_closed() {
            debug!(topic, event_type = %message.event_type, "bus closed; message dropped");
            return Ok(());
        }
        // Handlers run outside the lock so they may publish or subscribe.
        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
            .unwrap_or_default();
        trace!(topic, event_type = %message.event_type, subscribers = handlers.len(), "publishing");
        for handler in handlers {
            handler(message);
        }
        Ok(())
    }
}

impl fmt::Debug for InMemoryBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBus")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
