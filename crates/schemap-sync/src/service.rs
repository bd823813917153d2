//! Stateful mapping service: generation and incremental updates with a
//! shared mapping cache and event publication.

use std::fmt;
use std::sync::Arc;

use schemap_map::{MappingGenerator, MatchingOptions, TransformationSynthesizer};
use schemap_model::{FieldMapping, MappingKey, Schema, SchemaChange, TransformationLogic};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::error::SyncError;
use crate::events::{
    DEFAULT_TOPIC, MAPPING_GENERATED, MAPPING_UPDATED, MappingGeneratedEvent, MappingUpdatedEvent,
    Message, NotificationSink,
};
use crate::store::{InMemoryStore, MappingStore};
use crate::update::IncrementalMappingUpdater;

/// Service identity, event topic and matching thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Publisher id stamped on every message. Generated when absent.
    pub agent_id: Option<String>,
    pub topic: String,
    pub matching: MatchingOptions,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            agent_id: None,
            topic: DEFAULT_TOPIC.to_string(),
            matching: MatchingOptions::default(),
        }
    }
}

/// `schema-mapping-` followed by 8 hex digits from a random UUID.
pub fn default_agent_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("schema-mapping-{}", &id[..8])
}

/// Generates and maintains mapping sets, caching them per schema pair and
/// publishing a notification after each change.
///
/// The cache is written before the notification is published, so a failed
/// publish still leaves the new mapping set in place.
pub struct MappingService {
    agent_id: String,
    topic: String,
    generator: MappingGenerator,
    updater: IncrementalMappingUpdater,
    synthesizer: TransformationSynthesizer,
    mappings: Arc<MappingStore>,
    sink: Arc<dyn NotificationSink>,
}

impl MappingService {
    pub fn new(
        config: ServiceConfig,
        mappings: Arc<MappingStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let agent_id = config.agent_id.unwrap_or_else(default_agent_id);
        info!(%agent_id, topic = %config.topic, "mapping service ready");
        Self {
            agent_id,
            topic: config.topic,
            generator: MappingGenerator::new(config.matching),
            updater: IncrementalMappingUpdater::new(config.matching),
            synthesizer: TransformationSynthesizer::new(),
            mappings,
            sink,
        }
    }

    /// Service with a private in-memory mapping cache.
    pub fn with_sink(config: ServiceConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryStore::<MappingKey, Vec<FieldMapping>>::new()),
            sink,
        )
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn options(&self) -> &MatchingOptions {
        self.generator.options()
    }

    /// Generates a fresh mapping set, replacing any cached set for the pair,
    /// and publishes `schema.mapping.generated`.
    pub fn generate_mappings(
        &self,
        source: &Schema,
        target: &Schema,
    ) -> Result<Vec<FieldMapping>, SyncError> {
        let span = info_span!("generate_mappings", source_id = %source.id, target_id = %target.id);
        let _guard = span.enter();

        let mappings = self.generator.generate(source, target);
        let key = MappingKey::new(&source.id, &target.id);
        self.mappings.modify(&key, &mut |cached| *cached = Some(mappings.clone()));
        info!(
            mapping_count = mappings.len(),
            target_fields = target.fields.len(),
            "generated mappings"
        );

        let event = MappingGeneratedEvent::new(&source.id, &target.id, &mappings);
        self.publish(MAPPING_GENERATED, &event)?;
        Ok(mappings)
    }

    /// Applies `changes` to the cached set for `(source.id, target.id)` and
    /// publishes `schema.mapping.updated`. An uncached pair starts empty.
    pub fn update_mappings(
        &self,
        changes: &[SchemaChange],
        source: &Schema,
        target: &Schema,
    ) -> Result<Vec<FieldMapping>, SyncError> {
        let span = info_span!("update_mappings", source_id = %source.id, target_id = %target.id);
        let _guard = span.enter();

        let key = MappingKey::new(&source.id, &target.id);
        let mut updated = Vec::new();
        self.mappings.modify(&key, &mut |cached| {
            let current = cached.take().unwrap_or_default();
            updated = self.updater.apply(current, changes, source, target);
            *cached = Some(updated.clone());
        });
        info!(
            change_count = changes.len(),
            mapping_count = updated.len(),
            "updated mappings"
        );

        let event = MappingUpdatedEvent::new(&source.id, &target.id, changes, &updated);
        self.publish(MAPPING_UPDATED, &event)?;
        Ok(updated)
    }

    pub fn generate_transformation(&self, mapping: &FieldMapping) -> TransformationLogic {
        self.synthesizer.synthesize(mapping)
    }

    pub fn cached_mappings(&self, source_id: &str, target_id: &str) -> Option<Vec<FieldMapping>> {
        self.mappings.get(&MappingKey::new(source_id, target_id))
    }

    fn publish<T: Serialize>(&self, event_type: &'static str, payload: &T) -> Result<(), SyncError> {
        let payload = serde_json::to_value(payload)
            .map_err(|source| SyncError::Encode { event_type, source })?;
        let message = Message::new(event_type, payload, &self.agent_id);
        self.sink.publish(&self.topic, &message)?;
        Ok(())
    }
}

impl fmt::Debug for MappingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingService")
            .field("agent_id", &self.agent_id)
            .field("topic", &self.topic)
            .field("options", self.options())
            .finish_non_exhaustive()
    }
}
