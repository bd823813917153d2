//! Request/response adapter that sequences [`MappingService`] calls.

use schemap_map::MappingStats;
use schemap_model::{FieldMapping, Schema, SchemaChange, clamp_confidence};
use serde::Serialize;
use tracing::{debug, info_span};

use crate::error::SyncError;
use crate::events::{MAPPING_GENERATED, MAPPING_UPDATED};
use crate::service::MappingService;

/// Input to [`MappingWorkflow::run`].
#[derive(Debug, Clone, Default)]
pub struct MappingRequest {
    pub source: Option<Schema>,
    pub target: Option<Schema>,
    /// When non-empty, the cached mapping set is updated instead of regenerated.
    pub changes: Vec<SchemaChange>,
}

impl MappingRequest {
    pub fn new(source: Schema, target: Schema) -> Self {
        Self {
            source: Some(source),
            target: Some(target),
            changes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_changes(mut self, changes: Vec<SchemaChange>) -> Self {
        self.changes = changes;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowOutcome {
    pub mappings: Vec<FieldMapping>,
    pub stats: MappingStats,
    /// Event published by the step that ran.
    pub event_type: &'static str,
}

pub struct MappingWorkflow<'a> {
    service: &'a MappingService,
}

impl<'a> MappingWorkflow<'a> {
    pub fn new(service: &'a MappingService) -> Self {
        Self { service }
    }

    /// Validates the request, then routes it to an incremental update or a
    /// full generation.
    pub fn run(&self, request: &MappingRequest) -> Result<WorkflowOutcome, SyncError> {
        let source = request
            .source
            .as_ref()
            .ok_or(SyncError::MissingSchema { role: "source" })?;
        let target = request
            .target
            .as_ref()
            .ok_or(SyncError::MissingSchema { role: "target" })?;
        source
            .validate()
            .map_err(|source| SyncError::InvalidSchema { role: "source", source })?;
        target
            .validate()
            .map_err(|source| SyncError::InvalidSchema { role: "target", source })?;

        let span = info_span!("mapping_workflow", source_id = %source.id, target_id = %target.id);
        let _guard = span.enter();

        let (mut mappings, event_type) = if request.changes.is_empty() {
            debug!("routing to generation");
            (self.service.generate_mappings(source, target)?, MAPPING_GENERATED)
        } else {
            debug!(change_count = request.changes.len(), "routing to incremental update");
            (
                self.service.update_mappings(&request.changes, source, target)?,
                MAPPING_UPDATED,
            )
        };

        for mapping in &mut mappings {
            mapping.confidence = clamp_confidence(mapping.confidence);
        }
        let stats = MappingStats::from_mappings(
            &mappings,
            self.service.options().high_confidence_threshold,
        );

        Ok(WorkflowOutcome {
            mappings,
            stats,
            event_type,
        })
    }
}
