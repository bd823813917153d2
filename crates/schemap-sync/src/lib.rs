//! Keeps field mappings in step with drifting source schemas.
//!
//! [`SchemaDiffer`] compares each observed schema with the last snapshot of
//! its source. [`IncrementalMappingUpdater`] applies the resulting changes to
//! a mapping set, and [`MappingService`] ties both to a shared mapping cache
//! and publishes a notification after every generation or update.
//!
//! Caches are injected through [`KeyedStore`] so they can be shared between
//! services or isolated per caller.

#![deny(unsafe_code)]

pub mod diff;
pub mod error;
pub mod events;
pub mod repository;
pub mod service;
pub mod store;
pub mod update;
pub mod workflow;

pub use diff::{SchemaDiffer, diff_schemas};
pub use error::{PublishError, RepositoryError, SyncError};
pub use events::{
    ChangeSummary, DEFAULT_TOPIC, InMemoryBus, MAPPING_GENERATED, MAPPING_UPDATED,
    MappingGeneratedEvent, MappingSummary, MappingUpdatedEvent, Message, NotificationSink,
};
pub use repository::{MappingMetadata, MappingRepository, StoredMappingSet};
pub use service::{MappingService, ServiceConfig, default_agent_id};
pub use store::{InMemoryStore, KeyedStore, MappingStore, SnapshotStore};
pub use update::IncrementalMappingUpdater;
pub use workflow::{MappingRequest, MappingWorkflow, WorkflowOutcome};
