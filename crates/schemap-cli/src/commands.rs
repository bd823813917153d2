//! Command implementations. Each returns a report; rendering is left to the
//! binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use schemap_map::MappingStats;
use schemap_model::{FieldMapping, MappingKey, Schema, SchemaChange, TransformationLogic};
use schemap_sync::{
    InMemoryBus, MappingRepository, MappingRequest, MappingService, MappingWorkflow, Message,
    SchemaDiffer,
};
use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::config::AppConfig;

/// Reads a JSON schema file and validates it.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read schema {}", path.display()))?;
    let schema: Schema = serde_json::from_str(&content)
        .with_context(|| format!("parse schema {}", path.display()))?;
    schema
        .validate()
        .with_context(|| format!("invalid schema {}", path.display()))?;
    Ok(schema)
}

#[derive(Debug, Serialize)]
pub struct MapReport {
    pub source_id: String,
    pub target_id: String,
    pub mappings: Vec<FieldMapping>,
    pub transformations: Vec<TransformationLogic>,
    pub stats: MappingStats,
    /// Unmapped target fields, in declared order.
    pub unmapped_targets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
}

pub fn run_map(
    config: &AppConfig,
    source_path: &Path,
    target_path: &Path,
    save_dir: Option<&Path>,
) -> Result<MapReport> {
    let source = load_schema(source_path)?;
    let target = load_schema(target_path)?;
    let source_id = source.id.clone();
    let span = info_span!("map", %source_id, target_id = %target.id);
    let _guard = span.enter();

    let service = MappingService::with_sink(config.service_config(), Arc::new(InMemoryBus::new()));
    let outcome = MappingWorkflow::new(&service).run(&MappingRequest::new(source, target.clone()))?;
    let transformations = outcome
        .mappings
        .iter()
        .map(|m| service.generate_transformation(m))
        .collect();

    let saved_to = match save_dir {
        Some(dir) => {
            let repository = MappingRepository::new(dir)
                .with_context(|| format!("open mapping repository {}", dir.display()))?;
            let key = MappingKey::new(&source_id, &target.id);
            let path = repository
                .save(&key, &outcome.mappings)
                .context("save mapping set")?;
            info!(path = %path.display(), "saved mapping set");
            Some(path)
        }
        None => None,
    };

    let unmapped_targets = target
        .fields
        .iter()
        .filter(|f| !outcome.mappings.iter().any(|m| m.target_field == f.name))
        .map(|f| f.name.clone())
        .collect();

    Ok(MapReport {
        source_id,
        target_id: target.id,
        mappings: outcome.mappings,
        transformations,
        stats: outcome.stats,
        unmapped_targets,
        saved_to,
    })
}

#[derive(Debug, Serialize)]
pub struct DiffReport {
    pub source_id: String,
    pub baseline_version: u64,
    pub current_version: u64,
    pub changes: Vec<SchemaChange>,
}

pub fn run_diff(baseline_path: &Path, current_path: &Path) -> Result<DiffReport> {
    let baseline = load_schema(baseline_path)?;
    let current = load_schema(current_path)?;
    let changes = diff_pair(&baseline, &current);
    Ok(DiffReport {
        source_id: current.source_id,
        baseline_version: baseline.version,
        current_version: current.version,
        changes,
    })
}

fn diff_pair(baseline: &Schema, current: &Schema) -> Vec<SchemaChange> {
    if baseline.source_id != current.source_id {
        warn!(
            baseline = %baseline.source_id,
            current = %current.source_id,
            "schemas describe different sources; comparing anyway"
        );
    }
    let differ = SchemaDiffer::in_memory();
    differ.diff(&current.source_id, baseline);
    differ.diff(&current.source_id, current)
}

#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub source_id: String,
    pub target_id: String,
    pub changes: Vec<SchemaChange>,
    /// Mappings generated for the baseline schema.
    pub baseline_mappings: Vec<FieldMapping>,
    /// Mappings after applying the changes.
    pub mappings: Vec<FieldMapping>,
    pub stats: MappingStats,
    /// Every notification published, in order.
    pub events: Vec<Message>,
}

/// Generates mappings for `baseline`, diffs it against `current` and applies
/// the changes incrementally.
pub fn run_sync(
    config: &AppConfig,
    baseline_path: &Path,
    current_path: &Path,
    target_path: &Path,
) -> Result<SyncReport> {
    let baseline = load_schema(baseline_path)?;
    let current = load_schema(current_path)?;
    let target = load_schema(target_path)?;
    let span = info_span!("sync", source_id = %current.id, target_id = %target.id);
    let _guard = span.enter();

    if baseline.id != current.id {
        warn!(
            baseline = %baseline.id,
            current = %current.id,
            "schema ids differ; the update starts from an empty mapping set"
        );
    }

    let service_config = config.service_config();
    let bus = Arc::new(InMemoryBus::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&events);
    bus.subscribe(service_config.topic.clone(), move |message: &Message| {
        recorder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
    });
    let service = MappingService::with_sink(service_config, bus);
    let workflow = MappingWorkflow::new(&service);

    let generated = workflow.run(&MappingRequest::new(baseline.clone(), target.clone()))?;
    let changes = diff_pair(&baseline, &current);
    let outcome = if changes.is_empty() {
        info!("no schema changes; keeping baseline mappings");
        generated.clone()
    } else {
        workflow.run(&MappingRequest::new(current.clone(), target.clone()).with_changes(changes.clone()))?
    };

    let events = events
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Ok(SyncReport {
        source_id: current.id,
        target_id: target.id,
        changes,
        baseline_mappings: generated.mappings,
        mappings: outcome.mappings,
        stats: outcome.stats,
        events,
    })
}
