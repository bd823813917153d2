use std::sync::{Arc, Mutex};
use std::thread;

use schemap_model::{ChangeType, Field, FieldMapping, MappingKey, Schema, SchemaChange};
use schemap_sync::{
    DEFAULT_TOPIC, InMemoryBus, InMemoryStore, MAPPING_GENERATED, MAPPING_UPDATED,
    MappingGeneratedEvent, MappingService, MappingUpdatedEvent, Message, NotificationSink, PublishError, SchemaDiffer,
    ServiceConfig, SyncError,
};

fn crm_users(version: u64, fields: Vec<Field>) -> Schema {
    Schema::new("crm_users", "crm", version, fields)
}

fn crm_users_v1() -> Schema {
    crm_users(
        1,
        vec![
            Field::new("user_id", "INTEGER", false),
            Field::new("user_name", "VARCHAR(255)", false),
            Field::new("email_addr", "VARCHAR(255)", true),
        ],
    )
}

fn warehouse_users() -> Schema {
    Schema::new(
        "warehouse_users",
        "warehouse",
        1,
        vec![
            Field::new("id", "BIGINT", false),
            Field::new("username", "TEXT", false),
            Field::new("email", "TEXT", true),
        ],
    )
}

fn recording_service() -> (MappingService, Arc<InMemoryBus>, Arc<Mutex<Vec<Message>>>) {
    let bus = Arc::new(InMemoryBus::new());
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    bus.subscribe(DEFAULT_TOPIC, move |message: &Message| {
        sink.lock().unwrap().push(message.clone());
    });
    let config = ServiceConfig {
        agent_id: Some("schema-mapping-test0001".to_string()),
        ..ServiceConfig::default()
    };
    let service = MappingService::with_sink(config, bus.clone());
    (service, bus, received)
}

#[test]
fn generation_caches_and_publishes() {
    let (service, _bus, received) = recording_service();
    let mappings = service
        .generate_mappings(&crm_users_v1(), &warehouse_users())
        .unwrap();
    assert_eq!(mappings.len(), 3);
    assert_eq!(
        service.cached_mappings("crm_users", "warehouse_users"),
        Some(mappings.clone())
    );

    let messages = received.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].event_type, MAPPING_GENERATED);
    assert_eq!(messages[0].source, "schema-mapping-test0001");

    let payload: MappingGeneratedEvent = serde_json::from_value(messages[0].payload.clone()).unwrap();
    assert_eq!(payload.source_id, "crm_users");
    assert_eq!(payload.target_id, "warehouse_users");
    assert_eq!(payload.mapping_count, 3);
    assert!(payload.mappings.iter().all(|m| m.has_transformation));
    assert_eq!(payload.mappings[1].source_field, "user_name");
    assert_eq!(payload.mappings[1].confidence, 1.0);
}

#[test]
fn generated_payload_keys_are_stable() {
    let (service, _bus, received) = recording_service();
    service
        .generate_mappings(&crm_users_v1(), &warehouse_users())
        .unwrap();

    let mut payload = received.lock().unwrap()[0].payload.clone();
    for mapping in payload["mappings"].as_array_mut().unwrap() {
        let confidence = mapping["confidence"].as_f64().unwrap();
        mapping["confidence"] = serde_json::json!((confidence * 100.0).round() / 100.0);
    }
    insta::assert_snapshot!(serde_json::to_string_pretty(&payload).unwrap(), @r#"
    {
      "mapping_count": 3,
      "mappings": [
        {
          "confidence": 0.84,
          "has_transformation": true,
          "mapping_type": "transformed",
          "source_field": "user_id",
          "target_field": "id"
        },
        {
          "confidence": 1.0,
          "has_transformation": true,
          "mapping_type": "transformed",
          "source_field": "user_name",
          "target_field": "username"
        },
        {
          "confidence": 0.84,
          "has_transformation": true,
          "mapping_type": "transformed",
          "source_field": "email_addr",
          "target_field": "email"
        }
      ],
      "source_id": "crm_users",
      "target_id": "warehouse_users"
    }
    "#);
}

#[test]
fn removed_field_drops_its_mapping_and_publishes_update() {
    let (service, _bus, received) = recording_service();
    let differ = SchemaDiffer::in_memory();
    let target = warehouse_users();

    let v1 = crm_users_v1();
    differ.diff("crm", &v1);
    service.generate_mappings(&v1, &target).unwrap();

    let v2 = crm_users(
        2,
        vec![
            Field::new("user_id", "INTEGER", false),
            Field::new("user_name", "VARCHAR(255)", false),
            Field::new("phone", "VARCHAR(32)", true),
        ],
    );
    let changes = differ.diff("crm", &v2);
    let updated = service.update_mappings(&changes, &v2, &target).unwrap();

    let sources: Vec<_> = updated.iter().map(|m| m.source_field.as_str()).collect();
    assert_eq!(sources, vec!["user_id", "user_name"]);
    assert_eq!(service.cached_mappings("crm_users", "warehouse_users"), Some(updated));

    let messages = received.lock().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].event_type, MAPPING_UPDATED);
    let payload: MappingUpdatedEvent = serde_json::from_value(messages[1].payload.clone()).unwrap();
    insta::assert_snapshot!(serde_json::to_string_pretty(&payload).unwrap(), @r#"
    {
      "source_id": "crm_users",
      "target_id": "warehouse_users",
      "change_count": 2,
      "mapping_count": 2,
      "changes": [
        {
          "change_type": "added",
          "field_name": "phone"
        },
        {
          "change_type": "removed",
          "field_name": "email_addr"
        }
      ]
    }
    "#);
}

#[test]
fn added_field_without_compatible_target_stays_unmapped() {
    let (service, _bus, _received) = recording_service();
    let target = warehouse_users();
    service.generate_mappings(&crm_users_v1(), &target).unwrap();

    let mut fields = crm_users_v1().fields;
    fields.push(Field::new("avatar", "BLOB", true));
    let v2 = crm_users(2, fields);
    let changes = [SchemaChange::new("crm", ChangeType::Added, "avatar")];
    let updated = service.update_mappings(&changes, &v2, &target).unwrap();
    assert_eq!(updated.len(), 3);
    assert!(updated.iter().all(|m| m.source_field != "avatar"));
}

#[test]
fn update_without_cached_set_starts_empty() {
    let (service, _bus, _received) = recording_service();
    let changes = [SchemaChange::new("crm", ChangeType::Added, "user_name")];
    let updated = service
        .update_mappings(&changes, &crm_users_v1(), &warehouse_users())
        .unwrap();
    // `id` is scanned first but scores too low.
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].target_field, "username");
}

#[test]
fn closed_bus_still_returns_mappings() {
    let (service, bus, received) = recording_service();
    bus.close();
    let mappings = service
        .generate_mappings(&crm_users_v1(), &warehouse_users())
        .unwrap();
    assert_eq!(mappings.len(), 3);
    assert!(received.lock().unwrap().is_empty());
}

struct RejectingSink;

impl NotificationSink for RejectingSink {
    fn publish(&self, topic: &str, _message: &Message) -> Result<(), PublishError> {
        Err(PublishError::Rejected {
            topic: topic.to_string(),
            reason: "broker unavailable".to_string(),
        })
    }
}

#[test]
fn sink_failure_surfaces_after_caching() {
    let service = MappingService::with_sink(ServiceConfig::default(), Arc::new(RejectingSink));
    let err = service
        .generate_mappings(&crm_users_v1(), &warehouse_users())
        .unwrap_err();
    assert!(matches!(err, SyncError::Publish(PublishError::Rejected { .. })));
    assert_eq!(
        service
            .cached_mappings("crm_users", "warehouse_users")
            .map(|m| m.len()),
        Some(3)
    );
}

#[test]
fn services_can_share_a_mapping_store() {
    let store = Arc::new(InMemoryStore::<MappingKey, Vec<FieldMapping>>::new());
    let bus = Arc::new(InMemoryBus::new());
    let writer = MappingService::new(ServiceConfig::default(), store.clone(), bus.clone());
    let reader = MappingService::new(ServiceConfig::default(), store, bus);
    assert_ne!(writer.agent_id(), reader.agent_id());

    writer
        .generate_mappings(&crm_users_v1(), &warehouse_users())
        .unwrap();
    assert_eq!(
        reader
            .cached_mappings("crm_users", "warehouse_users")
            .map(|m| m.len()),
        Some(3)
    );
}

#[test]
fn concurrent_updates_on_one_pair_are_not_lost() {
    let names: Vec<String> = (0..8).map(|i| format!("f{i}")).collect();
    let fields: Vec<Field> = names.iter().map(|n| Field::new(n, "INTEGER", false)).collect();
    let source = Schema::new("wide_src", "wide", 1, fields.clone());
    let target = Schema::new("wide_dst", "wide", 1, fields);
    let service = MappingService::with_sink(ServiceConfig::default(), Arc::new(InMemoryBus::new()));

    thread::scope(|scope| {
        for name in &names {
            let (service, source, target) = (&service, &source, &target);
            scope.spawn(move || {
                let changes = [SchemaChange::new("wide", ChangeType::Added, name)];
                service.update_mappings(&changes, source, target).unwrap();
            });
        }
    });

    let cached = service.cached_mappings("wide_src", "wide_dst").unwrap();
    assert_eq!(cached.len(), 8);
    let mut targets: Vec<_> = cached.iter().map(|m| m.target_field.clone()).collect();
    targets.sort();
    targets.dedup();
    assert_eq!(targets.len(), 8);
}
