// Property entities: pipeline round trips, pipeline changes and chunk cleanup.

mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pollster::block_on;
    use proptest::prelude::*;
    use proptest::strategy::Strategy as _;
    use serde_json::{json, Value};

    use property_codec::backend::{Backend, BackendError, MemoryBackend};
    use property_codec::entity::{FixedName, PropertyEntity, StoredRecord};
    use property_codec::strategy::{
        ChunkingParams, ChunkingStrategy, CompressionParams, CompressionStrategy, EncodingStrategy,
        EncryptionStrategy, Strategy, StrategyId, StrategyRegistry,
    };
    use property_codec::types::StoreError;

    use crate::common::{test_cipher, test_cipher_with_nonce, FaultyBackend, KEY};

    const PROP: &str = "payload";

    fn chunking(backend: &Arc<dyn Backend>, chunk_size: usize, base: &str) -> Strategy {
        ChunkingStrategy::new(
            Arc::clone(backend),
            ChunkingParams {
                chunk_size,
                base_property_name: base.into(),
            },
        )
        .unwrap()
        .into()
    }

    fn compression() -> Strategy {
        CompressionStrategy::new(CompressionParams::default()).unwrap().into()
    }

    fn entity(backend: &Arc<dyn Backend>, strategies: Vec<Strategy>) -> PropertyEntity<FixedName> {
        PropertyEntity::with_strategies(
            FixedName::new(PROP),
            Arc::clone(backend),
            Arc::new(StrategyRegistry::new()),
            strategies,
        )
    }

    fn record(memory: &MemoryBackend) -> StoredRecord {
        StoredRecord::from_json(&memory.raw_get(KEY, PROP).unwrap()).unwrap()
    }

    /// Sub-keys left behind by writing `value` once into an empty store.
    fn fresh_layout(value: &Value, strategies: impl Fn(&Arc<dyn Backend>) -> Vec<Strategy>) -> Vec<String> {
        let memory = Arc::new(MemoryBackend::new());
        let backend: Arc<dyn Backend> = memory.clone();
        let entity = entity(&backend, strategies(&backend));
        block_on(entity.set_data(KEY, value, &())).unwrap();
        memory.sub_keys(KEY)
    }

    #[test]
    fn empty_pipeline_stores_plain_json() {
        let memory = Arc::new(MemoryBackend::new());
        let backend: Arc<dyn Backend> = memory.clone();
        let entity = entity(&backend, Vec::new());

        block_on(entity.set_data(KEY, &json!({"a": 1}), &())).unwrap();

        let stored = record(&memory);
        assert_eq!(stored.payload, r#"{"a":1}"#);
        assert!(stored.strategy_ids.is_empty());

        let value: Option<Value> = block_on(entity.get_data(KEY, &())).unwrap();
        assert_eq!(value, Some(json!({"a": 1})));
    }

    #[test]
    fn chunking_then_encoding_round_trip() {
        let memory = Arc::new(MemoryBackend::new());
        let backend: Arc<dyn Backend> = memory.clone();
        let chunks = chunking(&backend, 5, "chunk");
        let encoding = Strategy::from(EncodingStrategy::standard());
        let expected_ids = vec![chunks.id(), encoding.id()];
        let entity = entity(&backend, vec![chunks, encoding]);

        block_on(entity.set_data(KEY, &json!({"a": 1}), &())).unwrap();

        assert_eq!(record(&memory).strategy_ids, expected_ids);
        // `{"a":1}` is 7 chars: two chunks of at most 5.
        assert_eq!(memory.raw_get(KEY, "payload.chunk.0").as_deref(), Some(r#"{"a":"#));
        assert_eq!(memory.raw_get(KEY, "payload.chunk.1").as_deref(), Some("1}"));

        let value: Option<Value> = block_on(entity.get_data(KEY, &())).unwrap();
        assert_eq!(value, Some(json!({"a": 1})));
    }

    #[test]
    fn absent_value_is_none() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let entity = entity(&backend, vec![compression()]);
        let value: Option<Value> = block_on(entity.get_data(KEY, &())).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn stored_values_survive_pipeline_changes() {
        let memory = Arc::new(MemoryBackend::new());
        let backend: Arc<dyn Backend> = memory.clone();
        let entity = entity(&backend, vec![EncodingStrategy::standard().into()]);
        let old_ids = entity.active_strategy_ids();

        block_on(entity.set_data(KEY, &json!(["old"]), &())).unwrap();

        let new_ids = entity.update_strategies(vec![compression(), chunking(&backend, 3, "chunk")]);
        assert_ne!(old_ids, new_ids);

        // Decoding follows the record, not the entity.
        let value: Option<Value> = block_on(entity.get_data(KEY, &())).unwrap();
        assert_eq!(value, Some(json!(["old"])));

        block_on(entity.set_data(KEY, &json!(["new"]), &())).unwrap();
        assert_eq!(record(&memory).strategy_ids, new_ids);
        let value: Option<Value> = block_on(entity.get_data(KEY, &())).unwrap();
        assert_eq!(value, Some(json!(["new"])));
    }

    #[test]
    fn switching_nonce_keeps_old_records_readable() {
        let memory = Arc::new(MemoryBackend::new());
        let backend: Arc<dyn Backend> = memory.clone();
        let entity = entity(&backend, vec![EncryptionStrategy::new(test_cipher_with_nonce(1, 1)).into()]);

        block_on(entity.set_data(KEY, &"hello", &())).unwrap();
        let written_under = record(&memory).strategy_ids;

        let switched = entity.update_strategies(vec![EncryptionStrategy::new(test_cipher_with_nonce(1, 2)).into()]);
        assert_ne!(written_under, switched);

        let value: Option<String> = block_on(entity.get_data(KEY, &())).unwrap();
        assert_eq!(value.as_deref(), Some("hello"));

        block_on(entity.set_data(KEY, &"again", &())).unwrap();
        assert_eq!(record(&memory).strategy_ids, switched);
        let value: Option<String> = block_on(entity.get_data(KEY, &())).unwrap();
        assert_eq!(value.as_deref(), Some("again"));
    }

    #[test]
    fn unregistered_identifier_is_unknown_strategy() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let writer = entity(&backend, vec![compression()]);
        block_on(writer.set_data(KEY, &json!(1), &())).unwrap();

        // Same store, separate registry that never saw the compression stage.
        let reader = entity(&backend, Vec::new());
        let err = block_on(reader.get_data::<Value>(KEY, &())).unwrap_err();
        match err {
            StoreError::UnknownStrategy { id } => assert!(id.starts_with("compression#")),
            other => panic!("expected UnknownStrategy, got {:?}", other),
        }
    }

    #[test]
    fn switching_to_unregistered_ids_is_rejected() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let entity = entity(&backend, vec![compression()]);
        let before = entity.active_strategy_ids();

        let err = entity
            .update_strategy_ids(vec![StrategyId::from("encoding#ffff")])
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownStrategy { .. }));
        assert_eq!(entity.active_strategy_ids(), before);

        entity.update_strategy_ids(Vec::new()).unwrap();
        assert!(entity.active_strategy_ids().is_empty());
    }

    #[test]
    fn delete_removes_record_and_chunks() {
        let memory = Arc::new(MemoryBackend::new());
        let backend: Arc<dyn Backend> = memory.clone();
        let entity = entity(&backend, vec![chunking(&backend, 4, "chunk")]);

        block_on(entity.set_data(KEY, &"a fairly long string value", &())).unwrap();
        assert!(memory.len() > 2);

        block_on(entity.delete_data(KEY, &())).unwrap();
        assert!(memory.is_empty());
        let value: Option<String> = block_on(entity.get_data(KEY, &())).unwrap();
        assert!(value.is_none());

        // Deleting again is a no-op.
        block_on(entity.delete_data(KEY, &())).unwrap();
    }

    #[test]
    fn overwrite_with_fewer_chunks_drops_stale_ones() {
        let strategies = |backend: &Arc<dyn Backend>| vec![chunking(backend, 4, "chunk")];
        let memory = Arc::new(MemoryBackend::new());
        let backend: Arc<dyn Backend> = memory.clone();
        let entity = entity(&backend, strategies(&backend));

        block_on(entity.set_data(KEY, &"x".repeat(40), &())).unwrap();
        block_on(entity.set_data(KEY, &"short", &())).unwrap();

        assert_eq!(memory.sub_keys(KEY), fresh_layout(&json!("short"), strategies));
        let value: Option<String> = block_on(entity.get_data(KEY, &())).unwrap();
        assert_eq!(value.as_deref(), Some("short"));
    }

    #[test]
    fn overwrite_releases_chunks_behind_outer_stages() {
        // Two chunking stages with an encoding stage between them.
        let strategies = |backend: &Arc<dyn Backend>| {
            vec![
                chunking(backend, 4, "chunk"),
                EncodingStrategy::standard().into(),
                chunking(backend, 16, "part"),
            ]
        };
        let memory = Arc::new(MemoryBackend::new());
        let backend: Arc<dyn Backend> = memory.clone();
        let entity = entity(&backend, strategies(&backend));

        block_on(entity.set_data(KEY, &"y".repeat(120), &())).unwrap();
        block_on(entity.set_data(KEY, &"tiny", &())).unwrap();

        assert_eq!(memory.sub_keys(KEY), fresh_layout(&json!("tiny"), strategies));
        let value: Option<String> = block_on(entity.get_data(KEY, &())).unwrap();
        assert_eq!(value.as_deref(), Some("tiny"));
    }

    #[test]
    fn overwrite_replaces_unreadable_record() {
        let memory = Arc::new(MemoryBackend::new());
        let backend: Arc<dyn Backend> = memory.clone();
        let entity = entity(&backend, vec![compression()]);

        memory.raw_set(KEY, PROP, "not a record");
        let err = block_on(entity.get_data::<Value>(KEY, &())).unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord(_)));

        block_on(entity.set_data(KEY, &json!({"ok": true}), &())).unwrap();
        let value: Option<Value> = block_on(entity.get_data(KEY, &())).unwrap();
        assert_eq!(value, Some(json!({"ok": true})));
    }

    #[test]
    fn cancelled_read_surfaces_as_cancelled() {
        let faulty = Arc::new(FaultyBackend::new());
        let backend: Arc<dyn Backend> = faulty.clone();
        let entity = entity(&backend, Vec::new());

        faulty.fail_get(PROP, BackendError::Cancelled);
        let err = block_on(entity.get_data::<Value>(KEY, &())).unwrap_err();
        assert!(matches!(err, StoreError::Cancelled));
    }

    #[test]
    fn failed_record_write_is_a_backend_error() {
        let faulty = Arc::new(FaultyBackend::new());
        let backend: Arc<dyn Backend> = faulty.clone();
        let entity = entity(&backend, vec![chunking(&backend, 4, "chunk")]);

        faulty.fail_set(PROP, BackendError::Unavailable("quota".into()));
        let err = block_on(entity.set_data(KEY, &"abcdefgh", &())).unwrap_err();
        assert!(matches!(err, StoreError::Backend(BackendError::Unavailable(_))));
        assert!(faulty.inner.raw_get(KEY, PROP).is_none());
    }

    #[test]
    fn encrypted_payload_hides_plaintext() {
        let memory = Arc::new(MemoryBackend::new());
        let backend: Arc<dyn Backend> = memory.clone();
        let entity = entity(&backend, vec![EncryptionStrategy::new(test_cipher(7)).into()]);

        block_on(entity.set_data(KEY, &"top secret", &())).unwrap();
        assert!(!record(&memory).payload.contains("secret"));

        let value: Option<String> = block_on(entity.get_data(KEY, &())).unwrap();
        assert_eq!(value.as_deref(), Some("top secret"));
    }

    fn stage(backend: &Arc<dyn Backend>, which: usize) -> Strategy {
        match which {
            0 => EncodingStrategy::standard().into(),
            1 => compression(),
            2 => EncryptionStrategy::new(test_cipher(3)).into(),
            3 => chunking(backend, 7, "chunk"),
            _ => chunking(backend, 11, "part"),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn any_pipeline_round_trips(
            order in Just((0usize..5).collect::<Vec<_>>()).prop_shuffle(),
            depth in 0usize..=5,
            text in "\\PC{0,80}",
        ) {
            let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
            let strategies = order[..depth].iter().map(|&i| stage(&backend, i)).collect();
            let entity = entity(&backend, strategies);

            block_on(entity.set_data(KEY, &text, &())).unwrap();
            let value: Option<String> = block_on(entity.get_data(KEY, &())).unwrap();
            prop_assert_eq!(value, Some(text));
        }
    }
}
