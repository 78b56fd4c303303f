//! Tier 3: bulk operations with partial failure.

use std::sync::Arc;

use cinder::prelude::*;
use cinder::wire::{
    EncodedValue, Entry, GetAllRequest, GetAllResponse, PutAllRequest, PutAllResponse,
};
use proptest::prelude::*;

use crate::test_utils::*;

fn admin(cache: Arc<InMemoryCache>) -> ClientSession {
    session_for("admin", "admin-pw", cache, Arc::new(ProtocolStatistics::new()))
}

fn get_all(session: &ClientSession, region: &str, keys: Vec<EncodedValue>) -> GetAllResponse {
    match session.serve_request(Request::GetAll(GetAllRequest {
        region: region.into(),
        keys,
    })) {
        Response::GetAll(r) => r,
        other => panic!("Expected GetAll, got {:?}", other),
    }
}

fn put_all(session: &ClientSession, region: &str, entries: Vec<Entry>) -> PutAllResponse {
    match session.serve_request(Request::PutAll(PutAllRequest {
        region: region.into(),
        entries,
    })) {
        Response::PutAll(r) => r,
        other => panic!("Expected PutAll, got {:?}", other),
    }
}

#[test]
fn test_get_all_mixes_entries_and_keyed_errors() {
    init_tracing();
    let session = admin(populated_cache());
    let response = get_all(
        &session,
        "orders",
        vec![
            "order-1".into(),
            malformed_key(0),
            "order-2".into(),
            "order-404".into(),
        ],
    );

    let values: Vec<_> = response.entries.iter().map(|e| e.value.clone()).collect();
    assert_eq!(
        values,
        vec![EncodedValue::Int(100), EncodedValue::Int(200), EncodedValue::Null]
    );
    assert_eq!(response.failures.len(), 1);
    assert_eq!(response.failures[0].key, malformed_key(0));
    assert_eq!(response.failures[0].error.code, ErrorCode::ValueEncodingError);
}

#[test]
fn test_get_all_every_key_malformed_is_still_success() {
    let session = admin(populated_cache());
    let keys: Vec<_> = (0..5).map(malformed_key).collect();
    let response = get_all(&session, "orders", keys);
    assert!(response.entries.is_empty());
    assert_eq!(response.failures.len(), 5);
}

#[test]
fn test_get_all_missing_region_fails_whole_call() {
    let session = admin(populated_cache());
    let response = session.serve_request(Request::GetAll(GetAllRequest {
        region: "archive".into(),
        keys: vec!["order-1".into()],
    }));
    assert_eq!(response, Response::Error(ErrorResponse::region_not_found()));
}

#[test]
fn test_put_all_applies_good_entries() {
    init_tracing();
    let cache = populated_cache();
    let session = admin(cache.clone());
    let response = put_all(
        &session,
        "customers",
        vec![
            Entry {
                key: "c-1".into(),
                value: "Ada".into(),
            },
            Entry {
                key: malformed_key(7),
                value: "lost".into(),
            },
            Entry {
                key: "c-2".into(),
                value: "Grace".into(),
            },
        ],
    );

    assert_eq!(response.failed_keys.len(), 1);
    assert_eq!(response.failed_keys[0].error.code, ErrorCode::ValueEncodingError);
    let customers = cache.region("customers").unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers.get(&Value::from("c-2")).unwrap(), Some(Value::from("Grace")));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_get_all_partitions_keys(mask in prop::collection::vec(any::<bool>(), 0..40)) {
        let cache = Arc::new(InMemoryCache::new());
        let region = cache.create_region("orders");
        for i in 0..mask.len() {
            region.put(Value::Long(i as i64), Value::Long(i as i64 * 10)).unwrap();
        }
        let session = admin(cache);

        let keys: Vec<EncodedValue> = mask
            .iter()
            .enumerate()
            .map(|(i, &bad)| if bad { malformed_key(i) } else { EncodedValue::Long(i as i64) })
            .collect();
        let malformed = mask.iter().filter(|&&bad| bad).count();

        let response = get_all(&session, "orders", keys);

        prop_assert_eq!(response.entries.len(), mask.len() - malformed);
        prop_assert_eq!(response.failures.len(), malformed);
        for failure in &response.failures {
            prop_assert_eq!(failure.error.code, ErrorCode::ValueEncodingError);
        }
        for entry in &response.entries {
            match (&entry.key, &entry.value) {
                (EncodedValue::Long(k), EncodedValue::Long(v)) => prop_assert_eq!(*v, k * 10),
                other => prop_assert!(false, "unexpected entry {:?}", other),
            }
        }
    }
}
