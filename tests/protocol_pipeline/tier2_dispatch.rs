//! Tier 2: dispatch, authorization gate and error classification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cinder::domain::OperationResult;
use cinder::executor::{OperationDescriptor, OperationRegistry};
use cinder::prelude::*;
use cinder::security::{Authorizer, SecurityManagerAuthorizer};
use cinder::wire::{
    EncodedValue, Entry, GetAvailableServersRequest, GetRegionNamesRequest, GetRequest,
    GetResponse, ProtocolSerializationService, PutRequest, RemoveRequest, RequestKind,
    SerializationService,
};
use parking_lot::Mutex;

use crate::test_utils::*;

/// Denies everything and remembers each permission it was asked about.
#[derive(Default)]
struct DenyAll {
    asked: Mutex<Vec<String>>,
}

impl Authorizer for DenyAll {
    fn authorize(
        &self,
        _principal: Option<&Principal>,
        permission: &ResourcePermission,
        _security_manager: Option<&dyn SecurityManager>,
    ) -> Result<bool, cinder::domain::InvalidExecutionContext> {
        self.asked.lock().push(permission.to_string());
        Ok(false)
    }

    fn implementation_id(&self) -> &'static str {
        "DENY_ALL"
    }
}

fn every_request() -> Vec<Request> {
    vec![
        Request::Get(GetRequest {
            region: "orders".into(),
            key: "order-1".into(),
        }),
        Request::Put(PutRequest {
            region: "orders".into(),
            entry: Entry {
                key: "order-3".into(),
                value: 300.into(),
            },
        }),
        Request::GetAll(cinder::wire::GetAllRequest {
            region: "orders".into(),
            keys: vec!["order-1".into()],
        }),
        Request::PutAll(cinder::wire::PutAllRequest {
            region: "orders".into(),
            entries: vec![],
        }),
        Request::Remove(RemoveRequest {
            region: "orders".into(),
            key: "order-1".into(),
        }),
        Request::GetRegionNames(GetRegionNamesRequest {}),
        Request::GetAvailableServers(GetAvailableServersRequest {}),
    ]
}

#[test]
fn test_every_request_kind_dispatches() {
    init_tracing();
    let processor = OperationsProcessor::new();
    let requests = every_request();
    assert_eq!(requests.len(), RequestKind::ALL.len());

    for request in requests {
        let kind = request.kind().unwrap();
        assert!(processor.registry().describe(kind).is_some(), "{} missing", kind);
    }
}

#[test]
fn test_denied_requests_never_reach_handlers() {
    init_tracing();
    let cache = populated_cache();
    let stats = Arc::new(ProtocolStatistics::new());
    let authorizer = Arc::new(DenyAll::default());
    let ctx = ExecutionContext::for_cache(
        cache.clone(),
        Principal::new("admin"),
        security_manager(),
        stats.clone(),
        authorizer.clone(),
    );
    let processor = OperationsProcessor::new();

    let requests = every_request();
    let count = requests.len() as u64;
    for request in requests {
        let response = processor.process(request, &ctx);
        assert_eq!(response, Response::Error(ErrorResponse::authorization_failed()));
    }

    assert_eq!(stats.authorization_violations(), count);
    assert_eq!(stats.operations_processed(), 0);
    // Denied writes left the region untouched.
    let orders = cache.region("orders").unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders.get(&Value::from("order-3")).unwrap(), None);
    assert_eq!(authorizer.asked.lock()[0], "DATA:READ:orders");
}

#[test]
fn test_mock_handler_runs_zero_times_when_denied() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let registry = OperationRegistry::empty().register(OperationDescriptor::new(
        RequestKind::Get,
        ResourcePermission::data_read(),
        move |_: &dyn SerializationService,
              _: GetRequest,
              _: &ExecutionContext|
              -> OperationResult<GetResponse> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(GetResponse {
                result: EncodedValue::Null,
            })
        },
        |r| match r {
            Request::Get(r) => Some(r),
            _ => None,
        },
        Response::Get,
    ));
    let processor =
        OperationsProcessor::with_registry(registry, Arc::new(ProtocolSerializationService::new()));
    let stats = Arc::new(ProtocolStatistics::new());
    let ctx = ExecutionContext::for_cache(
        populated_cache(),
        Principal::new("anyone"),
        security_manager(),
        stats.clone(),
        Arc::new(DenyAll::default()),
    );

    let response = processor.process(
        Request::Get(GetRequest {
            region: "orders".into(),
            key: "order-1".into(),
        }),
        &ctx,
    );

    assert_eq!(response.error().unwrap().code, ErrorCode::AuthorizationFailed);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(stats.authorization_violations(), 1);
}

#[test]
fn test_region_scoped_grants() {
    init_tracing();
    let cache = populated_cache();
    let stats = Arc::new(ProtocolStatistics::new());
    let writer = session_for("writer", "writer-pw", cache.clone(), stats.clone());

    let put = |region: &str| {
        writer.serve_request(Request::Put(PutRequest {
            region: region.into(),
            entry: Entry {
                key: "k".into(),
                value: "v".into(),
            },
        }))
    };

    assert!(put("orders").error().is_none());
    assert_eq!(put("customers").error().unwrap().code, ErrorCode::AuthorizationFailed);
    assert_eq!(stats.authorization_violations(), 1);
    assert!(cache.region("customers").unwrap().is_empty());
}

#[test]
fn test_remove_on_missing_region() {
    init_tracing();
    let cache = populated_cache();
    let stats = Arc::new(ProtocolStatistics::new());
    let admin = session_for("admin", "admin-pw", cache.clone(), stats);

    let response = admin.serve_request(Request::Remove(RemoveRequest {
        region: "archive".into(),
        key: "order-1".into(),
    }));

    assert_eq!(response, Response::Error(ErrorResponse::region_not_found()));
    let mut names = cache.region_names();
    names.sort();
    assert_eq!(names, vec!["customers", "orders"]);
    assert_eq!(cache.region("orders").unwrap().len(), 2);
}

#[test]
fn test_server_discovery_on_empty_locator() {
    init_tracing();
    let processor = OperationsProcessor::new();
    let ctx = ExecutionContext::for_locator(Arc::new(InMemoryLocator::new()));

    match processor.process(Request::GetAvailableServers(GetAvailableServersRequest {}), &ctx) {
        Response::GetAvailableServers(r) => assert!(r.servers.is_empty()),
        other => panic!("Expected GetAvailableServers, got {:?}", other),
    }
}

#[test]
fn test_server_discovery_lists_snapshot() {
    let processor = OperationsProcessor::new();
    let locator = Arc::new(InMemoryLocator::new());
    let ctx = ExecutionContext::for_locator(locator.clone());
    locator.update([
        ServerLocation::new("10.0.0.1", 40404),
        ServerLocation::new("10.0.0.2", 40404),
    ]);

    match processor.process(Request::GetAvailableServers(GetAvailableServersRequest {}), &ctx) {
        Response::GetAvailableServers(r) => {
            let hosts: Vec<_> = r.servers.iter().map(|s| s.hostname.as_str()).collect();
            assert_eq!(hosts, vec!["10.0.0.1", "10.0.0.2"]);
        }
        other => panic!("Expected GetAvailableServers, got {:?}", other),
    }
}

#[test]
fn test_cache_requests_on_locator_context_are_unsupported() {
    let processor = OperationsProcessor::new();
    let ctx = ExecutionContext::for_locator(Arc::new(InMemoryLocator::new()));

    let response = processor.process(Request::GetRegionNames(GetRegionNamesRequest {}), &ctx);
    assert_eq!(
        response,
        Response::Error(ErrorResponse::unsupported_operation(
            "Invalid execution context found for operation."
        ))
    );
}

#[test]
fn test_discovery_requires_cluster_read() {
    let cache = populated_cache();
    let ctx = ExecutionContext::for_cache(
        cache,
        Principal::new("reader"),
        security_manager(),
        Arc::new(ProtocolStatistics::new()),
        Arc::new(SecurityManagerAuthorizer),
    );
    let response = OperationsProcessor::new()
        .process(Request::GetAvailableServers(GetAvailableServersRequest {}), &ctx);
    assert_eq!(response.error().unwrap().code, ErrorCode::AuthorizationFailed);
}

#[test]
fn test_unknown_request_type_from_the_wire() {
    use cinder::wire::{read_delimited, write_delimited};
    use std::io::Cursor;

    #[derive(serde::Serialize)]
    struct Envelope {
        #[serde(rename = "type")]
        kind: &'static str,
    }

    let mut frame = Vec::new();
    write_delimited(
        &mut frame,
        &Envelope {
            kind: "ExecuteFunction",
        },
    )
    .unwrap();
    let request: Request = read_delimited(&mut Cursor::new(frame), 1024).unwrap().unwrap();
    assert_eq!(request, Request::Unrecognized);

    let admin = session_for(
        "admin",
        "admin-pw",
        populated_cache(),
        Arc::new(ProtocolStatistics::new()),
    );
    let response = admin.serve_request(request);
    assert_eq!(response.error().unwrap().code, ErrorCode::UnsupportedOperation);
}

#[test]
fn test_unknown_request_type_with_payload_keeps_the_session() {
    use cinder::wire::{read_delimited, write_delimited, DEFAULT_MAX_MESSAGE_SIZE};
    use std::io::Cursor;

    #[derive(serde::Serialize)]
    struct Query {
        query: &'static str,
    }

    #[derive(serde::Serialize)]
    struct Envelope {
        #[serde(rename = "type")]
        kind: &'static str,
        payload: Query,
    }

    let mut input = Vec::new();
    write_delimited(
        &mut input,
        &Envelope {
            kind: "ExecuteQuery",
            payload: Query { query: "select *" },
        },
    )
    .unwrap();
    write_delimited(&mut input, &Request::GetRegionNames(GetRegionNamesRequest {})).unwrap();

    let admin = session_for(
        "admin",
        "admin-pw",
        populated_cache(),
        Arc::new(ProtocolStatistics::new()),
    );
    let mut output = Vec::new();
    let served = admin.serve(&mut Cursor::new(input), &mut output).unwrap();
    assert_eq!(served, 2);

    let mut replies = Cursor::new(output);
    let first: Response = read_delimited(&mut replies, DEFAULT_MAX_MESSAGE_SIZE)
        .unwrap()
        .unwrap();
    assert_eq!(first.error().unwrap().code, ErrorCode::UnsupportedOperation);
    let second: Response = read_delimited(&mut replies, DEFAULT_MAX_MESSAGE_SIZE)
        .unwrap()
        .unwrap();
    match second {
        Response::GetRegionNames(r) => assert_eq!(r.regions, vec!["customers", "orders"]),
        other => panic!("Expected GetRegionNames response, got {:?}", other),
    }
}

#[test]
fn test_get_after_put_round_trips_json_documents() {
    let admin = session_for(
        "admin",
        "admin-pw",
        populated_cache(),
        Arc::new(ProtocolStatistics::new()),
    );
    let serialization = ProtocolSerializationService::new();
    let doc = Value::Json(serde_json::json!({ "sku": "A-1", "qty": 3 }).into());
    let encoded = serialization.encode(&doc).unwrap();

    let put = admin.serve_request(Request::Put(PutRequest {
        region: "orders".into(),
        entry: Entry {
            key: "doc".into(),
            value: encoded,
        },
    }));
    assert!(put.error().is_none());

    match admin.serve_request(Request::Get(GetRequest {
        region: "orders".into(),
        key: "doc".into(),
    })) {
        Response::Get(r) => assert_eq!(serialization.decode(&r.result).unwrap(), doc),
        other => panic!("Expected Get, got {:?}", other),
    }
}
