//! Tier 4: concurrent first use of the plugin registries and shared sinks.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use cinder::prelude::*;
use cinder::security::lookup::{builtin_authenticators, builtin_authorizers};
use cinder::security::{AuthenticatorLookupService, AuthorizationLookupService, Credentials};
use cinder::wire::{GetRequest, RemoveRequest};

use crate::test_utils::*;

const FIRST_CALLERS: usize = 50;

#[test]
fn test_fifty_first_callers_share_one_population() {
    init_tracing();
    let populations = Arc::new(AtomicUsize::new(0));
    let counter = populations.clone();
    let service = AuthenticatorLookupService::with_discovery(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        builtin_authenticators()
    });
    let barrier = Barrier::new(FIRST_CALLERS);

    let seen: Vec<Vec<String>> = thread::scope(|s| {
        let handles: Vec<_> = (0..FIRST_CALLERS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    let authenticator = service.get_authenticator("SIMPLE").unwrap();
                    assert_eq!(authenticator.implementation_id(), "SIMPLE");
                    service.registered_ids()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(populations.load(Ordering::SeqCst), 1);
    assert_eq!(seen.len(), FIRST_CALLERS);
    for ids in &seen {
        assert_eq!(ids, &vec!["NOOP".to_string(), "SIMPLE".to_string()]);
    }
}

#[test]
fn test_concurrent_sessions_with_private_lookup_services() {
    init_tracing();
    let authorizer_populations = Arc::new(AtomicUsize::new(0));
    let counter = authorizer_populations.clone();
    let authorizers = AuthorizationLookupService::with_discovery(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        builtin_authorizers()
    });
    let authenticators = AuthenticatorLookupService::new();
    let cache = populated_cache();
    let stats = Arc::new(ProtocolStatistics::new());
    let processor = Arc::new(OperationsProcessor::new());
    let barrier = Barrier::new(FIRST_CALLERS);

    thread::scope(|s| {
        for i in 0..FIRST_CALLERS {
            let (authenticators, authorizers, barrier) = (&authenticators, &authorizers, &barrier);
            let (cache, stats, processor) = (cache.clone(), stats.clone(), processor.clone());
            s.spawn(move || {
                // Even callers are readers, odd callers are writers.
                let (user, password) = if i % 2 == 0 {
                    ("reader", "reader-pw")
                } else {
                    ("writer", "writer-pw")
                };
                let handshake = handshake_bytes(&Credentials::new(user, password));
                barrier.wait();
                let session = ClientSession::establish_with(
                    authenticators,
                    authorizers,
                    &ProtocolConfig::new(),
                    &mut Cursor::new(handshake),
                    &mut Vec::new(),
                    security_manager(),
                    cache,
                    stats,
                    processor,
                )
                .unwrap();

                let read = session.serve_request(Request::Get(GetRequest {
                    region: "orders".into(),
                    key: "order-1".into(),
                }));
                assert!(read.error().is_none());

                let delete = session.serve_request(Request::Remove(RemoveRequest {
                    region: "customers".into(),
                    key: "nobody".into(),
                }));
                assert_eq!(delete.error().unwrap().code, ErrorCode::AuthorizationFailed);
            });
        }
    });

    assert_eq!(authorizer_populations.load(Ordering::SeqCst), 1);
    let snapshot = stats.snapshot();
    assert_eq!(snapshot.authorization_violations, FIRST_CALLERS as u64);
    assert_eq!(snapshot.operations_processed, FIRST_CALLERS as u64);
    assert_eq!(snapshot.authentication_failures, 0);
}

#[test]
fn test_global_services_resolve_builtins() {
    let ids = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| AuthorizationLookupService::global().registered_ids()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });
    for set in ids {
        assert_eq!(set, vec!["DEFAULT", "NOOP"]);
    }
}
