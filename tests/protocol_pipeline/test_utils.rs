//! Shared fixtures for the protocol pipeline suite.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use cinder::prelude::*;
use cinder::security::Credentials;
use cinder::wire::{write_delimited, EncodedValue, SimpleAuthenticationRequest};

/// Route pipeline logs to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Users: `reader` may read everything, `writer` may read and write
/// `orders` only, `admin` may do anything including cluster reads.
pub fn security_manager() -> Arc<StaticSecurityManager> {
    use cinder::security::{Operation, Resource};

    Arc::new(
        StaticSecurityManager::new()
            .user("reader", "reader-pw", [ResourcePermission::data_read()])
            .user(
                "writer",
                "writer-pw",
                [
                    ResourcePermission::data_read(),
                    ResourcePermission::on_region(Resource::Data, Operation::Write, "orders"),
                ],
            )
            .user(
                "admin",
                "admin-pw",
                [
                    ResourcePermission::data_read(),
                    ResourcePermission::data_write(),
                    ResourcePermission::cluster_read(),
                ],
            ),
    )
}

/// Cache with `orders` holding `order-1` → 100, `order-2` → 200 and an
/// empty `customers` region.
pub fn populated_cache() -> Arc<InMemoryCache> {
    let cache = Arc::new(InMemoryCache::new());
    let orders = cache.create_region("orders");
    orders.put(Value::from("order-1"), Value::Int(100)).unwrap();
    orders.put(Value::from("order-2"), Value::Int(200)).unwrap();
    cache.create_region("customers");
    cache
}

/// One framed handshake message.
pub fn handshake_bytes(credentials: &Credentials) -> Vec<u8> {
    let mut buf = Vec::new();
    write_delimited(
        &mut buf,
        &SimpleAuthenticationRequest {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        },
    )
    .unwrap();
    buf
}

/// Establish a SIMPLE-authenticated session for `username`.
pub fn session_for(
    username: &str,
    password: &str,
    cache: Arc<InMemoryCache>,
    stats: Arc<ProtocolStatistics>,
) -> ClientSession {
    let bytes = handshake_bytes(&Credentials::new(username, password));
    ClientSession::establish(
        &ProtocolConfig::new(),
        &mut Cursor::new(bytes),
        &mut Vec::new(),
        security_manager(),
        cache,
        stats,
        Arc::new(OperationsProcessor::new()),
    )
    .unwrap()
}

/// A key no registered codec can decode.
pub fn malformed_key(n: usize) -> EncodedValue {
    EncodedValue::Custom {
        encoding: 0xBAD,
        bytes: n.to_le_bytes().to_vec(),
    }
}
