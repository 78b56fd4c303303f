//! Tier 1: connection handshake and session setup.

use std::io::Cursor;
use std::sync::Arc;

use cinder::prelude::*;
use cinder::security::{AuthenticationError, Credentials, LookupError};
use cinder::wire::{read_delimited, GetRequest, SimpleAuthenticationResponse};
use cinder::executor::SessionError;

use crate::test_utils::*;

fn establish(
    config: &ProtocolConfig,
    input: Vec<u8>,
    stats: Arc<ProtocolStatistics>,
) -> (Result<ClientSession, SessionError>, Vec<u8>) {
    let mut output = Vec::new();
    let session = ClientSession::establish(
        config,
        &mut Cursor::new(input),
        &mut output,
        security_manager(),
        populated_cache(),
        stats,
        Arc::new(OperationsProcessor::new()),
    );
    (session, output)
}

fn replies(output: Vec<u8>) -> Vec<bool> {
    let mut cursor = Cursor::new(output);
    let mut out = Vec::new();
    while let Some(reply) =
        read_delimited::<_, SimpleAuthenticationResponse>(&mut cursor, 1024).unwrap()
    {
        out.push(reply.authenticated);
    }
    out
}

#[test]
fn test_successful_handshake_notifies_once() {
    init_tracing();
    let stats = Arc::new(ProtocolStatistics::new());
    let bytes = handshake_bytes(&Credentials::new("reader", "reader-pw"));
    let (session, output) = establish(&ProtocolConfig::new(), bytes, stats.clone());

    let session = session.unwrap();
    assert_eq!(session.principal().unwrap().name(), "reader");
    assert_eq!(replies(output), vec![true]);
    assert_eq!(stats.authentication_failures(), 0);
}

#[test]
fn test_rejected_handshake_notifies_before_failing() {
    init_tracing();
    let stats = Arc::new(ProtocolStatistics::new());
    let bytes = handshake_bytes(&Credentials::new("reader", "guess"));
    let (session, output) = establish(&ProtocolConfig::new(), bytes, stats.clone());

    assert!(matches!(
        session,
        Err(SessionError::Authentication(AuthenticationError::Failed(_)))
    ));
    assert_eq!(replies(output), vec![false]);
    assert_eq!(stats.authentication_failures(), 1);
}

#[test]
fn test_client_closing_before_handshake() {
    init_tracing();
    let stats = Arc::new(ProtocolStatistics::new());
    let (session, output) = establish(&ProtocolConfig::new(), Vec::new(), stats.clone());

    assert!(matches!(
        session,
        Err(SessionError::Authentication(AuthenticationError::EndOfStream))
    ));
    assert!(output.is_empty());
}

#[test]
fn test_unknown_authorizer_is_configuration_error() {
    init_tracing();
    let config = ProtocolConfig::from_json_str(
        &serde_json::json!({ "authorization_mode": "LDAP" }).to_string(),
    )
    .unwrap();
    let bytes = handshake_bytes(&Credentials::new("reader", "reader-pw"));
    let (session, output) = establish(&config, bytes, Arc::new(ProtocolStatistics::new()));

    match session {
        Err(SessionError::Lookup(LookupError::NotRegistered { family, id })) => {
            assert_eq!(family, "Authorizer");
            assert_eq!(id, "LDAP");
        }
        Err(other) => panic!("Expected NotRegistered, got {:?}", other),
        Ok(_) => panic!("Expected NotRegistered"),
    }
    // Lookup happens before the handshake, so nothing was read or written.
    assert!(output.is_empty());
}

#[test]
fn test_noop_modes_need_no_handshake() {
    init_tracing();
    let config = ProtocolConfig::from_json_str(
        &serde_json::json!({
            "authentication_mode": "NOOP",
            "authorization_mode": "NOOP",
        })
        .to_string(),
    )
    .unwrap();
    let (session, output) = establish(&config, Vec::new(), Arc::new(ProtocolStatistics::new()));
    let session = session.unwrap();
    assert!(output.is_empty());

    let response = session.serve_request(Request::Get(GetRequest {
        region: "orders".into(),
        key: "order-1".into(),
    }));
    assert!(response.error().is_none());
}

#[test]
fn test_sessions_have_distinct_ids() {
    let cache = populated_cache();
    let a = session_for("reader", "reader-pw", cache.clone(), Arc::new(ProtocolStatistics::new()));
    let b = session_for("reader", "reader-pw", cache, Arc::new(ProtocolStatistics::new()));
    assert_ne!(a.id(), b.id());
}
