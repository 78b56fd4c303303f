//! Region handlers: get, put, bulk get, bulk put, remove, region listing.
//!
//! Bulk operations process each key independently. A key that fails to
//! decode, or whose store call fails, becomes a [`KeyedError`] next to the
//! successful entries; the call as a whole still succeeds.

use std::sync::Arc;

use cinder_core::{ErrorResponse, OperationResult, Region, RegionError};
use cinder_wire::{
    EncodedValue, EncodingError, Entry, GetAllRequest, GetAllResponse, GetRegionNamesRequest,
    GetRegionNamesResponse, GetRequest, GetResponse, KeyedError, PutAllRequest, PutAllResponse,
    PutRequest, PutResponse, RemoveRequest, RemoveResponse, SerializationService,
};
use tracing::{debug, error};

use crate::context::ExecutionContext;

// =============================================================================
// Failure classification
// =============================================================================

fn resolve_region(context: &ExecutionContext, name: &str) -> OperationResult<Arc<dyn Region>> {
    context.cache()?.region(name).ok_or_else(|| {
        error!(region = name, "region not found");
        ErrorResponse::region_not_found()
    })
}

fn encoding_failure(region: &str, err: EncodingError) -> ErrorResponse {
    error!(region, error = %err, "value encoding failed");
    err.into()
}

fn store_failure(region: &str, err: RegionError) -> ErrorResponse {
    error!(region, error = %err, code = %err.error_code(), "region operation failed");
    err.into()
}

fn encode_optional(
    serialization: &dyn SerializationService,
    region: &str,
    value: Option<cinder_core::Value>,
) -> OperationResult<EncodedValue> {
    match value {
        Some(value) => serialization
            .encode(&value)
            .map_err(|e| encoding_failure(region, e)),
        None => Ok(EncodedValue::Null),
    }
}

fn get_one(
    serialization: &dyn SerializationService,
    region: &dyn Region,
    key: &EncodedValue,
) -> OperationResult<EncodedValue> {
    let decoded = serialization
        .decode(key)
        .map_err(|e| encoding_failure(region.name(), e))?;
    let value = region
        .get(&decoded)
        .map_err(|e| store_failure(region.name(), e))?;
    encode_optional(serialization, region.name(), value)
}

fn put_one(
    serialization: &dyn SerializationService,
    region: &dyn Region,
    entry: &Entry,
) -> OperationResult<()> {
    let key = serialization
        .decode(&entry.key)
        .map_err(|e| encoding_failure(region.name(), e))?;
    let value = serialization
        .decode(&entry.value)
        .map_err(|e| encoding_failure(region.name(), e))?;
    region
        .put(key, value)
        .map_err(|e| store_failure(region.name(), e))?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle Get.
pub fn get(
    serialization: &dyn SerializationService,
    request: GetRequest,
    context: &ExecutionContext,
) -> OperationResult<GetResponse> {
    let region = resolve_region(context, &request.region)?;
    let result = get_one(serialization, region.as_ref(), &request.key)?;
    Ok(GetResponse { result })
}

/// Handle Put.
pub fn put(
    serialization: &dyn SerializationService,
    request: PutRequest,
    context: &ExecutionContext,
) -> OperationResult<PutResponse> {
    let region = resolve_region(context, &request.region)?;
    put_one(serialization, region.as_ref(), &request.entry)?;
    Ok(PutResponse {})
}

/// Handle GetAll.
pub fn get_all(
    serialization: &dyn SerializationService,
    request: GetAllRequest,
    context: &ExecutionContext,
) -> OperationResult<GetAllResponse> {
    let region = resolve_region(context, &request.region)?;

    let mut entries = Vec::with_capacity(request.keys.len());
    let mut failures = Vec::new();
    for key in request.keys {
        match get_one(serialization, region.as_ref(), &key) {
            Ok(value) => entries.push(Entry { key, value }),
            Err(error) => failures.push(KeyedError { key, error }),
        }
    }

    debug!(
        region = %request.region,
        entries = entries.len(),
        failures = failures.len(),
        "bulk get complete"
    );
    Ok(GetAllResponse { entries, failures })
}

/// Handle PutAll.
pub fn put_all(
    serialization: &dyn SerializationService,
    request: PutAllRequest,
    context: &ExecutionContext,
) -> OperationResult<PutAllResponse> {
    let region = resolve_region(context, &request.region)?;

    let failed_keys: Vec<KeyedError> = request
        .entries
        .into_iter()
        .filter_map(|entry| {
            put_one(serialization, region.as_ref(), &entry)
                .err()
                .map(|error| KeyedError {
                    key: entry.key,
                    error,
                })
        })
        .collect();

    Ok(PutAllResponse { failed_keys })
}

/// Handle Remove.
pub fn remove(
    serialization: &dyn SerializationService,
    request: RemoveRequest,
    context: &ExecutionContext,
) -> OperationResult<RemoveResponse> {
    let region = resolve_region(context, &request.region)?;
    let key = serialization
        .decode(&request.key)
        .map_err(|e| encoding_failure(&request.region, e))?;
    region
        .remove(&key)
        .map_err(|e| store_failure(&request.region, e))?;
    Ok(RemoveResponse {})
}

/// Handle GetRegionNames. Names are sorted.
pub fn get_region_names(
    _serialization: &dyn SerializationService,
    _request: GetRegionNamesRequest,
    context: &ExecutionContext,
) -> OperationResult<GetRegionNamesResponse> {
    let mut regions = context.cache()?.region_names();
    regions.sort();
    Ok(GetRegionNamesResponse { regions })
}
