//! Permissions required by operations.

use std::fmt;

/// What kind of resource an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Cluster topology and membership
    Cluster,
    /// Region data
    Data,
}

/// What an operation does to the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Administrative changes
    Manage,
    /// Reads
    Read,
    /// Writes and removals
    Write,
}

/// A permission such as `DATA:READ` or `DATA:WRITE:orders`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePermission {
    /// Resource kind
    pub resource: Resource,
    /// Operation kind
    pub operation: Operation,
    /// Region the permission is scoped to; `None` means every region.
    pub region: Option<String>,
}

impl ResourcePermission {
    /// Unscoped permission.
    pub const fn new(resource: Resource, operation: Operation) -> Self {
        Self {
            resource,
            operation,
            region: None,
        }
    }

    /// Permission scoped to one region.
    pub fn on_region(resource: Resource, operation: Operation, region: impl Into<String>) -> Self {
        Self {
            resource,
            operation,
            region: Some(region.into()),
        }
    }

    /// `DATA:READ`
    pub const fn data_read() -> Self {
        Self::new(Resource::Data, Operation::Read)
    }

    /// `DATA:WRITE`
    pub const fn data_write() -> Self {
        Self::new(Resource::Data, Operation::Write)
    }

    /// `CLUSTER:READ`
    pub const fn cluster_read() -> Self {
        Self::new(Resource::Cluster, Operation::Read)
    }

    /// Narrow this permission to `region`, if any.
    pub fn scoped(mut self, region: Option<&str>) -> Self {
        if let Some(region) = region {
            self.region = Some(region.to_string());
        }
        self
    }

    /// Whether holding `self` grants `required`.
    ///
    /// Resource and operation must match exactly; an unscoped grant covers
    /// every region.
    pub fn implies(&self, required: &ResourcePermission) -> bool {
        self.resource == required.resource
            && self.operation == required.operation
            && match (&self.region, &required.region) {
                (None, _) => true,
                (Some(granted), Some(wanted)) => granted == wanted,
                (Some(_), None) => false,
            }
    }
}

impl fmt::Display for ResourcePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resource = match self.resource {
            Resource::Cluster => "CLUSTER",
            Resource::Data => "DATA",
        };
        let operation = match self.operation {
            Operation::Manage => "MANAGE",
            Operation::Read => "READ",
            Operation::Write => "WRITE",
        };
        match &self.region {
            Some(region) => write!(f, "{}:{}:{}", resource, operation, region),
            None => write!(f, "{}:{}", resource, operation),
        }
    }
}
