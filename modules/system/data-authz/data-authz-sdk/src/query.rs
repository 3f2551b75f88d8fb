//! Policy query document sent to the engine.
//!
//! ```json
//! { "input": { "user": { "name": "alice", "roles": ["analyst"] },
//!              "resource": { "name": "t1", "level": "table",
//!                            "parent": { "name": "ks1", "level": "keyspace",
//!                                        "parent": { "name": "data", "level": "root" } } } } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::HierarchyError;
use crate::models::{DataResource, Principal, ROOT_DATA_NAME, ResourceLevel};

/// Top-level query document. Built fresh for each access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyQuery {
    pub input: QueryInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryInput {
    pub user: QueryUser,
    pub resource: QueryResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryUser {
    pub name: String,
    /// Sorted, unique role names.
    pub roles: Vec<String>,
}

/// One level of the resource hierarchy, with its ancestors nested in `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResource {
    pub name: String,
    pub level: ResourceLevel,
    /// Absent at the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<QueryResource>>,
}

impl PolicyQuery {
    #[must_use]
    pub fn new(principal: &Principal, resource: &DataResource) -> Self {
        Self {
            input: QueryInput {
                user: QueryUser::from(principal),
                resource: QueryResource::from(resource),
            },
        }
    }
}

impl From<&Principal> for QueryUser {
    fn from(principal: &Principal) -> Self {
        Self {
            name: principal.name().to_owned(),
            roles: principal.roles().iter().cloned().collect(),
        }
    }
}

impl From<&DataResource> for QueryResource {
    fn from(resource: &DataResource) -> Self {
        Self {
            name: resource.name().to_owned(),
            level: resource.level(),
            parent: resource
                .parent()
                .map(|parent| Box::new(Self::from(&parent))),
        }
    }
}

impl TryFrom<&QueryResource> for DataResource {
    type Error = HierarchyError;

    fn try_from(doc: &QueryResource) -> Result<Self, Self::Error> {
        match (doc.level, doc.parent.as_deref()) {
            (ResourceLevel::Root, None) if doc.name == ROOT_DATA_NAME => Ok(Self::Root),
            (ResourceLevel::Root, None) => Err(HierarchyError::UnexpectedRootName {
                name: doc.name.clone(),
                expected: ROOT_DATA_NAME,
            }),
            (ResourceLevel::Root, Some(_)) => Err(HierarchyError::RootWithParent),
            (level, None) => Err(HierarchyError::MissingParent { level }),
            (ResourceLevel::Keyspace, Some(parent)) => match Self::try_from(parent)? {
                Self::Root => Ok(Self::keyspace(doc.name.clone())),
                other => Err(HierarchyError::InvalidParent {
                    child: ResourceLevel::Keyspace,
                    parent: other.level(),
                }),
            },
            (ResourceLevel::Table, Some(parent)) => match Self::try_from(parent)? {
                Self::Keyspace { keyspace } => Ok(Self::table(keyspace, doc.name.clone())),
                other => Err(HierarchyError::InvalidParent {
                    child: ResourceLevel::Table,
                    parent: other.level(),
                }),
            },
        }
    }
}
