//! Domain models for the data authorizer.
//!
//! The permission vocabulary and the resource hierarchy mirror the host
//! database's access-control model. A policy engine can only select from or
//! omit values of [`Permission`]; it never introduces new ones.

use std::collections::{BTreeSet, btree_set};
use std::fmt;
use std::iter::Copied;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Keyspace holding the host's own authorization metadata.
pub const AUTH_KEYSPACE: &str = "system_auth";

/// Table storing role permission assignments.
pub const ROLE_PERMISSIONS_TABLE: &str = "role_permissions";

/// Name of the root of the data hierarchy.
pub const ROOT_DATA_NAME: &str = "data";

/// A single permission from the host's fixed enumeration.
///
/// Serialized as the upper-case token used on the wire (`"SELECT"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Create,
    Alter,
    Drop,
    Select,
    Modify,
    Authorize,
    Describe,
    Execute,
}

impl Permission {
    /// The complete enumeration, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Create,
        Self::Alter,
        Self::Drop,
        Self::Select,
        Self::Modify,
        Self::Authorize,
        Self::Describe,
        Self::Execute,
    ];

    /// Wire token for this permission.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Drop => "DROP",
            Self::Select => "SELECT",
            Self::Modify => "MODIFY",
            Self::Authorize => "AUTHORIZE",
            Self::Describe => "DESCRIBE",
            Self::Execute => "EXECUTE",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token that does not name any [`Permission`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission token: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    /// Parse a wire token. Matching is ASCII case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPermission(s.to_owned()))
    }
}

/// A set of permissions.
///
/// `PermissionSet::all()` and `PermissionSet::none()` are the two sentinels
/// used when a decision bypasses the engine or fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// The empty set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// The complete enumeration.
    #[must_use]
    pub fn all() -> Self {
        Self::from(Permission::ALL)
    }

    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Returns `true` if the permission was not already present.
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate in enumeration order.
    pub fn iter(&self) -> Copied<btree_set::Iter<'_, Permission>> {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = Permission;
    type IntoIter = Copied<btree_set::Iter<'a, Permission>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const N: usize> From<[Permission; N]> for PermissionSet {
    fn from(permissions: [Permission; N]) -> Self {
        permissions.into_iter().collect()
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, p) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(p.as_str())?;
        }
        f.write_str("}")
    }
}

/// Level of a [`DataResource`] in the data hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceLevel {
    Root,
    Keyspace,
    Table,
}

impl ResourceLevel {
    /// Wire token for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Keyspace => "keyspace",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for ResourceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a data object: the root, a keyspace, or a table.
///
/// Parents are derived from the variant, so a table always sits under its
/// keyspace, which always sits under the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataResource {
    /// All keyspaces.
    Root,
    /// A single keyspace.
    Keyspace { keyspace: String },
    /// A single table.
    Table { keyspace: String, table: String },
}

impl DataResource {
    #[must_use]
    pub fn root() -> Self {
        Self::Root
    }

    #[must_use]
    pub fn keyspace(keyspace: impl Into<String>) -> Self {
        Self::Keyspace {
            keyspace: keyspace.into(),
        }
    }

    #[must_use]
    pub fn table(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self::Table {
            keyspace: keyspace.into(),
            table: table.into(),
        }
    }

    #[must_use]
    pub fn level(&self) -> ResourceLevel {
        match self {
            Self::Root => ResourceLevel::Root,
            Self::Keyspace { .. } => ResourceLevel::Keyspace,
            Self::Table { .. } => ResourceLevel::Table,
        }
    }

    /// The address segment at this level (`"data"` for the root).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Root => ROOT_DATA_NAME,
            Self::Keyspace { keyspace } => keyspace,
            Self::Table { table, .. } => table,
        }
    }

    /// The enclosing resource, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::Root => None,
            Self::Keyspace { .. } => Some(Self::Root),
            Self::Table { keyspace, .. } => Some(Self::keyspace(keyspace.clone())),
        }
    }

    /// Slash-separated path in the host's notation: `data/ks/table`.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            Self::Root => ROOT_DATA_NAME.to_owned(),
            Self::Keyspace { keyspace } => format!("{ROOT_DATA_NAME}/{keyspace}"),
            Self::Table { keyspace, table } => format!("{ROOT_DATA_NAME}/{keyspace}/{table}"),
        }
    }

    /// Permissions that are meaningful at this level.
    #[must_use]
    pub fn applicable_permissions(&self) -> PermissionSet {
        use Permission::{Alter, Authorize, Create, Drop, Modify, Select};

        match self {
            Self::Root | Self::Keyspace { .. } => {
                PermissionSet::from([Create, Alter, Drop, Select, Modify, Authorize])
            }
            Self::Table { .. } => PermissionSet::from([Alter, Drop, Select, Modify, Authorize]),
        }
    }
}

impl fmt::Display for DataResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Anything the host can run a permission check against.
///
/// Only [`Resource::Data`] is delegated to the policy engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Root, keyspace, or table.
    Data(DataResource),
    /// All roles (`None`) or a single role.
    Role { name: Option<String> },
    /// All functions, the functions of a keyspace, or one function.
    Function {
        keyspace: Option<String>,
        signature: Option<String>,
    },
    /// All `MBeans` (`None`) or the `MBeans` matching a pattern.
    Mbean { pattern: Option<String> },
}

impl Resource {
    /// The data address, if this is a data resource.
    #[must_use]
    pub fn as_data(&self) -> Option<&DataResource> {
        match self {
            Self::Data(data) => Some(data),
            Self::Role { .. } | Self::Function { .. } | Self::Mbean { .. } => None,
        }
    }

    /// Permissions that are meaningful for this resource.
    #[must_use]
    pub fn applicable_permissions(&self) -> PermissionSet {
        use Permission::{Alter, Authorize, Create, Describe, Drop, Execute, Modify, Select};

        match self {
            Self::Data(data) => data.applicable_permissions(),
            Self::Role { name: None } => {
                PermissionSet::from([Create, Alter, Drop, Authorize, Describe])
            }
            Self::Role { name: Some(_) } => PermissionSet::from([Alter, Drop, Authorize]),
            Self::Function {
                signature: None, ..
            } => PermissionSet::from([Create, Alter, Drop, Authorize, Execute]),
            Self::Function {
                signature: Some(_),
                ..
            } => PermissionSet::from([Alter, Drop, Authorize, Execute]),
            Self::Mbean { .. } => {
                PermissionSet::from([Authorize, Describe, Execute, Modify, Select])
            }
        }
    }

    /// Slash-separated path in the host's notation.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            Self::Data(data) => data.full_name(),
            Self::Role { name: None } => "roles".to_owned(),
            Self::Role { name: Some(name) } => format!("roles/{name}"),
            Self::Function {
                keyspace: None, ..
            } => "functions".to_owned(),
            Self::Function {
                keyspace: Some(ks),
                signature: None,
            } => format!("functions/{ks}"),
            Self::Function {
                keyspace: Some(ks),
                signature: Some(sig),
            } => format!("functions/{ks}/{sig}"),
            Self::Mbean { pattern: None } => "mbean".to_owned(),
            Self::Mbean {
                pattern: Some(pattern),
            } => format!("mbean/{pattern}"),
        }
    }
}

impl From<DataResource> for Resource {
    fn from(data: DataResource) -> Self {
        Self::Data(data)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// The authenticated subject of an access check.
///
/// Owned by the host; an immutable snapshot for the duration of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    name: String,
    roles: BTreeSet<String>,
    is_superuser: bool,
}

impl Principal {
    /// Create a new `Principal` builder.
    #[must_use]
    pub fn builder() -> PrincipalBuilder {
        PrincipalBuilder::default()
    }

    /// The host's anonymous user: no roles, no superuser status.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::builder().name("anonymous").build()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role names held by the principal, directly or transitively.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}

#[derive(Default)]
pub struct PrincipalBuilder {
    name: String,
    roles: BTreeSet<String>,
    is_superuser: bool,
}

impl PrincipalBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    #[must_use]
    pub fn build(self) -> Principal {
        Principal {
            name: self.name,
            roles: self.roles,
            is_superuser: self.is_superuser,
        }
    }
}

/// One grant: `grantee` holds `permission` on `resource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDetails {
    pub grantee: String,
    pub resource: Resource,
    pub permission: Permission,
}
