//! Permission checks

use std::collections::HashSet;

/// Answers whether the calling context holds a permission
pub trait PermissionChecker: Send + Sync {
    fn is_granted(&self, permission: &str) -> bool;
}

/// A fixed set of granted permissions
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    granted: HashSet<String>,
    grant_all: bool,
}

impl StaticPermissions {
    pub fn granting<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: permissions.into_iter().map(Into::into).collect(),
            grant_all: false,
        }
    }

    pub fn all() -> Self {
        Self {
            granted: HashSet::new(),
            grant_all: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl PermissionChecker for StaticPermissions {
    fn is_granted(&self, permission: &str) -> bool {
        self.grant_all || self.granted.contains(permission)
    }
}
