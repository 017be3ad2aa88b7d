//! Permission resolution.
//!
//! A session either carries an explicit permission list from the backend or it does not.
//! When it does, that list is the whole truth. When it does not, the permissions are
//! derived from the role through the default table below. The explicit list is never
//! merged with the defaults.

use std::collections::BTreeSet;

use crate::models::{Permission, Role, Session};

use Permission::*;

const ADMIN_DEFAULTS: &[Permission] = &Permission::ALL;

const STORE_OWNER_DEFAULTS: &[Permission] = &[
    OrderRead,
    OrderCreate,
    OrderUpdate,
    OrderDelete,
    ProductRead,
    ProductCreate,
    ProductUpdate,
    ProductDelete,
    DiscountRead,
    DiscountCreate,
    DiscountUpdate,
    DiscountDelete,
    StoreRead,
    StoreUpdate,
    UserRead,
    UserCreate,
    UserUpdate,
    AnalyticsRead,
];

const STORE_MANAGER_DEFAULTS: &[Permission] = &[
    OrderRead,
    OrderUpdate,
    ProductRead,
    ProductCreate,
    ProductUpdate,
    DiscountRead,
    StoreRead,
    AnalyticsRead,
];

const CUSTOMER_DEFAULTS: &[Permission] = &[ProductRead, OrderRead, OrderCreate];

/// The default permission table: what a role implies when the session has no explicit list.
pub fn default_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Admin => ADMIN_DEFAULTS,
        Role::StoreOwner => STORE_OWNER_DEFAULTS,
        Role::StoreManager => STORE_MANAGER_DEFAULTS,
        Role::Customer => CUSTOMER_DEFAULTS,
    }
}

/// True iff the backend sent a non-empty permission list for this session.
pub fn has_explicit_permissions(session: &Session) -> bool {
    is_explicit_list(&session.permissions)
}

/// The branch condition of the resolver: an empty list means "derive from role".
fn is_explicit_list(permissions: &BTreeSet<Permission>) -> bool {
    !permissions.is_empty()
}

/// PermissionResolver
///
/// Answers permission queries for one role + explicit-permission pair. Holds no state
/// beyond its borrowed inputs, so repeated calls always agree.
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    role: Role,
    explicit: &'a BTreeSet<Permission>,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(role: Role, explicit: &'a BTreeSet<Permission>) -> Self {
        Self { role, explicit }
    }

    pub fn for_session(session: &'a Session) -> Self {
        Self::new(session.role, &session.permissions)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the explicit branch is taken.
    pub fn uses_explicit(&self) -> bool {
        is_explicit_list(self.explicit)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        if self.uses_explicit() {
            self.explicit.contains(&permission)
        } else {
            default_permissions(self.role).contains(&permission)
        }
    }

    /// False for an empty list.
    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(*p))
    }

    /// True for an empty list.
    pub fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(*p))
    }

    /// The set actually consulted by `has_permission`.
    pub fn effective_permissions(&self) -> BTreeSet<Permission> {
        if self.uses_explicit() {
            self.explicit.clone()
        } else {
            default_permissions(self.role).iter().copied().collect()
        }
    }
}

impl Session {
    pub fn resolver(&self) -> PermissionResolver<'_> {
        PermissionResolver::for_session(self)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.resolver().has_permission(permission)
    }

    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        self.resolver().has_any_permission(permissions)
    }

    pub fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        self.resolver().has_all_permissions(permissions)
    }
}
