//! Static route authorization table.
//!
//! Used to build navigation menus. Enforcement happens in the guards and the edge gate,
//! never here.

use std::collections::BTreeSet;

use crate::{
    guards::RoleGuard,
    models::{NavItem, Permission, Role},
    permissions::PermissionResolver,
};

pub const HOME_PATH: &str = "/";
pub const SIGN_IN_PATH: &str = "/signin";
pub const SIGN_UP_PATH: &str = "/signup";
pub const ANALYTICS_PATH: &str = "/analytics";

/// RouteDescriptor
///
/// A dashboard route and what it takes to reach it. When both lists are empty any
/// signed-in user qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub title: &'static str,
    pub required_roles: &'static [Role],
    /// Any one of these suffices.
    pub required_permissions: &'static [Permission],
}

impl RouteDescriptor {
    /// The guard equivalent of this descriptor's requirement.
    pub fn guard(&self) -> RoleGuard {
        RoleGuard::new()
            .allowed_roles(self.required_roles.iter().copied())
            .required_permissions(self.required_permissions.iter().copied())
    }

    pub fn nav_item(&self) -> NavItem {
        NavItem {
            path: self.path.to_string(),
            title: self.title.to_string(),
        }
    }
}

pub static ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor {
        path: HOME_PATH,
        title: "Dashboard",
        required_roles: &[Role::Admin, Role::StoreOwner],
        required_permissions: &[],
    },
    RouteDescriptor {
        path: ANALYTICS_PATH,
        title: "Analytics",
        required_roles: &[],
        required_permissions: &[Permission::AnalyticsRead],
    },
    RouteDescriptor {
        path: "/orders",
        title: "Orders",
        required_roles: &[],
        required_permissions: &[Permission::OrderRead],
    },
    RouteDescriptor {
        path: "/products",
        title: "Products",
        required_roles: &[],
        required_permissions: &[Permission::ProductRead],
    },
    RouteDescriptor {
        path: "/discounts",
        title: "Discounts",
        required_roles: &[],
        required_permissions: &[Permission::DiscountRead],
    },
    RouteDescriptor {
        path: "/stores",
        title: "Stores",
        required_roles: &[Role::Admin, Role::StoreOwner],
        required_permissions: &[],
    },
    RouteDescriptor {
        path: "/users",
        title: "Users",
        required_roles: &[],
        required_permissions: &[Permission::UserRead],
    },
    RouteDescriptor {
        path: "/profile",
        title: "Profile",
        required_roles: &[],
        required_permissions: &[],
    },
];

pub fn find_route(path: &str) -> Option<&'static RouteDescriptor> {
    ROUTES.iter().find(|route| route.path == path)
}

/// The subset of `ROUTES` reachable by this role and explicit-permission combination,
/// in table order.
pub fn get_available_routes(
    role: Role,
    permissions: &BTreeSet<Permission>,
) -> Vec<&'static RouteDescriptor> {
    let resolver = PermissionResolver::new(role, permissions);
    ROUTES
        .iter()
        .filter(|route| route.guard().allows(&resolver))
        .collect()
}

pub fn navigation_for(role: Role, permissions: &BTreeSet<Permission>) -> Vec<NavItem> {
    get_available_routes(role, permissions)
        .into_iter()
        .map(RouteDescriptor::nav_item)
        .collect()
}

/// Where a signed-in user lands when a route turns them away. `None` stands for a role
/// hint that did not parse.
pub fn default_path_for_role(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::StoreManager) => ANALYTICS_PATH,
        Some(Role::StoreOwner) | Some(Role::Admin) => HOME_PATH,
        Some(Role::Customer) | None => SIGN_IN_PATH,
    }
}
