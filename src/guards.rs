use crate::{
    models::{Permission, Role, Session},
    permissions::PermissionResolver,
    route_table::{RouteDescriptor, default_path_for_role},
    session::SessionSnapshot,
};

/// GuardDecision
///
/// Outcome of a `RoleGuard` check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// No session: render nothing, not even the fallback.
    Hidden,
    /// Session present but a requirement failed: render the fallback.
    Denied,
    /// Render the children.
    Granted,
}

/// RoleGuard
///
/// Declarative check deciding whether a subtree renders for the current session.
///
/// Precedence follows the order of the fields: when allowed roles are set the role alone
/// decides (any listed role passes); otherwise the required permissions are checked, any
/// one of them by default or all of them with `require_all`; with neither set every
/// signed-in user passes. Empty lists count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleGuard {
    allowed_roles: Vec<Role>,
    required_permissions: Vec<Permission>,
    require_all: bool,
}

impl RoleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowed_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.allowed_roles = roles.into_iter().collect();
        self
    }

    pub fn required_permissions(
        mut self,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        self.required_permissions = permissions.into_iter().collect();
        self
    }

    pub fn require_all(mut self, require_all: bool) -> Self {
        self.require_all = require_all;
        self
    }

    /// Evaluates the requirement against a resolver, without the "no session" case.
    pub fn allows(&self, resolver: &PermissionResolver<'_>) -> bool {
        if !self.allowed_roles.is_empty() {
            self.allowed_roles.contains(&resolver.role())
        } else if !self.required_permissions.is_empty() {
            if self.require_all {
                resolver.has_all_permissions(&self.required_permissions)
            } else {
                resolver.has_any_permission(&self.required_permissions)
            }
        } else {
            true
        }
    }

    pub fn check(&self, session: Option<&Session>) -> GuardDecision {
        let Some(session) = session else {
            return GuardDecision::Hidden;
        };

        let resolver = session.resolver();
        let granted = self.allows(&resolver);

        tracing::trace!(
            role = %session.role,
            explicit = resolver.uses_explicit(),
            allowed_roles = ?self.allowed_roles,
            required_permissions = ?self.required_permissions,
            require_all = self.require_all,
            granted,
            "role guard evaluated"
        );

        if granted {
            GuardDecision::Granted
        } else {
            GuardDecision::Denied
        }
    }

    /// Produces the children when granted, the fallback when denied, nothing otherwise.
    pub fn render<T>(
        &self,
        session: Option<&Session>,
        children: impl FnOnce() -> T,
        fallback: Option<T>,
    ) -> Option<T> {
        match self.check(session) {
            GuardDecision::Granted => Some(children()),
            GuardDecision::Denied => fallback,
            GuardDecision::Hidden => None,
        }
    }
}

/// RouteOutcome
///
/// What a `ProtectedRoute` does with the current session snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Session still resolving: show a loading indicator.
    Loading,
    /// No session: render nothing; an outer gate is expected to have redirected.
    Unauthenticated,
    Render,
    Redirect(String),
}

/// ProtectedRoute
///
/// Page-level guard. Users whose role does not qualify are sent to `redirect_to` when
/// set, otherwise to their role's landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoute {
    guard: RoleGuard,
    redirect_to: Option<String>,
}

impl ProtectedRoute {
    pub fn new(allowed_roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            guard: RoleGuard::new().allowed_roles(allowed_roles),
            redirect_to: None,
        }
    }

    /// Guards a page with the same requirement the route table uses for navigation.
    pub fn for_route(route: &RouteDescriptor) -> Self {
        Self {
            guard: route.guard(),
            redirect_to: None,
        }
    }

    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = Some(path.into());
        self
    }

    pub fn resolve(&self, snapshot: &SessionSnapshot) -> RouteOutcome {
        if snapshot.loading {
            return RouteOutcome::Loading;
        }

        match self.guard.check(snapshot.session.as_ref()) {
            GuardDecision::Hidden => RouteOutcome::Unauthenticated,
            GuardDecision::Granted => RouteOutcome::Render,
            GuardDecision::Denied => {
                let role = snapshot.session.as_ref().map(|session| session.role);
                let target = self
                    .redirect_to
                    .clone()
                    .unwrap_or_else(|| default_path_for_role(role).to_string());
                RouteOutcome::Redirect(target)
            }
        }
    }
}
