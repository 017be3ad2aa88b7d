use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Access Control Vocabulary ---

/// Role
///
/// The fixed set of job functions a dashboard user can hold. A session carries exactly
/// one role; changing it requires signing in again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    Admin,
    StoreOwner,
    StoreManager,
    Customer,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::StoreOwner,
        Role::StoreManager,
        Role::Customer,
    ];

    /// The wire name, as stored in the `userRole` key and cookie.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::StoreOwner => "STORE_OWNER",
            Role::StoreManager => "STORE_MANAGER",
            Role::Customer => "CUSTOMER",
        }
    }

    /// Roles that operate on behalf of a single store and therefore carry a `store_id`.
    pub fn is_store_scoped(&self) -> bool {
        matches!(self, Role::StoreOwner | Role::StoreManager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// Permission
///
/// A `resource:action` capability. Serialized exactly as the backend sends it
/// (e.g. `"order:read"`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[ts(export)]
pub enum Permission {
    #[serde(rename = "order:read")]
    OrderRead,
    #[serde(rename = "order:create")]
    OrderCreate,
    #[serde(rename = "order:update")]
    OrderUpdate,
    #[serde(rename = "order:delete")]
    OrderDelete,
    #[serde(rename = "product:read")]
    ProductRead,
    #[serde(rename = "product:create")]
    ProductCreate,
    #[serde(rename = "product:update")]
    ProductUpdate,
    #[serde(rename = "product:delete")]
    ProductDelete,
    #[serde(rename = "discount:read")]
    DiscountRead,
    #[serde(rename = "discount:create")]
    DiscountCreate,
    #[serde(rename = "discount:update")]
    DiscountUpdate,
    #[serde(rename = "discount:delete")]
    DiscountDelete,
    #[serde(rename = "store:read")]
    StoreRead,
    #[serde(rename = "store:create")]
    StoreCreate,
    #[serde(rename = "store:update")]
    StoreUpdate,
    #[serde(rename = "store:delete")]
    StoreDelete,
    #[serde(rename = "user:read")]
    UserRead,
    #[serde(rename = "user:create")]
    UserCreate,
    #[serde(rename = "user:update")]
    UserUpdate,
    #[serde(rename = "user:delete")]
    UserDelete,
    #[serde(rename = "analytics:read")]
    AnalyticsRead,
}

impl Permission {
    pub const ALL: [Permission; 21] = [
        Permission::OrderRead,
        Permission::OrderCreate,
        Permission::OrderUpdate,
        Permission::OrderDelete,
        Permission::ProductRead,
        Permission::ProductCreate,
        Permission::ProductUpdate,
        Permission::ProductDelete,
        Permission::DiscountRead,
        Permission::DiscountCreate,
        Permission::DiscountUpdate,
        Permission::DiscountDelete,
        Permission::StoreRead,
        Permission::StoreCreate,
        Permission::StoreUpdate,
        Permission::StoreDelete,
        Permission::UserRead,
        Permission::UserCreate,
        Permission::UserUpdate,
        Permission::UserDelete,
        Permission::AnalyticsRead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::OrderRead => "order:read",
            Permission::OrderCreate => "order:create",
            Permission::OrderUpdate => "order:update",
            Permission::OrderDelete => "order:delete",
            Permission::ProductRead => "product:read",
            Permission::ProductCreate => "product:create",
            Permission::ProductUpdate => "product:update",
            Permission::ProductDelete => "product:delete",
            Permission::DiscountRead => "discount:read",
            Permission::DiscountCreate => "discount:create",
            Permission::DiscountUpdate => "discount:update",
            Permission::DiscountDelete => "discount:delete",
            Permission::StoreRead => "store:read",
            Permission::StoreCreate => "store:create",
            Permission::StoreUpdate => "store:update",
            Permission::StoreDelete => "store:delete",
            Permission::UserRead => "user:read",
            Permission::UserCreate => "user:create",
            Permission::UserUpdate => "user:update",
            Permission::UserDelete => "user:delete",
            Permission::AnalyticsRead => "analytics:read",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// Returned when a role or permission string is outside the known enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag: {0}")]
pub struct UnknownTag(pub String);

// --- Session ---

/// Session
///
/// The client's record of the currently authenticated user. Built from the backend's
/// `UserProfile`; `store_id` only survives for store-scoped roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// Explicit permissions sent by the backend. Empty means "derive from role".
    #[serde(default)]
    #[ts(type = "Array<Permission>")]
    #[schema(value_type = Vec<Permission>)]
    pub permissions: BTreeSet<Permission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub store_id: Option<Uuid>,
}

impl Session {
    /// Normalizes a backend profile into a session.
    ///
    /// Unknown permission strings are dropped rather than failing the sign-in, and a
    /// `storeId` attached to a role that is not store-scoped is discarded.
    pub fn from_profile(profile: UserProfile) -> Self {
        let mut permissions = BTreeSet::new();
        for raw in profile.permissions.unwrap_or_default() {
            match raw.parse::<Permission>() {
                Ok(permission) => {
                    permissions.insert(permission);
                }
                Err(_) => tracing::warn!(permission = %raw, "ignoring unknown permission"),
            }
        }

        let store_id = match profile.store_id {
            Some(id) if profile.role.is_store_scoped() => Some(id),
            Some(_) => {
                tracing::warn!(role = %profile.role, "dropping storeId on non store-scoped role");
                None
            }
            None => None,
        };

        Self {
            user_id: profile.id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            role: profile.role,
            permissions,
            store_id,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// StoredSession
///
/// The token and session pair that `SessionStore::persist_session` writes through to
/// memory, durable storage and the cookie store in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub session: Session,
}

// --- Backend Wire Types ---

/// Credentials
///
/// Payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Credentials {
    #[schema(example = "owner@store.test")]
    pub email: String,
    pub password: String,
}

/// UserProfile
///
/// The user object returned by `POST /auth/login` and `GET /auth/me`. Permissions are
/// kept as raw strings here; `Session::from_profile` filters them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<Uuid>,
}

/// LoginResponse
///
/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserProfile,
}

// --- Dashboard Output Schemas ---

/// NavItem
///
/// One entry of the navigation menu built from the route authorization table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavItem {
    pub path: String,
    pub title: String,
}

/// PageView
///
/// The page shell served for a guarded dashboard route: who is looking at it and what
/// else they may navigate to.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PageView {
    pub path: String,
    pub title: String,
    pub user: Session,
    pub navigation: Vec<NavItem>,
}

/// AuthPageView
///
/// Shell for the sign-in and sign-up pages, reachable only without a session cookie.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthPageView {
    pub page: String,
}

/// ErrorBody
///
/// JSON error envelope returned by the `/api` surface.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
