use admin_console::{
    models::{Permission, Role, Session, UserProfile},
    permissions::{PermissionResolver, default_permissions, has_explicit_permissions},
};
use proptest::prelude::*;
use std::collections::BTreeSet;
use uuid::Uuid;

// --- Helpers ---

fn session(role: Role, permissions: impl IntoIterator<Item = Permission>) -> Session {
    Session {
        user_id: Uuid::from_u128(7),
        email: "someone@store.test".to_string(),
        first_name: "Sam".to_string(),
        last_name: "Doe".to_string(),
        role,
        permissions: permissions.into_iter().collect(),
        store_id: None,
    }
}

fn any_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn any_permission() -> impl Strategy<Value = Permission> {
    prop::sample::select(Permission::ALL.to_vec())
}

fn explicit_set() -> impl Strategy<Value = BTreeSet<Permission>> {
    prop::collection::btree_set(any_permission(), 1..8)
}

// --- Properties ---

proptest! {
    #[test]
    fn prop_without_explicit_list_role_defaults_decide(role in any_role(), permission in any_permission()) {
        let session = session(role, []);
        prop_assert!(!has_explicit_permissions(&session));
        prop_assert_eq!(
            session.has_permission(permission),
            default_permissions(role).contains(&permission)
        );
    }

    #[test]
    fn prop_explicit_list_overrides_defaults(
        role in any_role(),
        explicit in explicit_set(),
        permission in any_permission(),
    ) {
        let session = session(role, explicit.clone());
        prop_assert!(has_explicit_permissions(&session));
        prop_assert_eq!(session.has_permission(permission), explicit.contains(&permission));
    }

    #[test]
    fn prop_resolver_branches_on_the_explicit_predicate(
        role in any_role(),
        explicit in prop::collection::btree_set(any_permission(), 0..6),
    ) {
        let session = session(role, explicit);
        let resolver = session.resolver();
        prop_assert_eq!(resolver.uses_explicit(), has_explicit_permissions(&session));

        let expected: BTreeSet<Permission> = if has_explicit_permissions(&session) {
            session.permissions.clone()
        } else {
            default_permissions(role).iter().copied().collect()
        };
        prop_assert_eq!(resolver.effective_permissions(), expected);
    }

    #[test]
    fn prop_results_are_stable_across_calls(role in any_role(), explicit in prop::collection::btree_set(any_permission(), 0..6)) {
        let session = session(role, explicit);
        let first: Vec<bool> = Permission::ALL.iter().map(|p| session.has_permission(*p)).collect();
        for _ in 0..3 {
            let again: Vec<bool> = Permission::ALL.iter().map(|p| session.has_permission(*p)).collect();
            prop_assert_eq!(&first, &again);
        }
    }

    #[test]
    fn prop_quantifiers_agree_with_single_checks(
        role in any_role(),
        explicit in prop::collection::btree_set(any_permission(), 0..6),
        wanted in prop::collection::vec(any_permission(), 0..5),
    ) {
        let session = session(role, explicit);
        prop_assert_eq!(
            session.has_any_permission(&wanted),
            wanted.iter().any(|p| session.has_permission(*p))
        );
        prop_assert_eq!(
            session.has_all_permissions(&wanted),
            wanted.iter().all(|p| session.has_permission(*p))
        );
    }
}

// --- Examples ---

#[test]
fn test_admin_with_explicit_list_loses_unlisted_defaults() {
    let session = session(Role::Admin, [Permission::OrderRead]);

    assert!(session.has_permission(Permission::OrderRead));
    // Admin defaults grant everything, but the explicit list wins.
    assert!(!session.has_permission(Permission::UserDelete));
}

#[test]
fn test_store_manager_defaults() {
    let session = session(Role::StoreManager, []);

    assert!(session.has_permission(Permission::AnalyticsRead));
    assert!(session.has_permission(Permission::OrderUpdate));
    assert!(!session.has_permission(Permission::UserRead));
    assert!(!session.has_permission(Permission::ProductDelete));
}

#[test]
fn test_empty_quantifier_lists() {
    let session = session(Role::Customer, []);

    assert!(!session.has_any_permission(&[]));
    assert!(session.has_all_permissions(&[]));
}

#[test]
fn test_effective_permissions_follow_branch() {
    let explicit: BTreeSet<_> = [Permission::DiscountRead].into_iter().collect();
    let resolver = PermissionResolver::new(Role::StoreOwner, &explicit);
    assert!(resolver.uses_explicit());
    assert_eq!(resolver.effective_permissions(), explicit);

    let empty = BTreeSet::new();
    let resolver = PermissionResolver::new(Role::Customer, &empty);
    assert!(!resolver.uses_explicit());
    assert_eq!(
        resolver.effective_permissions(),
        default_permissions(Role::Customer)
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
    );
}

#[test]
fn test_admin_defaults_cover_every_permission() {
    for permission in Permission::ALL {
        assert!(default_permissions(Role::Admin).contains(&permission));
    }
}

// --- Wire Format ---

#[test]
fn test_role_and_permission_wire_names() {
    assert_eq!(
        serde_json::to_string(&Role::StoreManager).unwrap(),
        "\"STORE_MANAGER\""
    );
    assert_eq!(
        serde_json::to_string(&Permission::OrderRead).unwrap(),
        "\"order:read\""
    );
    assert_eq!("user:delete".parse::<Permission>().unwrap(), Permission::UserDelete);
    assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
    assert!("SUPERUSER".parse::<Role>().is_err());
}

#[test]
fn test_profile_normalization() {
    let profile: UserProfile = serde_json::from_value(serde_json::json!({
        "id": Uuid::from_u128(1),
        "email": "admin@store.test",
        "firstName": "Ada",
        "lastName": "Min",
        "role": "ADMIN",
        "permissions": ["order:read", "order:teleport"],
        "storeId": Uuid::from_u128(99),
    }))
    .unwrap();

    let session = Session::from_profile(profile);

    assert_eq!(
        session.permissions,
        [Permission::OrderRead].into_iter().collect::<BTreeSet<_>>()
    );
    // Admin is not store-scoped, so the store id is dropped.
    assert_eq!(session.store_id, None);
    assert_eq!(session.display_name(), "Ada Min");
}

#[test]
fn test_profile_keeps_store_for_store_roles() {
    let profile: UserProfile = serde_json::from_value(serde_json::json!({
        "id": Uuid::from_u128(2),
        "email": "manager@store.test",
        "role": "STORE_MANAGER",
        "storeId": Uuid::from_u128(42),
    }))
    .unwrap();

    let session = Session::from_profile(profile);

    assert_eq!(session.store_id, Some(Uuid::from_u128(42)));
    assert!(session.permissions.is_empty());
    assert!(session.has_permission(Permission::AnalyticsRead));
}
