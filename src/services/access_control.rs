// src/services/access_control.rs

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

/// Lookup of per-tender role grants.
#[async_trait]
pub trait TenderRoleStore: Send + Sync {
    async fn find_role(&self, tender_id: Uuid, user_id: Uuid) -> Result<Option<Role>, AppError>;
}

/// How access to a tender was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessGrant {
    GlobalAdmin,
    TenderRole(Role),
}

impl AccessGrant {
    /// Effective role for downstream checks; a global admin acts as a tender admin.
    pub fn role(self) -> Role {
        match self {
            AccessGrant::GlobalAdmin => Role::Admin,
            AccessGrant::TenderRole(role) => role,
        }
    }
}

/// The places a request may name its tender in.
/// Precedence: route parameter, then JSON body, then query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenderIdSources {
    pub path: Option<Uuid>,
    pub body: Option<Uuid>,
    pub query: Option<Uuid>,
}

impl TenderIdSources {
    pub fn from_path(id: Uuid) -> Self {
        Self { path: Some(id), ..Self::default() }
    }

    pub fn from_body(id: Uuid) -> Self {
        Self { body: Some(id), ..Self::default() }
    }

    pub fn resolve(&self) -> Option<Uuid> {
        self.path.or(self.body).or(self.query)
    }
}

#[derive(Clone)]
pub struct AccessControl {
    roles: Arc<dyn TenderRoleStore>,
}

impl AccessControl {
    pub fn new(roles: Arc<dyn TenderRoleStore>) -> Self {
        Self { roles }
    }

    /// Full guard: 401 without a user, 400 without a tender id, then [`Self::check`].
    pub async fn authorize(
        &self,
        user: Option<&User>,
        sources: TenderIdSources,
        required: Option<Role>,
    ) -> Result<(Uuid, AccessGrant), AppError> {
        let user = user.ok_or(AppError::AuthenticationRequired)?;
        let tender_id = sources.resolve().ok_or(AppError::MissingTenderId)?;
        let grant = self.check(user, tender_id, required).await?;
        Ok((tender_id, grant))
    }

    /// Re-evaluated on every call; global admins skip the role lookup.
    pub async fn check(
        &self,
        user: &User,
        tender_id: Uuid,
        required: Option<Role>,
    ) -> Result<AccessGrant, AppError> {
        if user.role == Role::Admin {
            return Ok(AccessGrant::GlobalAdmin);
        }

        let role = self
            .roles
            .find_role(tender_id, user.id)
            .await?
            .ok_or(AppError::TenderAccessDenied)?;

        if let Some(required) = required {
            if !role.satisfies(required) {
                return Err(AppError::InsufficientRole(required));
            }
        }

        Ok(AccessGrant::TenderRole(role))
    }
}

/// Guard for global (not per-tender) operations such as the supplier directory.
pub fn require_global_role(user: &User, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use chrono::Utc;

    #[derive(Default)]
    pub(crate) struct MemoryRoleStore {
        grants: Mutex<HashMap<(Uuid, Uuid), Role>>,
        lookups: AtomicUsize,
    }

    impl MemoryRoleStore {
        pub(crate) fn grant(&self, tender_id: Uuid, user_id: Uuid, role: Role) {
            self.grants.lock().unwrap().insert((tender_id, user_id), role);
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TenderRoleStore for MemoryRoleStore {
        async fn find_role(&self, tender_id: Uuid, user_id: Uuid) -> Result<Option<Role>, AppError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.grants.lock().unwrap().get(&(tender_id, user_id)).copied())
        }
    }

    pub(crate) fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{role}@example.com"),
            password_hash: String::new(),
            full_name: "Test User".into(),
            role,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn setup() -> (Arc<MemoryRoleStore>, AccessControl) {
        let store = Arc::new(MemoryRoleStore::default());
        let access = AccessControl::new(store.clone());
        (store, access)
    }

    #[tokio::test]
    async fn global_admin_skips_lookup() {
        let (store, access) = setup();
        let admin = user(Role::Admin);

        let grant = access
            .check(&admin, Uuid::new_v4(), Some(Role::Admin))
            .await
            .unwrap();

        assert_eq!(grant, AccessGrant::GlobalAdmin);
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn user_without_grant_is_denied_whatever_the_requirement() {
        let (_, access) = setup();
        let tender = Uuid::new_v4();

        for global in [Role::Manager, Role::Evaluator, Role::Viewer] {
            let actor = user(global);
            for required in [None, Some(Role::Viewer), Some(Role::Manager)] {
                let err = access.check(&actor, tender, required).await.unwrap_err();
                assert!(matches!(err, AppError::TenderAccessDenied));
            }
        }
    }

    #[tokio::test]
    async fn grant_on_another_tender_does_not_leak() {
        let (store, access) = setup();
        let actor = user(Role::Viewer);
        store.grant(Uuid::new_v4(), actor.id, Role::Manager);

        let err = access.check(&actor, Uuid::new_v4(), None).await.unwrap_err();
        assert!(matches!(err, AppError::TenderAccessDenied));
    }

    #[tokio::test]
    async fn rank_is_compared_against_requirement() {
        let (store, access) = setup();
        let tender = Uuid::new_v4();
        let actor = user(Role::Viewer);
        store.grant(tender, actor.id, Role::Evaluator);

        let grant = access.check(&actor, tender, Some(Role::Viewer)).await.unwrap();
        assert_eq!(grant, AccessGrant::TenderRole(Role::Evaluator));
        assert!(access.check(&actor, tender, Some(Role::Evaluator)).await.is_ok());

        let err = access.check(&actor, tender, Some(Role::Manager)).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientRole(Role::Manager)));
        assert_eq!(store.lookups(), 3);
    }

    #[tokio::test]
    async fn tender_role_is_independent_of_global_role() {
        let (store, access) = setup();
        let tender = Uuid::new_v4();
        let actor = user(Role::Viewer);
        store.grant(tender, actor.id, Role::Admin);

        let grant = access.check(&actor, tender, Some(Role::Admin)).await.unwrap();
        assert_eq!(grant.role(), Role::Admin);
    }

    #[tokio::test]
    async fn authorize_reports_missing_user_and_missing_tender() {
        let (_, access) = setup();
        let err = access
            .authorize(None, TenderIdSources::from_path(Uuid::new_v4()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired));

        let actor = user(Role::Manager);
        let err = access
            .authorize(Some(&actor), TenderIdSources::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingTenderId));
    }

    #[test]
    fn path_beats_body_beats_query() {
        let (path, body, query) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let all = TenderIdSources { path: Some(path), body: Some(body), query: Some(query) };
        assert_eq!(all.resolve(), Some(path));

        let no_path = TenderIdSources { path: None, ..all };
        assert_eq!(no_path.resolve(), Some(body));

        let query_only = TenderIdSources { query: Some(query), ..TenderIdSources::default() };
        assert_eq!(query_only.resolve(), Some(query));
        assert_eq!(TenderIdSources::default().resolve(), None);
    }

    #[test]
    fn global_role_guard() {
        let viewer = user(Role::Viewer);
        assert!(matches!(
            require_global_role(&viewer, &[Role::Admin, Role::Manager]),
            Err(AppError::Forbidden)
        ));
        assert!(require_global_role(&user(Role::Manager), &[Role::Admin, Role::Manager]).is_ok());
    }
}
