// src/middleware/tender_access.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts, Query, RawPathParams},
    http::request::Parts,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::Role,
    services::access_control::{AccessGrant, TenderIdSources},
};

/// 1. The minimum tender-role a route demands
pub trait RoleRequirement: Send + Sync + 'static {
    fn required() -> Option<Role>;
}

pub struct AnyRole;
impl RoleRequirement for AnyRole {
    fn required() -> Option<Role> { None }
}

pub struct ManagerRole;
impl RoleRequirement for ManagerRole {
    fn required() -> Option<Role> { Some(Role::Manager) }
}

pub struct AdminRole;
impl RoleRequirement for AdminRole {
    fn required() -> Option<Role> { Some(Role::Admin) }
}

/// 2. The guard: resolves the tender from the `tender_id` route parameter or the
/// `tenderId` query parameter and checks the caller's role on it.
///
/// Routes that name the tender in their JSON body, or only through a child entity,
/// call `AccessControl` from the handler instead.
pub struct RequireTenderRole<R> {
    pub tender_id: Uuid,
    pub grant: AccessGrant,
    _marker: PhantomData<R>,
}

#[derive(Deserialize)]
struct TenderIdQuery {
    #[serde(rename = "tenderId")]
    tender_id: Option<Uuid>,
}

impl<R, S> FromRequestParts<S> for RequireTenderRole<R>
where
    R: RoleRequirement,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let path = match RawPathParams::from_request_parts(parts, state).await {
            Ok(params) => match params.iter().find(|(key, _)| *key == "tender_id") {
                Some((_, raw)) => Some(
                    Uuid::parse_str(raw)
                        .map_err(|_| AppError::BadRequest("Invalid tender ID".into()))?,
                ),
                None => None,
            },
            Err(_) => None,
        };
        let query = Query::<TenderIdQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.tender_id);

        let user = parts.extensions.get::<AuthenticatedUser>().map(|u| &u.0);
        let sources = TenderIdSources { path, body: None, query };

        let (tender_id, grant) = app_state
            .access_control
            .authorize(user, sources, R::required())
            .await?;

        parts.extensions.insert(grant);

        Ok(RequireTenderRole {
            tender_id,
            grant,
            _marker: PhantomData,
        })
    }
}
