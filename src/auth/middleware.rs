use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{Claims, TokenVerifier};
use crate::error::AppError;
use crate::models::Role;

/// Pulls the token out of an `Authorization: Bearer <token>` header.
///
/// The header must split on a single space into exactly two parts, the first of
/// which is `Bearer` (any case). Anything else is `AppError::Unauthenticated`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("Authorization header missing".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid authorization header".into()))?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(*token)
        }
        _ => Err(AppError::Unauthenticated(
            "Invalid authorization header".into(),
        )),
    }
}

/// Checks the token's role against the route's requirement.
/// `None` admits any role.
pub fn authorize(claims: &Claims, required: Option<Role>) -> Result<(), AppError> {
    match required {
        Some(role) if claims.role != role => Err(AppError::Forbidden(format!(
            "{} role required",
            role
        ))),
        _ => Ok(()),
    }
}

/// Middleware gating a scope on a valid bearer token and, optionally, a role.
///
/// Admitted requests carry their [`Claims`] in the request extensions; use the
/// [`AuthenticatedUser`](crate::auth::extractors::AuthenticatedUser) extractor to read them.
///
/// ```ignore
/// web::scope("/admin").wrap(RequireRole::role(verifier.clone(), Role::Admin))
/// ```
#[derive(Clone)]
pub struct RequireRole {
    verifier: Arc<TokenVerifier>,
    required: Option<Role>,
}

impl RequireRole {
    pub fn new(verifier: Arc<TokenVerifier>, required: Option<Role>) -> Self {
        Self { verifier, required }
    }

    /// Admits only tokens carrying `role`.
    pub fn role(verifier: Arc<TokenVerifier>, role: Role) -> Self {
        Self::new(verifier, Some(role))
    }

    /// Admits any valid token regardless of role.
    pub fn authenticated(verifier: Arc<TokenVerifier>) -> Self {
        Self::new(verifier, None)
    }

    /// Builds the middleware from a role name. An empty string means
    /// authenticate-only; an unknown name is a configuration error.
    pub fn from_role_name(verifier: Arc<TokenVerifier>, role: &str) -> Result<Self, AppError> {
        if role.is_empty() {
            return Ok(Self::authenticated(verifier));
        }
        let role = role.parse::<Role>().map_err(AppError::Config)?;
        Ok(Self::role(verifier, role))
    }

    pub fn required_role(&self) -> Option<Role> {
        self.required
    }

    /// Runs the full gate against a request's headers.
    pub fn check(&self, headers: &HeaderMap) -> Result<Claims, AppError> {
        let token = bearer_token(headers)?;
        let claims = self.verifier.verify(token)?;
        authorize(&claims, self.required)?;
        Ok(claims)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireRoleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service: Rc::new(service),
            gate: self.clone(),
        }))
    }
}

pub struct RequireRoleService<S> {
    service: Rc<S>,
    gate: RequireRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.gate.check(req.headers()) {
            Ok(claims) => {
                log::debug!(
                    "admitted {} ({}) to {}",
                    claims.username,
                    claims.role,
                    req.path()
                );
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                log::info!("rejected request to {}: {}", req.path(), err);
                let res = req.error_response(err).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
