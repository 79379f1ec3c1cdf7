pub mod admin;
pub mod auth;
pub mod health;
pub mod users;

use std::sync::Arc;

use actix_web::web;

use crate::auth::{RequireRole, TokenVerifier};
use crate::models::Role;

/// Mounts the API routes. Expects `web::Data<AuthService>` in app data.
///
/// `/auth` is open, `/me` needs any valid token, `/admin` needs an admin token.
pub fn configure(cfg: &mut web::ServiceConfig, verifier: &Arc<TokenVerifier>) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login),
    )
    .service(
        web::scope("/me")
            .wrap(RequireRole::authenticated(verifier.clone()))
            .service(users::me),
    )
    .service(
        web::scope("/admin")
            .wrap(RequireRole::role(verifier.clone(), Role::Admin))
            .service(admin::register_admin)
            .service(admin::activate)
            .service(admin::deactivate)
            .service(admin::promote),
    );
}
