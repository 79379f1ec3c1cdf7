//! Account administration. Every route here sits behind the admin role.

use crate::{
    auth::{AuthService, AuthenticatedUser, RegisterRequest},
    error::AppError,
    models::UserView,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new admin account.
#[post("/register")]
pub async fn register_admin(
    service: web::Data<AuthService>,
    caller: AuthenticatedUser,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = service
        .register_admin(&register_data.username, &register_data.password)
        .await?;
    log::info!("admin '{}' created admin '{}'", caller.0.username, user.username);

    Ok(HttpResponse::Created().json(UserView::from(user)))
}

/// Re-enable login for an account.
#[post("/activate/{username}")]
pub async fn activate(
    service: web::Data<AuthService>,
    username: web::Path<String>,
) -> Result<impl Responder, AppError> {
    service.activate(&username).await?;
    account_response(&service, &username, "Account activated").await
}

/// Disable login for an account. Tokens already issued stay valid until they expire.
#[post("/deactivate/{username}")]
pub async fn deactivate(
    service: web::Data<AuthService>,
    username: web::Path<String>,
) -> Result<impl Responder, AppError> {
    service.deactivate(&username).await?;
    account_response(&service, &username, "Account deactivated").await
}

/// Grant the admin role. Takes effect on the account's next login.
#[post("/promote/{username}")]
pub async fn promote(
    service: web::Data<AuthService>,
    username: web::Path<String>,
) -> Result<impl Responder, AppError> {
    service.promote(&username).await?;
    account_response(&service, &username, "Account promoted to admin").await
}

async fn account_response(
    service: &AuthService,
    username: &str,
    message: &str,
) -> Result<HttpResponse, AppError> {
    let user = service.find_user(username).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "user": UserView::from(user)
    })))
}
